use crate::auth::use_auth;
use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::mount::MountGuard;
use crate::notify::Notice;
use crate::orders::{OrderFilter, StatusTab, tab_counts};
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use autoserve_shared::Order;
use autoserve_shared::date::display_timestamp;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 拉取全部订单到 `set_orders`
pub fn load_orders(
    mounted: StoredValue<MountGuard, LocalStorage>,
    set_orders: WriteSignal<Vec<Order>>,
    set_loading: WriteSignal<bool>,
) {
    let auth = use_auth();
    let toaster = use_toaster();
    let Some(token) = auth.token(Role::Admin) else {
        set_loading.set(false);
        return;
    };
    let guard = mounted.get_value();
    set_loading.set(true);
    spawn_local(async move {
        let result = marketplace().list_orders(&token).await;
        guard.apply(result, |result| {
            match result {
                Ok(orders) => set_orders.set(orders),
                Err(e) => {
                    tracing::warn!("failed to load orders: {e}");
                    toaster.show(Notice::from(&e));
                }
            }
            set_loading.set(false);
        });
    });
}

/// 订单表格
#[component]
pub fn OrderTable(
    #[prop(into)] orders: Signal<Vec<Order>>,
    #[prop(into)] loading: Signal<bool>,
) -> impl IntoView {
    view! {
        <div class="overflow-x-auto w-full">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        <th>"Order"</th>
                        <th>"Customer"</th>
                        <th class="hidden md:table-cell">"Services"</th>
                        <th>"Total"</th>
                        <th>"Status"</th>
                        <th class="hidden md:table-cell">"Created"</th>
                    </tr>
                </thead>
                <tbody>
                    <Show when=move || loading.get()>
                        <tr>
                            <td colspan="6" class="text-center py-8 text-base-content/50">
                                <span class="loading loading-spinner loading-md"></span> " Loading..."
                            </td>
                        </tr>
                    </Show>
                    <Show when=move || !loading.get() && orders.with(Vec::is_empty)>
                        <tr>
                            <td colspan="6" class="text-center py-8 text-base-content/50">"No orders match."</td>
                        </tr>
                    </Show>
                    <For
                        each=move || orders.get()
                        key=|o| o.id.clone()
                        children=move |order| {
                            let style = order.status.style();
                            let detail = AppRoute::AdminOrderDetail(order.id.clone()).to_path();
                            view! {
                                <tr>
                                    <td class="font-mono">
                                        <Link to=detail class="link link-primary">{format!("#{}", order.short_id())}</Link>
                                    </td>
                                    <td>{order.customer_name().unwrap_or("Unknown").to_string()}</td>
                                    <td class="hidden md:table-cell">{order.service_summary()}</td>
                                    <td>{format!("${:.2}", order.total_amount)}</td>
                                    <td><span class=style.badge_class>{style.label}</span></td>
                                    <td class="hidden md:table-cell text-sm">
                                        {order.created_at.as_deref().map(display_timestamp).unwrap_or_default()}
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}

#[component]
pub fn AdminOrdersPage() -> impl IntoView {
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (loading, set_loading) = signal(true);
    let filter = RwSignal::new(OrderFilter::default());

    load_orders(mounted, set_orders, set_loading);

    let visible = Signal::derive(move || {
        filter.with(|f| orders.with(|all| f.apply(all).into_iter().cloned().collect::<Vec<_>>()))
    });
    let counts = move || orders.with(|all| tab_counts(all));

    view! {
        <div class="max-w-7xl mx-auto space-y-6">
            <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
                <h1 class="text-3xl font-bold">"Orders"</h1>
                <input
                    type="search"
                    placeholder="Search by order id or customer"
                    class="input input-bordered w-full md:w-80"
                    prop:value=move || filter.with(|f| f.search.clone())
                    on:input=move |ev| filter.update(|f| f.search = event_target_value(&ev))
                />
            </div>

            <div role="tablist" class="tabs tabs-boxed flex-wrap">
                {move || {
                    counts()
                        .into_iter()
                        .map(|(tab, count): (StatusTab, usize)| {
                            view! {
                                <a
                                    role="tab"
                                    class=move || if filter.with(|f| f.tab == tab) { "tab tab-active" } else { "tab" }
                                    on:click=move |_| filter.update(|f| f.tab = tab)
                                >
                                    {format!("{} ({count})", tab.label())}
                                </a>
                            }
                        })
                        .collect_view()
                }}
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <OrderTable orders=visible loading=loading />
                </div>
            </div>
        </div>
    }
}
