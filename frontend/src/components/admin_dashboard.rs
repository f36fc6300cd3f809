use crate::auth::use_auth;
use crate::components::admin_orders::{OrderTable, load_orders};
use crate::mount::MountGuard;
use crate::orders::{OrderFilter, StatusTab};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use autoserve_shared::{Order, OrderStatus};
use leptos::prelude::*;

/// 概览中显示的最近订单数
const RECENT_ORDERS: usize = 5;

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (loading, set_loading) = signal(true);
    load_orders(mounted, set_orders, set_loading);

    let count = move |status: OrderStatus| {
        orders.with(|all| all.iter().filter(|o| StatusTab::Only(status).includes(o.status)).count())
    };
    let revenue = move || {
        orders.with(|all| {
            all.iter()
                .filter(|o| o.status == OrderStatus::Completed)
                .map(|o| o.total_amount)
                .sum::<f64>()
        })
    };
    let recent = Signal::derive(move || {
        orders.with(|all| {
            OrderFilter::default()
                .apply(all)
                .into_iter()
                .take(RECENT_ORDERS)
                .cloned()
                .collect::<Vec<_>>()
        })
    });

    view! {
        <div class="max-w-7xl mx-auto space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Overview"</h1>
                <p class="text-base-content/70">
                    {move || auth.admin().map(|a| format!("Signed in as {}", a.display_name())).unwrap_or_default()}
                </p>
            </div>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-title">"Total orders"</div>
                    <div class="stat-value text-primary">{move || orders.with(Vec::len)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Pending"</div>
                    <div class="stat-value text-warning">{move || count(OrderStatus::Pending)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"In progress"</div>
                    <div class="stat-value text-info">{move || count(OrderStatus::InProgress)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Completed revenue"</div>
                    <div class="stat-value text-success text-2xl">{move || format!("${:.2}", revenue())}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <h3 class="card-title">"Recent orders"</h3>
                        <Link to=AppRoute::AdminOrders.to_path() class="btn btn-ghost btn-sm">"View all"</Link>
                    </div>
                    <OrderTable orders=recent loading=loading />
                </div>
            </div>
        </div>
    }
}
