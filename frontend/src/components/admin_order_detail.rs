use crate::auth::use_auth;
use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::error::ClientError;
use crate::mount::MountGuard;
use crate::notify::Notice;
use crate::orders::OrderDetailState;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use autoserve_shared::date::display_timestamp;
use autoserve_shared::{Order, OrderStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

fn detail_row(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div>
            <div class="text-xs uppercase text-base-content/60">{label}</div>
            <div class="font-medium">{value}</div>
        </div>
    }
}

fn order_summary(order: &Order) -> impl IntoView + use<> {
    let customer = order.customer();
    let address = order
        .address
        .as_ref()
        .map(|a| a.full_address.clone())
        .unwrap_or_default();
    let schedule = match order.scheduled_date.as_deref() {
        Some("now") | None => "As soon as possible".to_string(),
        Some(raw) => display_timestamp(raw),
    };

    view! {
        <div class="grid gap-4 sm:grid-cols-2">
            {detail_row("Customer", customer.map(|c| c.name.clone()).unwrap_or_else(|| "Unknown".to_string()))}
            {detail_row("Email", customer.map(|c| c.email.clone()).unwrap_or_default())}
            {detail_row("Phone", customer.and_then(|c| c.phone.clone()).unwrap_or_default())}
            {detail_row("Address", address)}
            {detail_row("Scheduled", schedule)}
            {detail_row("Total", format!("${:.2}", order.total_amount))}
            {detail_row("Payment", format!(
                "{} / {}",
                order.payment_method.clone().unwrap_or_default(),
                order.payment_status.clone().unwrap_or_default()
            ))}
            {detail_row("Created", order.created_at.as_deref().map(display_timestamp).unwrap_or_default())}
        </div>
        <div class="divider">"Services"</div>
        <ul class="space-y-2">
            {order
                .services
                .iter()
                .map(|line| {
                    let details = serde_json::to_string_pretty(&line.service_details).unwrap_or_default();
                    view! {
                        <li class="p-3 rounded-box bg-base-200">
                            <div class="flex justify-between font-medium">
                                <span>{line.service_name.clone()}</span>
                                <span>{format!("${:.2}", line.price)}</span>
                            </div>
                            <pre class="text-xs mt-2 whitespace-pre-wrap">{details}</pre>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
        <div class="mt-4">
            {detail_row("Customer instructions", order.special_instructions.clone().unwrap_or_default())}
        </div>
    }
}

#[component]
pub fn AdminOrderDetailPage(id: String) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let detail = RwSignal::new(OrderDetailState::new());
    let (loading, set_loading) = signal(true);
    let (load_error, set_load_error) = signal(Option::<String>::None);

    if let Some(token) = auth.token(Role::Admin) {
        let guard = mounted.get_value();
        spawn_local(async move {
            let result = marketplace().get_order(&id, &token).await;
            guard.apply(result, |result| {
                match result {
                    Ok(order) => detail.update(|d| d.load(order)),
                    Err(e) => {
                        tracing::warn!("failed to load order {id}: {e}");
                        set_load_error.set(Some(e.user_message()));
                    }
                }
                set_loading.set(false);
            });
        });
    } else {
        set_loading.set(false);
    }

    let on_status = move |ev: leptos::ev::Event| {
        let Some(status) = OrderStatus::parse(&event_target_value(&ev)) else {
            return;
        };
        let Some(token) = auth.token(Role::Admin) else {
            toaster.show(Notice::from(&ClientError::Unauthenticated));
            return;
        };
        let mut begun = Ok(None);
        detail.update(|d| begun = d.begin_status_update(status));
        let id = match begun {
            Ok(Some(id)) => id,
            Ok(None) => return,
            Err(e) => {
                toaster.show(Notice::from(&e));
                return;
            }
        };

        let guard = mounted.get_value();
        spawn_local(async move {
            let result = marketplace().update_order_status(&id, status, &token).await;
            guard.apply(result, |result| {
                let mut notice = Notice::info("");
                detail.update(|d| notice = d.finish_status_update(status, result));
                toaster.show(notice);
            });
        });
    };

    let on_save_notes = move |_| {
        let Some(token) = auth.token(Role::Admin) else {
            toaster.show(Notice::from(&ClientError::Unauthenticated));
            return;
        };
        let mut begun = Err(ClientError::AlreadySubmitting);
        detail.update(|d| begun = d.begin_notes_update());
        let (id, notes) = match begun {
            Ok(pair) => pair,
            Err(e) => {
                toaster.show(Notice::from(&e));
                return;
            }
        };

        let guard = mounted.get_value();
        spawn_local(async move {
            let result = marketplace().update_order_notes(&id, &notes, &token).await;
            guard.apply(result, |result| {
                let mut notice = Notice::info("");
                detail.update(|d| notice = d.finish_notes_update(&notes, result));
                toaster.show(notice);
            });
        });
    };

    let current_status = move || {
        detail.with(|d| d.order().map(|o| o.status).unwrap_or_default())
    };

    view! {
        <div class="max-w-4xl mx-auto space-y-6">
            <Link to=AppRoute::AdminOrders.to_path() class="btn btn-ghost btn-sm">"← All orders"</Link>

            <Show when=move || loading.get()>
                <div class="flex justify-center py-16">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            </Show>
            <Show when=move || load_error.get().is_some()>
                <div role="alert" class="alert alert-error">
                    <span>{move || load_error.get().unwrap_or_default()}</span>
                </div>
            </Show>

            <Show when=move || detail.with(|d| d.order().is_some())>
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
                            <h2 class="card-title font-mono">
                                {move || detail.with(|d| d.order().map(|o| format!("Order #{}", o.short_id())).unwrap_or_default())}
                            </h2>
                            <div class="flex items-center gap-2">
                                <span class=move || current_status().style().badge_class>
                                    {move || current_status().style().label}
                                </span>
                                <select
                                    class="select select-bordered select-sm"
                                    disabled=move || detail.with(OrderDetailState::status_saving)
                                    prop:value=move || current_status().as_str()
                                    on:change=on_status
                                >
                                    {OrderStatus::SETTABLE
                                        .into_iter()
                                        .map(|s| view! { <option value=s.as_str()>{s.style().label}</option> })
                                        .collect_view()}
                                </select>
                            </div>
                        </div>
                        {move || detail.with(|d| d.order().map(order_summary))}
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Admin notes"</h3>
                        <textarea
                            class="textarea textarea-bordered w-full min-h-32"
                            prop:value=move || detail.with(|d| d.notes_draft().to_string())
                            on:input=move |ev| detail.update(|d| d.edit_notes(&event_target_value(&ev)))
                        ></textarea>
                        <div class="card-actions justify-end">
                            <button
                                class="btn btn-primary"
                                disabled=move || detail.with(OrderDetailState::notes_saving)
                                on:click=on_save_notes
                            >
                                {move || if detail.with(OrderDetailState::notes_saving) { "Saving..." } else { "Save notes" }}
                            </button>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
