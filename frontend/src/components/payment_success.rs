use crate::auth::use_auth;
use crate::components::marketplace;
use crate::mount::MountGuard;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::{Link, query_param};
use autoserve_shared::Order;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 支付回跳页：`?session_id=..`
#[component]
pub fn PaymentSuccessPage() -> impl IntoView {
    let auth = use_auth();
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let (order, set_order) = signal(Option::<Order>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (loading, set_loading) = signal(true);

    match query_param("session_id") {
        Some(session_id) => {
            let token = auth.token(Role::User);
            let guard = mounted.get_value();
            spawn_local(async move {
                let result = marketplace().order_by_session(&session_id, token.as_deref()).await;
                guard.apply(result, |result| {
                    match result {
                        Ok(found) => set_order.set(Some(found)),
                        Err(e) => {
                            tracing::warn!("order lookup for session {session_id} failed: {e}");
                            set_error_msg.set(Some(e.user_message()));
                        }
                    }
                    set_loading.set(false);
                });
            });
        }
        None => {
            set_error_msg.set(Some("Missing payment session.".to_string()));
            set_loading.set(false);
        }
    }

    view! {
        <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
            <div class="card-body items-center text-center">
                <Show when=move || loading.get()>
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </Show>
                {move || order.get().map(|o| view! {
                    <h2 class="card-title text-success text-2xl">"Payment successful"</h2>
                    <p>{format!("Order #{} for ${:.2} is {}.", o.short_id(), o.total_amount, o.status)}</p>
                    <p class="text-sm text-base-content/70">{o.service_summary()}</p>
                })}
                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>
                <div class="card-actions mt-4">
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary">"Back to dashboard"</Link>
                </div>
            </div>
        </div>
    }
}
