//! 通用预约表单
//!
//! 六个服务类别共用此组件，差异全部来自 `CategoryConfig`。

use crate::auth::use_auth;
use crate::booking::{BookingFlow, Stage, place_order};
use crate::components::location_picker::LocationPickerField;
use crate::components::marketplace;
use crate::components::toast::{Toaster, use_toaster};
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::location::{LocationPicker, MapViewport};
use crate::mount::MountGuard;
use crate::notify::Notice;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use autoserve_shared::{
    AttributeKind, AttributeSpec, BookingType, Coordinates, Location, ServiceCategory, Vehicle,
};
use leptos::prelude::*;
use leptos::task::spawn_local;

const MAP_WIDTH: u32 = 600;
const MAP_HEIGHT: u32 = 320;

fn stage_index(stage: Stage) -> usize {
    match stage {
        Stage::Select => 0,
        Stage::Estimate => 1,
        Stage::Confirm => 2,
        Stage::Done => 3,
    }
}

/// 修改草稿；校验失败时弹出提示
fn edit_flow<F>(flow: RwSignal<BookingFlow>, toaster: Toaster, change: F)
where
    F: FnOnce(&mut BookingFlow) -> Result<(), ClientError>,
{
    let mut outcome = Ok(());
    flow.update(|f| outcome = change(f));
    if let Err(e) = outcome {
        toaster.show(Notice::from(&e));
    }
}

#[component]
fn AttributeInput(spec: &'static AttributeSpec, flow: RwSignal<BookingFlow>) -> impl IntoView {
    let toaster = use_toaster();
    let value = move || {
        flow.with(|f| f.draft().attributes.get(spec.key).cloned())
            .unwrap_or_else(|| spec.default.to_string())
    };
    let set = move |v: String| edit_flow(flow, toaster, |f| f.set_attribute(spec.key, &v));

    match spec.kind {
        AttributeKind::Choice(choices) => view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{spec.label}</span></label>
                <select
                    class="select select-bordered"
                    on:change=move |ev| set(event_target_value(&ev))
                    prop:value=value
                >
                    {choices
                        .iter()
                        .map(|c| view! { <option value=c.value>{c.label}</option> })
                        .collect_view()}
                </select>
            </div>
        }
        .into_any(),
        AttributeKind::Toggle => view! {
            <label class="label cursor-pointer justify-start gap-3">
                <input
                    type="checkbox"
                    class="checkbox checkbox-primary"
                    prop:checked=move || value() == "true"
                    on:change=move |ev| set(event_target_checked(&ev).to_string())
                />
                <span class="label-text">{spec.label}</span>
            </label>
        }
        .into_any(),
    }
}

#[component]
pub fn BookingFormPage(category: ServiceCategory) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let app_config = AppConfig::from_build_env();
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let flow = RwSignal::new(BookingFlow::new(category));
    let config = category.config();
    let (center_lng, center_lat) = app_config.map_center;
    let picker = RwSignal::new(LocationPicker::new(MapViewport::new(
        Coordinates::new(center_lng, center_lat),
        app_config.map_zoom,
        MAP_WIDTH,
        MAP_HEIGHT,
    )));
    let (vehicles, set_vehicles) = signal(Vec::<Vehicle>::new());

    let stage = Memo::new(move |_| flow.with(BookingFlow::stage));
    let service_type = Memo::new(move |_| flow.with(|f| f.draft().service_type.clone()));
    let booking_type = Memo::new(move |_| flow.with(|f| f.draft().booking_type));

    // 挂载时加载服务目录与车辆
    {
        let token = auth.token(Role::User);
        let user = auth.user();
        let guard = mounted.get_value();
        spawn_local(async move {
            let api = marketplace();
            match api.list_services(token.as_deref()).await {
                Ok(services) if guard.is_mounted() => {
                    flow.update(|f| {
                        if f.prime_services(&services) {
                            tracing::debug!("service record cached for {}", f.config().category);
                        }
                    });
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("service catalog unavailable: {e}"),
            }

            let (Some(user), Some(token)) = (user, token) else {
                return;
            };
            let result = api.list_vehicles(&user.id, &token).await;
            guard.apply(result, |result| match result {
                Ok(list) => set_vehicles.set(list),
                Err(e) => toaster.show(Notice::from(&e)),
            });
        });
    }

    let on_location = Callback::new(move |location: Location| {
        edit_flow(flow, toaster, |f| f.set_location(location));
    });

    let on_estimate = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let now = chrono::Local::now().naive_local();
        let mut outcome = Ok(());
        flow.update(|f| outcome = f.request_estimate(now).map(|_| ()));
        if let Err(e) = outcome {
            toaster.show(Notice::from(&e));
        }
    };

    let on_back = move |_| edit_flow(flow, toaster, |f| f.back().map(|_| ()));
    let on_proceed = move |_| edit_flow(flow, toaster, BookingFlow::proceed);
    let on_reset = move |_| edit_flow(flow, toaster, BookingFlow::reset);

    let on_submit = move |_| {
        let token = auth.token(Role::User);
        let mut planned = Err(ClientError::Unauthenticated);
        flow.update(|f| planned = f.begin_submit(token.as_deref()));
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => {
                toaster.show(Notice::from(&e));
                return;
            }
        };

        let guard = mounted.get_value();
        spawn_local(async move {
            let result = place_order(&marketplace(), &plan).await;
            if !guard.is_mounted() {
                return;
            }
            let mut finished = Err(ClientError::AlreadySubmitting);
            flow.update(|f| finished = f.finish_submit(result));
            match finished {
                Ok(receipt) => toaster.show(Notice::success(format!(
                    "Order placed! Total {}",
                    receipt.total
                ))),
                Err(e) => toaster.show(Notice::from(&e)),
            }
        });
    };

    let select_view = move || {
        view! {
            <form class="space-y-4" on:submit=on_estimate>
                <div class="form-control">
                    <label class="label"><span class="label-text">"Service"</span></label>
                    <select
                        class="select select-bordered"
                        on:change=move |ev| {
                            let key = event_target_value(&ev);
                            edit_flow(flow, toaster, |f| f.set_service_type(&key));
                        }
                        prop:value=move || service_type.get()
                    >
                        {config
                            .service_types
                            .iter()
                            .map(|s| view! { <option value=s.key>{s.label}</option> })
                            .collect_view()}
                    </select>
                </div>

                <div class="grid gap-4 sm:grid-cols-2">
                    {move || {
                        let service_type = service_type.get();
                        config
                            .attributes
                            .iter()
                            .filter(|spec| spec.applies(&service_type))
                            .map(|spec| view! { <AttributeInput spec=spec flow=flow /> })
                            .collect_view()
                    }}
                </div>

                <Show when=move || config.allows_scheduling>
                    <div class="join">
                        {[BookingType::Scheduled, BookingType::OnDemand]
                            .into_iter()
                            .map(|kind| {
                                let label = match kind {
                                    BookingType::Scheduled => "Schedule",
                                    BookingType::OnDemand => "Right now",
                                };
                                view! {
                                    <button
                                        type="button"
                                        class=move || if booking_type.get() == kind {
                                            "btn join-item btn-primary"
                                        } else {
                                            "btn join-item"
                                        }
                                        on:click=move |_| edit_flow(flow, toaster, |f| f.set_booking_type(kind))
                                    >
                                        {label}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </Show>

                <Show when=move || booking_type.get() == BookingType::Scheduled>
                    <div class="grid gap-4 sm:grid-cols-2">
                        <input
                            type="date"
                            class="input input-bordered"
                            prop:value=move || flow.with(|f| f.draft().scheduled_date.clone())
                            on:change=move |ev| {
                                let date = event_target_value(&ev);
                                let time = flow.with_untracked(|f| f.draft().scheduled_time.clone());
                                edit_flow(flow, toaster, |f| f.set_schedule(&date, &time));
                            }
                        />
                        <input
                            type="time"
                            class="input input-bordered"
                            prop:value=move || flow.with(|f| f.draft().scheduled_time.clone())
                            on:change=move |ev| {
                                let time = event_target_value(&ev);
                                let date = flow.with_untracked(|f| f.draft().scheduled_date.clone());
                                edit_flow(flow, toaster, |f| f.set_schedule(&date, &time));
                            }
                        />
                    </div>
                </Show>

                <LocationPickerField picker=picker on_change=on_location />

                <div class="form-control">
                    <label class="label">
                        <span class="label-text">
                            {if config.requires_vehicle { "Vehicle" } else { "Vehicle (optional)" }}
                        </span>
                    </label>
                    <select
                        class="select select-bordered"
                        on:change=move |ev| {
                            let id = event_target_value(&ev);
                            edit_flow(flow, toaster, |f| f.select_vehicle(Some(id)));
                        }
                        prop:value=move || flow.with(|f| f.draft().vehicle_id.clone().unwrap_or_default())
                    >
                        <option value="">"Select a vehicle"</option>
                        <For
                            each=move || vehicles.get()
                            key=|v| v.id.clone()
                            children=move |v| view! { <option value=v.id.clone()>{v.label()}</option> }
                        />
                    </select>
                    <Show when=move || vehicles.with(Vec::is_empty)>
                        <p class="text-xs mt-1">
                            <Link to=AppRoute::VehicleForm.to_path() class="link link-primary">"Add a vehicle"</Link>
                        </p>
                    </Show>
                </div>

                <Show when=move || config.requires_contact>
                    <div class="grid gap-4 sm:grid-cols-2">
                        <input
                            placeholder="Contact name"
                            class="input input-bordered"
                            prop:value=move || flow.with(|f| f.draft().contact.contact_name.clone())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                edit_flow(flow, toaster, |f| f.set_contact_name(&v));
                            }
                        />
                        <input
                            type="tel"
                            placeholder="Contact phone"
                            class="input input-bordered"
                            prop:value=move || flow.with(|f| f.draft().contact.contact_phone.clone())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                edit_flow(flow, toaster, |f| f.set_contact_phone(&v));
                            }
                        />
                    </div>
                    <textarea
                        placeholder="What happened?"
                        class="textarea textarea-bordered w-full"
                        prop:value=move || flow.with(|f| f.draft().contact.description.clone())
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            edit_flow(flow, toaster, |f| f.set_description(&v));
                        }
                    ></textarea>
                </Show>

                <textarea
                    placeholder="Notes for the technician"
                    class="textarea textarea-bordered w-full"
                    prop:value=move || flow.with(|f| f.draft().notes.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        edit_flow(flow, toaster, |f| f.set_notes(&v));
                    }
                ></textarea>

                <div class="card-actions justify-end">
                    <button type="submit" class="btn btn-primary">"Get estimate"</button>
                </div>
            </form>
        }
    };

    let estimate_summary = move || {
        flow.with(|f| {
            f.estimate().map(|estimate| {
                let draft = f.draft();
                view! {
                    <div class="stats shadow w-full bg-base-200">
                        <div class="stat">
                            <div class="stat-title">"Estimated price"</div>
                            <div class="stat-value text-primary">{estimate.price.to_string()}</div>
                            <div class="stat-desc">{config.display_name(&draft.service_type)}</div>
                        </div>
                        <div class="stat">
                            <div class="stat-title">"Duration"</div>
                            <div class="stat-value text-2xl">{format!("{} min", estimate.duration)}</div>
                            <div class="stat-desc">{draft.location.full_address.clone()}</div>
                        </div>
                    </div>
                }
            })
        })
    };

    let stage_view = move || match stage.get() {
        Stage::Select => select_view().into_any(),
        Stage::Estimate => view! {
            <div class="space-y-4">
                {estimate_summary}
                <div class="card-actions justify-between">
                    <button class="btn btn-ghost" on:click=on_back>"Back"</button>
                    <button class="btn btn-primary" on:click=on_proceed>"Continue"</button>
                </div>
            </div>
        }
        .into_any(),
        Stage::Confirm => view! {
            <div class="space-y-4">
                {estimate_summary}
                <p class="text-sm text-base-content/70">
                    "Payment is collected by card. Confirm to place your order."
                </p>
                <div class="card-actions justify-between">
                    <button
                        class="btn btn-ghost"
                        disabled=move || flow.with(BookingFlow::is_submitting)
                        on:click=on_back
                    >
                        "Back"
                    </button>
                    <button
                        class="btn btn-primary"
                        disabled=move || flow.with(BookingFlow::is_submitting)
                        on:click=on_submit
                    >
                        {move || if flow.with(BookingFlow::is_submitting) {
                            view! { <span class="loading loading-spinner"></span> "Placing order..." }.into_any()
                        } else {
                            "Place order".into_any()
                        }}
                    </button>
                </div>
            </div>
        }
        .into_any(),
        Stage::Done => view! {
            <div class="space-y-4 text-center">
                <h3 class="text-2xl font-bold text-success">"Order placed"</h3>
                <p>
                    {move || flow.with(|f| {
                        f.receipt()
                            .and_then(|r| r.order_id.clone())
                            .map(|id| format!("Order reference: {id}"))
                            .unwrap_or_else(|| "We received your order.".to_string())
                    })}
                </p>
                <div class="card-actions justify-center">
                    <button class="btn btn-outline" on:click=on_reset>"Book another"</button>
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary">"Back to dashboard"</Link>
                </div>
            </div>
        }
        .into_any(),
    };

    view! {
        <div class="max-w-3xl mx-auto card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title text-2xl">{config.title}</h2>
                <p class="text-base-content/70">{config.tagline}</p>
                <ul class="steps w-full my-4">
                    {["Details", "Estimate", "Confirm", "Done"]
                        .into_iter()
                        .enumerate()
                        .map(|(i, label)| {
                            view! {
                                <li class=move || if stage_index(stage.get()) >= i {
                                    "step step-primary"
                                } else {
                                    "step"
                                }>{label}</li>
                            }
                        })
                        .collect_view()}
                </ul>
                {stage_view}
            </div>
        </div>
    }
}
