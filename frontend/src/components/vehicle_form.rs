use crate::auth::use_auth;
use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::error::ClientError;
use crate::forms::{FUEL_TYPES, VehicleForm};
use crate::notify::Notice;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use chrono::Datelike;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn VehicleFormPage() -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let navigate = use_navigate();

    let form = RwSignal::new(VehicleForm::default());
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        let (Some(user), Some(token)) = (auth.user(), auth.token(Role::User)) else {
            toaster.show(Notice::from(&ClientError::Unauthenticated));
            return;
        };
        let current_year = chrono::Local::now().year();
        let vehicle = match form.with_untracked(|f| f.validate(&user.id, current_year)) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                toaster.show(Notice::error(e.to_string()));
                return;
            }
        };

        set_is_submitting.set(true);
        spawn_local(async move {
            match marketplace().add_vehicle(&vehicle, &token).await {
                Ok(_) => {
                    toaster.show(Notice::success("Vehicle added"));
                    navigate(&AppRoute::Dashboard.to_path());
                }
                Err(e) => {
                    tracing::warn!("add vehicle failed: {e}");
                    toaster.show(Notice::from(&e));
                }
            }
            set_is_submitting.set(false);
        });
    };

    let text_input = move |label: &'static str,
                           placeholder: &'static str,
                           get: fn(&VehicleForm) -> &String,
                           set: fn(&mut VehicleForm, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    placeholder=placeholder
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        form.update(|f| set(f, value));
                    }
                    prop:value=move || form.with(|f| get(f).clone())
                    class="input input-bordered"
                />
            </div>
        }
    };

    view! {
        <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Add a vehicle"</h2>
                <div class="grid gap-4 sm:grid-cols-2">
                    {text_input("Make", "Toyota", |f| &f.make, |f, v| f.make = v)}
                    {text_input("Model", "Corolla", |f| &f.model, |f, v| f.model = v)}
                    {text_input("Year", "2020", |f| &f.year, |f, v| f.year = v)}
                    {text_input("License plate", "ABC-123", |f| &f.license_plate, |f, v| f.license_plate = v)}
                    {text_input("Color", "Blue", |f| &f.color, |f, v| f.color = v)}
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Fuel type"</span></label>
                        <select
                            class="select select-bordered"
                            on:change=move |ev| form.update(|f| f.fuel_type = event_target_value(&ev))
                            prop:value=move || form.with(|f| f.fuel_type.clone())
                        >
                            {FUEL_TYPES
                                .into_iter()
                                .map(|fuel| view! { <option value=fuel>{fuel}</option> })
                                .collect_view()}
                        </select>
                    </div>
                </div>
                <div class="card-actions justify-end mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() { "Saving..." } else { "Save vehicle" }}
                    </button>
                </div>
            </form>
        </div>
    }
}
