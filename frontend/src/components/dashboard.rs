use crate::auth::use_auth;
use crate::components::marketplace;
use crate::components::toast::use_toaster;
use crate::mount::MountGuard;
use crate::notify::Notice;
use crate::session::Role;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use autoserve_shared::{ServiceCategory, Vehicle};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let mounted = StoredValue::new_local(MountGuard::new());
    on_cleanup(move || mounted.with_value(MountGuard::unmount));

    let (vehicles, set_vehicles) = signal(Vec::<Vehicle>::new());
    let (loading_vehicles, set_loading_vehicles) = signal(true);

    let load_vehicles = move || {
        let (Some(user), Some(token)) = (auth.user(), auth.token(Role::User)) else {
            set_loading_vehicles.set(false);
            return;
        };
        let guard = mounted.get_value();
        set_loading_vehicles.set(true);
        spawn_local(async move {
            let result = marketplace().list_vehicles(&user.id, &token).await;
            guard.apply(result, |result| {
                match result {
                    Ok(list) => set_vehicles.set(list),
                    Err(e) => {
                        tracing::warn!("failed to load vehicles: {e}");
                        toaster.show(Notice::from(&e));
                    }
                }
                set_loading_vehicles.set(false);
            });
        });
    };

    // 初始加载
    load_vehicles();

    let handle_delete = move |id: String| {
        let Some(token) = auth.token(Role::User) else {
            return;
        };
        let guard = mounted.get_value();
        spawn_local(async move {
            let result = marketplace().delete_vehicle(&id, &token).await;
            guard.apply(result, |result| match result {
                Ok(()) => {
                    toaster.show(Notice::success("Vehicle removed"));
                    set_vehicles.update(|list| list.retain(|v| v.id != id));
                }
                Err(e) => toaster.show(Notice::from(&e)),
            });
        });
    };

    let greeting = move || {
        auth.user()
            .map(|u| format!("Welcome, {}", u.display_name()))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <div class="max-w-6xl mx-auto space-y-8">
            <div>
                <h1 class="text-3xl font-bold">{greeting}</h1>
                <p class="text-base-content/70">"What does your vehicle need today?"</p>
            </div>

            <div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3">
                {ServiceCategory::ALL
                    .into_iter()
                    .map(|category| {
                        let config = category.config();
                        view! {
                            <Link to=category.route_path() class="card bg-base-100 shadow-xl hover:shadow-2xl transition">
                                <div class="card-body">
                                    <h2 class="card-title">{config.title}</h2>
                                    <p class="text-sm text-base-content/70">{config.tagline}</p>
                                </div>
                            </Link>
                        }
                    })
                    .collect_view()}
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <div>
                            <h3 class="card-title">"My vehicles"</h3>
                            <p class="text-base-content/70 text-sm">"Vehicles available for booking."</p>
                        </div>
                        <Link to=AppRoute::VehicleForm.to_path() class="btn btn-primary btn-sm">
                            "Add vehicle"
                        </Link>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Vehicle"</th>
                                    <th>"Plate"</th>
                                    <th class="hidden md:table-cell">"Color"</th>
                                    <th class="hidden md:table-cell">"Fuel"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || loading_vehicles.get()>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span> " Loading..."
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || !loading_vehicles.get() && vehicles.with(Vec::is_empty)>
                                    <tr>
                                        <td colspan="5" class="text-center py-8 text-base-content/50">
                                            "No vehicles yet. Add one to start booking."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || vehicles.get()
                                    key=|v| v.id.clone()
                                    children=move |vehicle| {
                                        let id = vehicle.id.clone();
                                        view! {
                                            <tr>
                                                <td class="font-bold">{vehicle.label()}</td>
                                                <td class="font-mono">{vehicle.license_plate.clone()}</td>
                                                <td class="hidden md:table-cell">{vehicle.color.clone()}</td>
                                                <td class="hidden md:table-cell">
                                                    <div class="badge badge-outline">{vehicle.fuel_type.clone()}</div>
                                                </td>
                                                <td>
                                                    <button
                                                        class="btn btn-ghost btn-sm text-error"
                                                        on:click=move |_| handle_delete(id.clone())
                                                    >
                                                        "Delete"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}
