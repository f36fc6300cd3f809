//! 导航外壳：客户侧边栏与管理员侧边栏

use crate::auth::use_auth;
use crate::components::toast::use_toaster;
use crate::session::Role;
use crate::web::route::{AppRoute, Shell};
use crate::web::router::{Link, use_navigate};
use autoserve_shared::ServiceCategory;
use leptos::prelude::*;

/// `RouterOutlet` 的布局函数
pub fn layout(shell: Shell, page: AnyView) -> AnyView {
    match shell {
        Shell::None => page,
        Shell::Customer => view! { <CustomerShell page=page /> }.into_any(),
        Shell::Admin => view! { <AdminShell page=page /> }.into_any(),
    }
}

#[component]
fn LogoutButton(role: Role) -> impl IntoView {
    let auth = use_auth();
    let toaster = use_toaster();
    let navigate = use_navigate();

    let on_logout = move |_| {
        let (target, notice) = auth.logout(role);
        toaster.show(notice);
        navigate(&target.to_path());
    };

    view! {
        <button on:click=on_logout class="btn btn-outline btn-error btn-sm w-full">
            "Log out"
        </button>
    }
}

#[component]
fn CustomerShell(page: AnyView) -> impl IntoView {
    let auth = use_auth();
    let greeting = move || {
        auth.user()
            .map(|u| format!("Hi, {}", u.display_name()))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200">
            <input id="customer-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content p-4 md:p-8">
                <label for="customer-drawer" class="btn btn-ghost lg:hidden mb-4">"Menu"</label>
                {page}
            </div>
            <div class="drawer-side z-40">
                <label for="customer-drawer" class="drawer-overlay"></label>
                <aside class="menu bg-base-100 w-64 min-h-full p-4 gap-1">
                    <div class="text-xl font-bold text-primary px-2">"AutoServe"</div>
                    <div class="text-sm text-base-content/70 px-2 mb-4">{greeting}</div>
                    <li><Link to=AppRoute::Dashboard.to_path()>"Dashboard"</Link></li>
                    <li><Link to=AppRoute::VehicleForm.to_path()>"Add vehicle"</Link></li>
                    <li class="menu-title mt-4">"Services"</li>
                    {ServiceCategory::ALL
                        .into_iter()
                        .map(|category| {
                            view! {
                                <li>
                                    <Link to=category.route_path()>{category.config().title}</Link>
                                </li>
                            }
                        })
                        .collect_view()}
                    <div class="mt-auto pt-4">
                        <LogoutButton role=Role::User />
                    </div>
                </aside>
            </div>
        </div>
    }
}

#[component]
fn AdminShell(page: AnyView) -> impl IntoView {
    let auth = use_auth();
    let admin_name = move || {
        auth.admin()
            .map(|a| a.display_name().to_string())
            .unwrap_or_else(|| "Administrator".to_string())
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200">
            <input id="admin-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content p-4 md:p-8">
                <label for="admin-drawer" class="btn btn-ghost lg:hidden mb-4">"Menu"</label>
                {page}
            </div>
            <div class="drawer-side z-40">
                <label for="admin-drawer" class="drawer-overlay"></label>
                <aside class="menu bg-neutral text-neutral-content w-64 min-h-full p-4 gap-1">
                    <div class="text-xl font-bold px-2">"AutoServe Admin"</div>
                    <div class="text-sm opacity-70 px-2 mb-4">{admin_name}</div>
                    <li><Link to=AppRoute::AdminDashboard.to_path()>"Overview"</Link></li>
                    <li><Link to=AppRoute::AdminOrders.to_path()>"Orders"</Link></li>
                    <div class="mt-auto pt-4">
                        <LogoutButton role=Role::Admin />
                    </div>
                </aside>
            </div>
        </div>
    }
}
