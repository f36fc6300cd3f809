//! AutoServe 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫策略（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth` / `session`: 会话管理
//! - `booking` / `location` / `orders` / `forms`: 与 DOM 无关的页面状态
//! - `components`: UI 组件层
//!
//! 纯逻辑模块在原生目标下测试，组件与浏览器封装只在 WASM 下编译。

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod error;
pub mod forms;
pub mod location;
pub mod mount;
pub mod notify;
pub mod orders;
pub mod request;
pub mod session;
pub mod web;

#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
pub mod logging;

#[cfg(target_arch = "wasm32")]
pub use app::App;

#[cfg(target_arch = "wasm32")]
mod app {
    use crate::auth::AuthContext;
    use crate::components::admin_dashboard::AdminDashboardPage;
    use crate::components::admin_order_detail::AdminOrderDetailPage;
    use crate::components::admin_orders::AdminOrdersPage;
    use crate::components::booking_form::BookingFormPage;
    use crate::components::dashboard::DashboardPage;
    use crate::components::login::LoginPage;
    use crate::components::payment_success::PaymentSuccessPage;
    use crate::components::shell::layout;
    use crate::components::signup::{OtpPage, SignupPage};
    use crate::components::toast::{ToastHost, Toaster};
    use crate::components::vehicle_form::VehicleFormPage;
    use crate::notify::Notice;
    use crate::session::Role;
    use crate::web::route::AppRoute;
    use crate::web::router::{Link, Router, RouterOutlet};
    use gloo_timers::callback::Interval;
    use leptos::prelude::*;

    /// 会话过期检查间隔
    const SESSION_REFRESH_MS: u32 = 60_000;

    /// 路由匹配函数
    ///
    /// 根据 AppRoute 枚举返回对应的视图组件。
    fn route_matcher(route: AppRoute) -> AnyView {
        match route {
            AppRoute::Signup => view! { <SignupPage /> }.into_any(),
            AppRoute::Login => view! { <LoginPage role=Role::User /> }.into_any(),
            AppRoute::Otp => view! { <OtpPage /> }.into_any(),
            AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
            AppRoute::VehicleForm => view! { <VehicleFormPage /> }.into_any(),
            AppRoute::Booking(category) => view! { <BookingFormPage category=category /> }.into_any(),
            AppRoute::PaymentSuccess => view! { <PaymentSuccessPage /> }.into_any(),
            AppRoute::AdminLogin => view! { <LoginPage role=Role::Admin /> }.into_any(),
            AppRoute::AdminDashboard => view! { <AdminDashboardPage /> }.into_any(),
            AppRoute::AdminOrders => view! { <AdminOrdersPage /> }.into_any(),
            AppRoute::AdminOrderDetail(id) => view! { <AdminOrderDetailPage id=id /> }.into_any(),
            AppRoute::NotFound => view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div class="text-center">
                        <h1 class="text-6xl font-bold text-error">"404"</h1>
                        <p class="text-xl mt-4">"Page not found"</p>
                        <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary mt-6">"Go home"</Link>
                    </div>
                </div>
            }
            .into_any(),
        }
    }

    #[component]
    pub fn App() -> impl IntoView {
        // 1. 创建认证上下文与提示通道
        let auth_ctx = AuthContext::new();
        provide_context(auth_ctx);
        let toaster = Toaster::new();
        provide_context(toaster);

        // 2. 同步初始化会话（Cookie + LocalStorage）
        auth_ctx.init();

        // 3. 定期检查令牌过期
        let refresher = Interval::new(SESSION_REFRESH_MS, move || {
            if !auth_ctx.refresh().is_empty() {
                toaster.show(Notice::info("Your session has expired. Please log in again."));
            }
        });
        let refresher = StoredValue::new_local(Some(refresher));
        on_cleanup(move || {
            refresher.update_value(|timer| {
                if let Some(timer) = timer.take() {
                    timer.cancel();
                }
            });
            auth_ctx.teardown();
        });

        // 4. 获取认证快照信号，用于注入路由服务（解耦！）
        let auth = auth_ctx.snapshot_signal();

        view! {
            <ToastHost toaster=toaster />
            <Router auth=auth on_notice=toaster.callback()>
                <RouterOutlet matcher=route_matcher layout=layout />
            </Router>
        }
    }
}
