//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程，守卫策略见 `route::guard`。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, AuthSnapshot, GuardDecision, Shell, guard};
use crate::notify::Notice;

/// 获取当前浏览器路径（含查询串）
fn current_path() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return "/".to_string();
    };
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    format!("{path}{search}")
}

/// 当前 URL 的查询参数
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn write_history(path: &str, use_push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if use_push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if let Err(e) = result {
        tracing::warn!("history update failed for {path}: {e:?}");
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证快照与通知回调都由外部注入，路由不依赖认证模块本身。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    auth: Signal<AuthSnapshot>,
    on_notice: Callback<Notice>,
}

impl RouterService {
    fn new(auth: Signal<AuthSnapshot>, on_notice: Callback<Notice>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            auth,
            on_notice,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.apply(path, true);
    }

    /// 导航到路由（不带查询串）
    pub fn go(&self, route: &AppRoute) {
        self.navigate(&route.to_path());
    }

    /// 执行守卫并更新 History 与当前路由
    ///
    /// `Wait` 时先记录目标路由，认证加载完成后由 `setup_auth_redirect` 重新判定。
    fn apply(&self, path: &str, use_push: bool) {
        let target = AppRoute::from_path(path);

        match guard(&target, self.auth.get_untracked()) {
            GuardDecision::Redirect { to, notice } => {
                tracing::info!("[Router] {target} redirected to {to}");
                if let Some(notice) = notice {
                    self.on_notice.run(notice);
                }
                write_history(&to.to_path(), use_push);
                self.set_route.set(to);
            }
            GuardDecision::Wait | GuardDecision::Allow(_) => {
                write_history(path, use_push);
                self.set_route.set(target);
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑，重定向使用 replaceState
            router.apply(&current_path(), false);
        });

        if let Some(window) = web_sys::window() {
            if let Err(e) = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
            {
                tracing::error!("failed to register popstate listener: {e:?}");
            }
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化（初始化完成、登录、登出、过期）时重新判定当前路由
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let auth = router.auth.get();
            let route = router.current_route.get_untracked();

            if let GuardDecision::Redirect { to, notice } = guard(&route, auth) {
                tracing::info!("[Router] auth state changed, leaving {route} for {to}");
                if let Some(notice) = notice {
                    router.on_notice.run(notice);
                }
                write_history(&to.to_path(), true);
                router.set_route.set(to);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(auth: Signal<AuthSnapshot>, on_notice: Callback<Notice>) -> RouterService {
    let router = RouterService::new(auth, on_notice);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> Option<RouterService> {
    let router = use_context::<RouterService>();
    if router.is_none() {
        tracing::error!("RouterService not found in context. Ensure Router is provided.");
    }
    router
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(&str) + Clone + Copy {
    let router = use_router();
    move |to: &str| {
        if let Some(router) = router {
            router.navigate(to);
        }
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 认证快照信号
    auth: Signal<AuthSnapshot>,
    /// 守卫产生的提示
    on_notice: Callback<Notice>,
    children: Children,
) -> impl IntoView {
    provide_router(auth, on_notice);

    children()
}

/// 路由出口组件
///
/// 认证加载中或等待重定向时渲染占位，放行时由 `layout` 套上导航外壳。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
    /// 导航外壳
    layout: fn(Shell, AnyView) -> AnyView,
) -> impl IntoView {
    let Some(router) = use_router() else {
        return view! { <p class="p-8">"Router unavailable"</p> }.into_any();
    };

    // 只在放行的 (路由, 外壳) 变化时重建页面
    let page = Memo::new(move |_| {
        let route = router.current_route().get();
        match guard(&route, router.auth.get()) {
            GuardDecision::Allow(shell) => Some((route, shell)),
            GuardDecision::Wait | GuardDecision::Redirect { .. } => None,
        }
    });

    (move || match page.get() {
        Some((route, shell)) => layout(shell, matcher(route)),
        None => view! {
            <div class="flex items-center justify-center min-h-screen">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
    })
    .into_any()
}

/// 站内链接：拦截点击，交给路由服务
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let navigate = use_navigate();
    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
