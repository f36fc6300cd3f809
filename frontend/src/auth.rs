//! 认证模块
//!
//! 管理客户与管理员的会话状态，与路由系统解耦。
//! 路由服务通过注入的认证快照信号来检查认证状态。

use crate::notify::Notice;
use crate::session::{CredentialStore, Role, SessionStore};
use crate::web::route::{AppRoute, AuthSnapshot};
use autoserve_shared::UserProfile;

/// `refresh` 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// 因 `exp` 过期而被注销的角色
    pub expired: Vec<Role>,
    /// 内存中的会话是否有变化
    pub changed: bool,
}

/// 会话管理器
///
/// 只有它会修改会话；内存中的资料来自 `SessionStore`。
#[derive(Debug, Clone)]
pub struct SessionManager<S: CredentialStore> {
    sessions: SessionStore<S>,
    user: Option<UserProfile>,
    admin: Option<UserProfile>,
    loading: bool,
}

impl<S: CredentialStore> SessionManager<S> {
    /// 创建后处于加载状态，直到 `init` 被调用
    pub fn new(store: S) -> Self {
        Self {
            sessions: SessionStore::new(store),
            user: None,
            admin: None,
            loading: true,
        }
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn admin(&self) -> Option<&UserProfile> {
        self.admin.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn token(&self, role: Role) -> Option<String> {
        self.sessions.token(role)
    }

    /// 同步读取两个槽位
    pub fn init(&mut self) {
        self.user = self.read_slot(Role::User);
        self.admin = self.read_slot(Role::Admin);
        self.loading = false;
        tracing::info!(
            "session init: user={} admin={}",
            self.user.is_some(),
            self.admin.is_some()
        );
    }

    fn read_slot(&self, role: Role) -> Option<UserProfile> {
        if !self.sessions.has_session(role) {
            return None;
        }
        // 令牌存在但资料不可读时，仍视为已登录（资料为空）
        Some(self.sessions.profile(role).unwrap_or_default())
    }

    /// 登录：先持久化，再更新内存状态，返回应导航到的路由
    pub fn login(&mut self, role: Role, token: &str, profile: UserProfile) -> AppRoute {
        self.sessions.store_session(role, token, &profile);
        match role {
            Role::User => self.user = Some(profile),
            Role::Admin => self.admin = Some(profile),
        }
        self.loading = false;
        role.home()
    }

    pub fn logout(&mut self, role: Role) -> (AppRoute, Notice) {
        self.sessions.clear(role);
        match role {
            Role::User => self.user = None,
            Role::Admin => self.admin = None,
        }
        (role.login_route(), Notice::success("Logged out successfully"))
    }

    /// 重新读取两个槽位；`exp` 已过期的会话会被注销
    pub fn refresh(&mut self, now_secs: i64) -> RefreshOutcome {
        let before = (self.user.clone(), self.admin.clone(), self.loading);
        let mut expired = Vec::new();
        for role in Role::ALL {
            let is_expired = self
                .sessions
                .claims(role)
                .is_some_and(|claims| claims.is_expired(now_secs));
            if is_expired {
                tracing::info!("{role:?} session expired");
                self.sessions.clear(role);
                expired.push(role);
            }
        }
        self.user = self.read_slot(Role::User);
        self.admin = self.read_slot(Role::Admin);
        self.loading = false;
        let changed = before != (self.user.clone(), self.admin.clone(), self.loading);
        RefreshOutcome { expired, changed }
    }

    /// 丢弃内存状态，不触碰存储
    pub fn teardown(&mut self) {
        self.user = None;
        self.admin = None;
        self.loading = true;
    }

    /// 守卫使用的快照：以 Cookie 为准
    pub fn auth_state(&self) -> AuthSnapshot {
        AuthSnapshot {
            loading: self.loading,
            user: self.user.is_some() && self.sessions.is_authenticated(),
            admin: self.admin.is_some() && self.sessions.is_admin_authenticated(),
        }
    }
}

// =========================================================
// 响应式包装
// =========================================================

#[cfg(any(target_arch = "wasm32", test))]
mod reactive {
    use super::*;
    use leptos::prelude::*;

    /// 会话管理器信号
    pub type ManagerSignal<S> = RwSignal<SessionManager<S>, LocalStorage>;

    /// 认证快照；相等的快照不会通知订阅者
    pub fn snapshot_memo<S: CredentialStore + 'static>(manager: ManagerSignal<S>) -> Memo<AuthSnapshot> {
        Memo::new(move |_| manager.with(|m| m.auth_state()))
    }

    /// 刷新会话，只有槽位真正变化时才写入信号
    pub fn refresh_manager<S: CredentialStore + 'static>(manager: ManagerSignal<S>, now_secs: i64) -> Vec<Role> {
        let mut expired = Vec::new();
        manager.maybe_update(|m| {
            let outcome = m.refresh(now_secs);
            expired = outcome.expired;
            outcome.changed
        });
        expired
    }
}

// =========================================================
// Leptos 上下文 (仅浏览器)
// =========================================================

#[cfg(target_arch = "wasm32")]
pub use context::{AuthContext, use_auth};

#[cfg(target_arch = "wasm32")]
mod context {
    use super::reactive::{ManagerSignal, refresh_manager, snapshot_memo};
    use super::*;
    use crate::web::storage::BrowserStore;
    use leptos::prelude::*;

    /// 认证上下文
    ///
    /// 包装会话管理器的信号，通过 Context 在组件间共享。
    #[derive(Clone, Copy)]
    pub struct AuthContext {
        manager: ManagerSignal<BrowserStore>,
    }

    impl AuthContext {
        /// 创建新的认证上下文
        pub fn new() -> Self {
            Self {
                manager: RwSignal::new_local(SessionManager::new(BrowserStore)),
            }
        }

        pub fn init(&self) {
            self.manager.update(|m| m.init());
        }

        /// 获取认证快照信号（用于路由服务注入）
        pub fn snapshot_signal(&self) -> Signal<AuthSnapshot> {
            snapshot_memo(self.manager).into()
        }

        pub fn user(&self) -> Option<UserProfile> {
            self.manager.with(|m| m.user().cloned())
        }

        pub fn admin(&self) -> Option<UserProfile> {
            self.manager.with(|m| m.admin().cloned())
        }

        pub fn token(&self, role: Role) -> Option<String> {
            self.manager.with_untracked(|m| m.token(role))
        }

        pub fn login(&self, role: Role, token: &str, profile: UserProfile) -> AppRoute {
            let mut target = role.home();
            self.manager.update(|m| target = m.login(role, token, profile));
            target
        }

        pub fn logout(&self, role: Role) -> (AppRoute, Notice) {
            let mut outcome = (role.login_route(), Notice::success(""));
            self.manager.update(|m| outcome = m.logout(role));
            outcome
        }

        pub fn refresh(&self) -> Vec<Role> {
            refresh_manager(self.manager, chrono::Utc::now().timestamp())
        }

        pub fn teardown(&self) {
            self.manager.update(|m| m.teardown());
        }
    }

    impl Default for AuthContext {
        fn default() -> Self {
            Self::new()
        }
    }

    /// 从 Context 获取认证上下文
    ///
    /// 根组件总是先提供上下文；缺失时退化为一个新的未初始化上下文。
    pub fn use_auth() -> AuthContext {
        use_context::<AuthContext>().unwrap_or_else(|| {
            tracing::error!("AuthContext was not provided");
            AuthContext::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::session::test_tokens::jwt;
    use autoserve_shared::{CACHE_USER_DATA, COOKIE_ADMIN_TOKEN, COOKIE_USER_TOKEN};
    use serde_json::json;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: format!("{name}-id"),
            name: name.to_string(),
            email: format!("{name}@autoserve.app"),
            phone: None,
        }
    }

    #[test]
    fn test_loading_until_init() {
        let mut manager = SessionManager::new(MemoryStore::default());
        assert!(manager.auth_state().loading);

        manager.init();
        assert_eq!(
            manager.auth_state(),
            AuthSnapshot {
                loading: false,
                user: false,
                admin: false
            }
        );
    }

    #[test]
    fn test_init_restores_existing_session() {
        let store = MemoryStore::default();
        SessionStore::new(store.clone()).store_session(Role::User, "a.b.c", &profile("ana"));

        let mut manager = SessionManager::new(store);
        manager.init();
        assert_eq!(manager.user().map(|u| u.name.as_str()), Some("ana"));
        assert!(manager.auth_state().user);
        assert!(!manager.auth_state().admin);
    }

    #[test]
    fn test_login_persists_before_state_and_returns_home() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store.clone());
        manager.init();

        let target = manager.login(Role::Admin, "adm.tok.en", profile("root"));
        assert_eq!(target, AppRoute::AdminDashboard);
        assert_eq!(store.cookie(COOKIE_ADMIN_TOKEN).as_deref(), Some("adm.tok.en"));
        assert!(manager.auth_state().admin);

        let target = manager.login(Role::User, "usr.tok.en", profile("ana"));
        assert_eq!(target, AppRoute::Dashboard);
    }

    #[test]
    fn test_logout_clears_only_its_slot() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store.clone());
        manager.init();
        manager.login(Role::User, "u.t.s", profile("ana"));
        manager.login(Role::Admin, "a.t.s", profile("root"));

        let (route, notice) = manager.logout(Role::User);
        assert_eq!(route, AppRoute::Login);
        assert_eq!(notice.kind, crate::notify::NoticeKind::Success);
        assert!(store.cookie(COOKIE_USER_TOKEN).is_none());
        assert!(store.cached(CACHE_USER_DATA).is_none());
        assert!(manager.user().is_none());
        assert!(manager.admin().is_some());
    }

    #[test]
    fn test_refresh_expires_only_tokens_with_past_exp() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store.clone());
        manager.init();

        let expiring = jwt(json!({"id": "u1", "exp": 1_000}));
        let forever = jwt(json!({"id": "a1"}));
        manager.login(Role::User, &expiring, profile("ana"));
        manager.login(Role::Admin, &forever, profile("root"));

        assert!(manager.refresh(999).expired.is_empty());
        let outcome = manager.refresh(1_000);
        assert_eq!(outcome.expired, vec![Role::User]);
        assert!(outcome.changed);
        assert!(!manager.auth_state().user);
        assert!(manager.auth_state().admin);
        assert!(store.cookie(COOKIE_USER_TOKEN).is_none());
    }

    #[test]
    fn test_refresh_picks_up_external_logout() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store.clone());
        manager.init();
        manager.login(Role::User, "u.t.s", profile("ana"));

        // 另一个标签页清除了 Cookie
        store.remove_cookie(COOKIE_USER_TOKEN);
        assert!(!manager.auth_state().user);
        assert!(manager.refresh(0).changed);
        assert!(manager.user().is_none());
    }

    #[test]
    fn test_teardown_keeps_storage() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store.clone());
        manager.init();
        manager.login(Role::User, "u.t.s", profile("ana"));

        manager.teardown();
        assert!(manager.user().is_none());
        assert!(manager.auth_state().loading);
        assert!(store.cookie(COOKIE_USER_TOKEN).is_some());

        manager.init();
        assert!(manager.auth_state().user);
    }

    #[test]
    fn test_refresh_without_changes_reports_unchanged() {
        let store = MemoryStore::default();
        let mut manager = SessionManager::new(store);
        manager.init();
        manager.login(Role::User, &jwt(json!({"id": "u1", "exp": 5_000})), profile("ana"));

        let before = manager.auth_state();
        for now in [10, 20, 30] {
            assert_eq!(manager.refresh(now), RefreshOutcome::default());
        }
        assert_eq!(manager.auth_state(), before);
    }

    #[test]
    fn test_unchanged_refresh_keeps_snapshot_subscribers_quiet() {
        use super::reactive::{refresh_manager, snapshot_memo};
        use leptos::prelude::*;
        use leptos::reactive::effect::ImmediateEffect;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let owner = Owner::new();
        owner.set();

        let mut initial = SessionManager::new(MemoryStore::default());
        initial.init();
        initial.login(Role::User, &jwt(json!({"id": "u1", "exp": 5_000})), profile("ana"));
        let manager = RwSignal::new_local(initial);
        let snapshot = snapshot_memo(manager);

        let renders = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&renders);
        let _effect = ImmediateEffect::new(move || {
            snapshot.track();
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        for now in [60, 120, 180] {
            assert!(refresh_manager(manager, now).is_empty());
        }
        assert_eq!(renders.load(Ordering::SeqCst), 1);

        assert_eq!(refresh_manager(manager, 5_000), vec![Role::User]);
        assert_eq!(renders.load(Ordering::SeqCst), 2);
        assert!(!snapshot.get_untracked().user);
    }
}
