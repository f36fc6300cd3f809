//! 会话存储工具
//!
//! 客户与管理员两个相互独立的槽位，每个槽位由一个 Cookie（是否登录的唯一依据）
//! 和一份本地缓存（资料快照）组成。
//!
//! JWT 只解码载荷用于展示，从不校验签名。

use crate::error::ClientError;
use crate::web::route::AppRoute;
use autoserve_shared::{
    CACHE_ADMIN_DATA, CACHE_USER_DATA, COOKIE_ADMIN_TOKEN, COOKIE_USER_TOKEN, TokenClaims,
    UserProfile,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

/// 会话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub fn cookie_name(&self) -> &'static str {
        match self {
            Role::User => COOKIE_USER_TOKEN,
            Role::Admin => COOKIE_ADMIN_TOKEN,
        }
    }

    pub fn cache_key(&self) -> &'static str {
        match self {
            Role::User => CACHE_USER_DATA,
            Role::Admin => CACHE_ADMIN_DATA,
        }
    }

    /// 登录后的落地页
    pub fn home(&self) -> AppRoute {
        match self {
            Role::User => AppRoute::Dashboard,
            Role::Admin => AppRoute::AdminDashboard,
        }
    }

    pub fn login_route(&self) -> AppRoute {
        match self {
            Role::User => AppRoute::Login,
            Role::Admin => AppRoute::AdminLogin,
        }
    }
}

// =========================================================
// 存储抽象
// =========================================================

/// Cookie + 持久缓存的读写接口
///
/// 浏览器实现见 `web::storage::BrowserStore`。
pub trait CredentialStore {
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&self, name: &str, value: &str);
    fn remove_cookie(&self, name: &str);

    fn cached(&self, key: &str) -> Option<String>;
    fn set_cached(&self, key: &str, value: &str);
    fn remove_cached(&self, key: &str);
}

/// 会话工具
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 令牌（非空才算存在）
    pub fn token(&self, role: Role) -> Option<String> {
        self.store
            .cookie(role.cookie_name())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn has_session(&self, role: Role) -> bool {
        self.token(role).is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.has_session(Role::User)
    }

    pub fn is_admin_authenticated(&self) -> bool {
        self.has_session(Role::Admin)
    }

    /// 资料：优先读缓存，否则解码 Cookie 中的令牌
    pub fn profile(&self, role: Role) -> Option<UserProfile> {
        if let Some(raw) = self.store.cached(role.cache_key()) {
            match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => return Some(profile),
                Err(e) => tracing::warn!("cached {} is unreadable: {e}", role.cache_key()),
            }
        }
        self.claims(role).map(UserProfile::from)
    }

    pub fn get_user_data(&self) -> Option<UserProfile> {
        self.profile(Role::User)
    }

    pub fn get_admin_data(&self) -> Option<UserProfile> {
        self.profile(Role::Admin)
    }

    /// 令牌载荷（用于过期检查）
    pub fn claims(&self, role: Role) -> Option<TokenClaims> {
        self.token(role).and_then(|token| decode_claims(&token))
    }

    /// 登录成功后写入：先写 Cookie，再写缓存
    pub fn store_session(&self, role: Role, token: &str, profile: &UserProfile) {
        self.store.set_cookie(role.cookie_name(), token);
        match serde_json::to_string(profile) {
            Ok(raw) => self.store.set_cached(role.cache_key(), &raw),
            Err(e) => tracing::error!("failed to cache {} profile: {e}", role.cache_key()),
        }
    }

    pub fn clear(&self, role: Role) {
        self.store.remove_cookie(role.cookie_name());
        self.store.remove_cached(role.cache_key());
    }

    pub fn logout_user(&self) {
        self.clear(Role::User);
    }

    pub fn logout_admin(&self) {
        self.clear(Role::Admin);
    }
}

// =========================================================
// JWT 载荷解码
// =========================================================

/// 解码 JWT 的载荷段（不校验签名）
pub fn try_decode_claims(token: &str) -> Result<TokenClaims, ClientError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ClientError::Decode("token has no payload segment".to_string()))?;

    // 有的签发方会带上 padding
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// 解码失败只记录日志
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    try_decode_claims(token)
        .inspect_err(|e| tracing::warn!("{e}"))
        .ok()
}

// =========================================================
// 测试用内存存储
// =========================================================

#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use super::CredentialStore;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// 克隆体共享同一份数据，模拟同一个浏览器上下文
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        cookies: Rc<RefCell<HashMap<String, String>>>,
        cache: Rc<RefCell<HashMap<String, String>>>,
    }

    impl CredentialStore for MemoryStore {
        fn cookie(&self, name: &str) -> Option<String> {
            self.cookies.borrow().get(name).cloned()
        }

        fn set_cookie(&self, name: &str, value: &str) {
            self.cookies.borrow_mut().insert(name.to_string(), value.to_string());
        }

        fn remove_cookie(&self, name: &str) {
            self.cookies.borrow_mut().remove(name);
        }

        fn cached(&self, key: &str) -> Option<String> {
            self.cache.borrow().get(key).cloned()
        }

        fn set_cached(&self, key: &str, value: &str) {
            self.cache.borrow_mut().insert(key.to_string(), value.to_string());
        }

        fn remove_cached(&self, key: &str) {
            self.cache.borrow_mut().remove(key);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    /// 构造一个未签名的 JWT
    pub fn jwt(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }
}
