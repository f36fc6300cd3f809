//! 浏览器凭据存储
//!
//! Cookie 通过 `document.cookie` 读写，资料缓存使用 `gloo-storage` 的 LocalStorage。

use crate::session::CredentialStore;
use gloo_storage::{LocalStorage, Storage};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// 会话 Cookie 有效期（7 天）
const COOKIE_MAX_AGE_SECS: u32 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn document() -> Option<HtmlDocument> {
        web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()
    }

    fn write_cookie(raw: &str) {
        if let Some(doc) = Self::document() {
            if let Err(e) = doc.set_cookie(raw) {
                tracing::error!("failed to write cookie: {e:?}");
            }
        }
    }
}

impl CredentialStore for BrowserStore {
    fn cookie(&self, name: &str) -> Option<String> {
        let all = Self::document()?.cookie().ok()?;
        all.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key != name {
                return None;
            }
            urlencoding::decode(value).ok().map(|v| v.into_owned())
        })
    }

    fn set_cookie(&self, name: &str, value: &str) {
        Self::write_cookie(&format!(
            "{name}={}; path=/; max-age={COOKIE_MAX_AGE_SECS}; SameSite=Lax",
            urlencoding::encode(value)
        ));
    }

    fn remove_cookie(&self, name: &str) {
        Self::write_cookie(&format!("{name}=; path=/; max-age=0; SameSite=Lax"));
    }

    // 缓存值本身就是 JSON 文本，直接用原始 Storage 读写
    fn cached(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set_cached(&self, key: &str, value: &str) {
        if LocalStorage::raw().set_item(key, value).is_err() {
            tracing::warn!("localStorage rejected {key}");
        }
    }

    fn remove_cached(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
