//! 浏览器相关模块
//!
//! `route` 是纯逻辑，可在原生目标下测试；其余模块直接操作浏览器 API，仅在 WASM 下编译。

pub mod route;

#[cfg(target_arch = "wasm32")]
pub mod router;
#[cfg(target_arch = "wasm32")]
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod timer;
#[cfg(target_arch = "wasm32")]
pub mod geolocation;
