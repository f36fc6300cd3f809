//! 浏览器定位
//!
//! 只请求一次当前位置；拒绝或失败只记录日志。

use autoserve_shared::Coordinates;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub fn current_position<F>(on_position: F)
where
    F: FnOnce(Coordinates) + 'static,
{
    let Some(geolocation) = web_sys::window().and_then(|w| w.navigator().geolocation().ok()) else {
        tracing::warn!("geolocation is not available in this browser");
        return;
    };

    let success = Closure::once_into_js(move |position: web_sys::GeolocationPosition| {
        let coords = position.coords();
        on_position(Coordinates::new(coords.longitude(), coords.latitude()));
    });
    let failure = Closure::once_into_js(move |error: JsValue| {
        tracing::warn!("geolocation request denied or failed: {error:?}");
    });

    if let Err(e) = geolocation.get_current_position_with_error_callback(
        success.unchecked_ref(),
        Some(failure.unchecked_ref()),
    ) {
        tracing::warn!("geolocation request could not start: {e:?}");
    }
}
