//! UI 组件层
//!
//! 组件只负责绑定输入与渲染；校验、状态转换与请求编排都在纯逻辑模块中。

pub mod admin_dashboard;
pub mod admin_order_detail;
pub mod admin_orders;
pub mod booking_form;
pub mod dashboard;
pub mod location_picker;
pub mod login;
pub mod payment_success;
pub mod shell;
pub mod signup;
pub mod toast;
pub mod vehicle_form;

use crate::api::MarketplaceApi;
use crate::config::AppConfig;
use crate::location::Geocoder;
use crate::request::FetchHttpClient;

/// 后端 API 客户端
pub fn marketplace() -> MarketplaceApi<FetchHttpClient> {
    MarketplaceApi::new(&AppConfig::from_build_env().api_base_url, FetchHttpClient)
}

/// 地理编码客户端
pub fn geocoder() -> Geocoder<FetchHttpClient> {
    let config = AppConfig::from_build_env();
    Geocoder::new(&config.geocoding_base_url, &config.mapbox_token, FetchHttpClient)
}
