//! AutoServe 共享领域模型
//!
//! 前端与后端协议共用的纯数据层，不依赖 DOM：
//! - `category` / `catalog`: 服务类别与价格、时长规则表
//! - `draft`: 预约草稿及其校验
//! - `order` / `account` / `geo`: 后端与地图服务返回的数据结构
//! - `protocol`: 类型化的 API 请求定义

pub mod account;
pub mod catalog;
pub mod category;
pub mod date;
pub mod draft;
pub mod error;
pub mod geo;
pub mod order;
pub mod protocol;

pub use account::{NewService, NewVehicle, Reference, Service, TokenClaims, UserProfile, Vehicle};
pub use catalog::{
    AttributeKind, AttributeSpec, CategoryConfig, Choice, DurationRange, Estimate, Price, Rate,
    ServiceTypeSpec, Surcharge,
};
pub use category::{BookingType, ServiceCategory};
pub use draft::{Attributes, BookingDraft, EmergencyContact, Location};
pub use error::ValidationError;
pub use geo::{Coordinates, FeatureCollection, GeoFeature};
pub use order::{Address, NewOrder, Order, OrderCustomer, OrderLine, OrderStatus, StatusStyle};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 客户会话 Cookie（是否登录的唯一依据）
pub const COOKIE_USER_TOKEN: &str = "token";
/// 管理员会话 Cookie
pub const COOKIE_ADMIN_TOKEN: &str = "adminToken";
/// 客户资料缓存键（LocalStorage）
pub const CACHE_USER_DATA: &str = "userData";
/// 管理员资料缓存键（LocalStorage）
pub const CACHE_ADMIN_DATA: &str = "adminData";

pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// 订单的默认支付方式与状态（支付流程不在前端处理）
pub const DEFAULT_PAYMENT_METHOD: &str = "card";
pub const DEFAULT_PAYMENT_STATUS: &str = "paid";

/// 即时服务（on-demand / emergency）下单时使用的排期值
pub const SCHEDULE_NOW: &str = "now";
