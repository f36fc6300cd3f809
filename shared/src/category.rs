use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 服务类别
///
/// 每个预约表单实例固定对应一个类别，挂载后不再改变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    Fuel,
    CarWash,
    Tire,
    EmergencyRescue,
    Battery,
    EngineOil,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 6] = [
        Self::Fuel,
        Self::CarWash,
        Self::Tire,
        Self::EmergencyRescue,
        Self::Battery,
        Self::EngineOil,
    ];

    /// 线上传输使用的 slug
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::CarWash => "car-wash",
            Self::Tire => "tire",
            Self::EmergencyRescue => "emergency-rescue",
            Self::Battery => "battery",
            Self::EngineOil => "engine-oil",
        }
    }

    /// 对应的前端路由
    pub fn route_path(&self) -> &'static str {
        match self {
            Self::Fuel => "/fuel-delivery",
            Self::CarWash => "/car-washing",
            Self::Tire => "/tire-services",
            Self::EmergencyRescue => "/emergency-rescue",
            Self::Battery => "/battery-services",
            Self::EngineOil => "/engine-oil-services",
        }
    }

    pub fn from_route_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.route_path() == path)
    }
}

impl Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// 预约方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingType {
    #[default]
    Scheduled,
    OnDemand,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::OnDemand => "on-demand",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "on-demand" => Some(Self::OnDemand),
            _ => None,
        }
    }
}
