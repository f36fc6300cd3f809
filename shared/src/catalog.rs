//! 服务目录与计价规则
//!
//! 六种服务类别共享同一套加法结构：
//! 基础价（按服务类型，可按某个属性细分或按数量计价）
//! + 选中附加项的固定加价 + 即时服务加价。
//! 时长采用相同结构（分钟），以 `"lo-hi"` 区间表示，`hi = lo + buffer`。
//!
//! 价格由客户端计算，服务端原样接受总价。

use crate::category::{BookingType, ServiceCategory};
use crate::draft::{Attributes, BookingDraft};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =========================================================
// Price - 以美分存储的金额
// =========================================================

/// 金额（美分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    #[inline]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[inline]
    pub const fn dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    #[inline]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// 后端以美元浮点数接收金额
    #[inline]
    pub fn as_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "${}", self.0 / 100)
        } else {
            write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
        }
    }
}

// =========================================================
// Estimate
// =========================================================

/// 时长区间（分钟）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub lo: u32,
    pub hi: u32,
}

impl Display for DurationRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

/// 价格与时长估算，只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub price: Price,
    pub duration: DurationRange,
}

// =========================================================
// 规则表结构
// =========================================================

/// 计价/计时规则
///
/// 同一枚举既用于价格（美分）也用于时长（分钟）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    /// 固定值
    Flat(u64),
    /// 按属性给出的数量计价（如轮胎数、加仑数）
    PerUnit { attribute: &'static str, each: u64 },
    /// 按属性的取值查表（如电池型号、机油类型）
    ByOption {
        attribute: &'static str,
        table: &'static [(&'static str, u64)],
    },
}

impl Rate {
    fn resolve(&self, attributes: &Attributes) -> Result<u64, ValidationError> {
        match *self {
            Rate::Flat(value) => Ok(value),
            Rate::PerUnit { attribute, each } => {
                let raw = attributes
                    .get(attribute)
                    .ok_or(ValidationError::MissingAttribute(attribute))?;
                let units: u64 = raw.parse().map_err(|_| ValidationError::InvalidAttribute {
                    key: attribute.to_string(),
                    value: raw.clone(),
                })?;
                Ok(units * each)
            }
            Rate::ByOption { attribute, table } => {
                let raw = attributes
                    .get(attribute)
                    .ok_or(ValidationError::MissingAttribute(attribute))?;
                table
                    .iter()
                    .find(|(option, _)| option == raw)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| ValidationError::InvalidAttribute {
                        key: attribute.to_string(),
                        value: raw.clone(),
                    })
            }
        }
    }
}

/// 服务类型定义
#[derive(Debug, Clone, Copy)]
pub struct ServiceTypeSpec {
    pub key: &'static str,
    pub label: &'static str,
    /// 价格规则（美分）
    pub price: Rate,
    /// 时长规则（分钟）
    pub minutes: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// 下拉框 / 单选框
    Choice(&'static [Choice]),
    /// 复选框，取值 "true" / "false"
    Toggle,
}

/// 类别专属的选项定义
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: AttributeKind,
    pub default: &'static str,
    /// 仅对这些服务类型生效；`None` 表示对全部服务类型生效
    pub applies_to: Option<&'static [&'static str]>,
}

impl AttributeSpec {
    pub fn applies(&self, service_type: &str) -> bool {
        self.applies_to
            .is_none_or(|types| types.contains(&service_type))
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            AttributeKind::Choice(choices) => choices.iter().any(|c| c.value == value),
            AttributeKind::Toggle => matches!(value, "true" | "false"),
        }
    }
}

/// 当 `attribute == value` 时追加的价格与时长
#[derive(Debug, Clone, Copy)]
pub struct Surcharge {
    pub attribute: &'static str,
    pub value: &'static str,
    pub price: u64,
    pub minutes: u64,
}

/// 单个服务类别的完整配置
#[derive(Debug)]
pub struct CategoryConfig {
    pub category: ServiceCategory,
    pub title: &'static str,
    pub tagline: &'static str,
    /// 用于在后端服务目录中按名称子串匹配通用服务记录
    pub keyword: &'static str,
    pub service_types: &'static [ServiceTypeSpec],
    pub attributes: &'static [AttributeSpec],
    pub surcharges: &'static [Surcharge],
    /// 每单固定费用（美分），如送油费
    pub base_fee: u64,
    /// 每单固定时长（分钟）
    pub base_minutes: u64,
    /// 即时服务加价（美分）
    pub on_demand_surcharge: u64,
    /// 时长区间上限的缓冲（分钟）
    pub duration_buffer: u32,
    pub requires_vehicle: bool,
    pub requires_contact: bool,
    pub allows_scheduling: bool,
}

impl CategoryConfig {
    pub fn service_type(&self, key: &str) -> Result<&ServiceTypeSpec, ValidationError> {
        self.service_types
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| ValidationError::UnknownServiceType(key.to_string()))
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.key == key)
    }

    /// 当前服务类型下生效的属性
    pub fn applicable_attributes<'a>(
        &'a self,
        service_type: &'a str,
    ) -> impl Iterator<Item = &'a AttributeSpec> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.applies(service_type))
    }

    /// 校验属性取值是否在定义范围内
    pub fn check_attribute(&self, key: &str, value: &str) -> Result<(), ValidationError> {
        let spec = self.attribute(key).ok_or_else(|| ValidationError::InvalidAttribute {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        if spec.accepts(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidAttribute {
                key: key.to_string(),
                value: value.to_string(),
            })
        }
    }

    pub fn on_demand_surcharge(&self) -> Price {
        Price::from_cents(self.on_demand_surcharge)
    }

    /// 服务端通用服务记录不可用时的本地显示名
    pub fn display_name(&self, service_type: &str) -> String {
        match self.service_type(service_type) {
            Ok(spec) => format!("{} - {}", self.title, spec.label),
            Err(_) => self.title.to_string(),
        }
    }

    /// 计算估算结果
    ///
    /// 纯函数：只依赖草稿中的服务类型、属性与预约方式。
    pub fn estimate(&self, draft: &BookingDraft) -> Result<Estimate, ValidationError> {
        let spec = self.service_type(&draft.service_type)?;
        let attributes = &draft.attributes;

        let mut cents = self.base_fee + spec.price.resolve(attributes)?;
        let mut minutes = self.base_minutes + spec.minutes.resolve(attributes)?;

        for surcharge in self.surcharges {
            let applies = self
                .attribute(surcharge.attribute)
                .is_some_and(|a| a.applies(spec.key));
            if applies && attributes.get(surcharge.attribute).map(String::as_str) == Some(surcharge.value) {
                cents += surcharge.price;
                minutes += surcharge.minutes;
            }
        }

        if draft.booking_type == BookingType::OnDemand {
            cents += self.on_demand_surcharge;
        }

        let lo = u32::try_from(minutes).unwrap_or(u32::MAX);
        Ok(Estimate {
            price: Price::from_cents(cents),
            duration: DurationRange {
                lo,
                hi: lo.saturating_add(self.duration_buffer),
            },
        })
    }
}

impl ServiceCategory {
    pub fn config(&self) -> &'static CategoryConfig {
        match self {
            ServiceCategory::Fuel => &FUEL,
            ServiceCategory::CarWash => &CAR_WASH,
            ServiceCategory::Tire => &TIRE,
            ServiceCategory::EmergencyRescue => &EMERGENCY_RESCUE,
            ServiceCategory::Battery => &BATTERY,
            ServiceCategory::EngineOil => &ENGINE_OIL,
        }
    }
}

// =========================================================
// 规则表 (Tables)
// =========================================================

const DEFAULT_BUFFER: u32 = 15;

const VEHICLE_TYPES: &[Choice] = &[
    Choice { value: "sedan", label: "Sedan / Hatchback" },
    Choice { value: "suv", label: "SUV" },
    Choice { value: "truck", label: "Truck / Van" },
];

const VEHICLE_TYPE: AttributeSpec = AttributeSpec {
    key: "vehicleType",
    label: "Vehicle type",
    kind: AttributeKind::Choice(VEHICLE_TYPES),
    default: "sedan",
    applies_to: None,
};

const fn toggle(key: &'static str, label: &'static str) -> AttributeSpec {
    AttributeSpec {
        key,
        label,
        kind: AttributeKind::Toggle,
        default: "false",
        applies_to: None,
    }
}

const fn extra(attribute: &'static str, value: &'static str, price: u64, minutes: u64) -> Surcharge {
    Surcharge {
        attribute,
        value,
        price,
        minutes,
    }
}

pub static FUEL: CategoryConfig = CategoryConfig {
    category: ServiceCategory::Fuel,
    title: "Fuel Delivery",
    tagline: "Fuel delivered to wherever your vehicle is parked.",
    keyword: "fuel",
    service_types: &[
        ServiceTypeSpec {
            key: "regular",
            label: "Regular Unleaded",
            price: Rate::PerUnit { attribute: "quantity", each: 349 },
            minutes: Rate::PerUnit { attribute: "quantity", each: 1 },
        },
        ServiceTypeSpec {
            key: "premium",
            label: "Premium Unleaded",
            price: Rate::PerUnit { attribute: "quantity", each: 419 },
            minutes: Rate::PerUnit { attribute: "quantity", each: 1 },
        },
        ServiceTypeSpec {
            key: "diesel",
            label: "Diesel",
            price: Rate::PerUnit { attribute: "quantity", each: 399 },
            minutes: Rate::PerUnit { attribute: "quantity", each: 1 },
        },
    ],
    attributes: &[AttributeSpec {
        key: "quantity",
        label: "Quantity",
        kind: AttributeKind::Choice(&[
            Choice { value: "5", label: "5 gallons" },
            Choice { value: "10", label: "10 gallons" },
            Choice { value: "15", label: "15 gallons" },
            Choice { value: "20", label: "20 gallons" },
        ]),
        default: "10",
        applies_to: None,
    }],
    surcharges: &[],
    base_fee: 1000,
    base_minutes: 20,
    on_demand_surcharge: 1500,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: true,
    requires_contact: false,
    allows_scheduling: true,
};

pub static CAR_WASH: CategoryConfig = CategoryConfig {
    category: ServiceCategory::CarWash,
    title: "Car Washing",
    tagline: "Exterior and interior cleaning at your doorstep.",
    keyword: "wash",
    service_types: &[
        ServiceTypeSpec {
            key: "basic",
            label: "Basic Wash",
            price: Rate::Flat(2500),
            minutes: Rate::Flat(30),
        },
        ServiceTypeSpec {
            key: "deluxe",
            label: "Deluxe Wash",
            price: Rate::Flat(4500),
            minutes: Rate::Flat(60),
        },
        ServiceTypeSpec {
            key: "premium",
            label: "Premium Detailing",
            price: Rate::Flat(7500),
            minutes: Rate::Flat(90),
        },
    ],
    attributes: &[
        VEHICLE_TYPE,
        toggle("interiorCleaning", "Interior cleaning"),
        toggle("waxing", "Waxing"),
    ],
    surcharges: &[
        extra("vehicleType", "suv", 1000, 10),
        extra("vehicleType", "truck", 1500, 15),
        extra("interiorCleaning", "true", 2000, 20),
        extra("waxing", "true", 1500, 15),
    ],
    base_fee: 0,
    base_minutes: 0,
    on_demand_surcharge: 1500,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: true,
    requires_contact: false,
    allows_scheduling: true,
};

const PER_TIRE: &[&str] = &["tireChange", "punctureRepair", "balancing"];

pub static TIRE: CategoryConfig = CategoryConfig {
    category: ServiceCategory::Tire,
    title: "Tire Services",
    tagline: "Tire changes, repairs and balancing on site.",
    keyword: "tire",
    service_types: &[
        ServiceTypeSpec {
            key: "tireChange",
            label: "Tire Change",
            price: Rate::PerUnit { attribute: "tireCount", each: 2500 },
            minutes: Rate::PerUnit { attribute: "tireCount", each: 15 },
        },
        ServiceTypeSpec {
            key: "punctureRepair",
            label: "Puncture Repair",
            price: Rate::PerUnit { attribute: "tireCount", each: 2000 },
            minutes: Rate::PerUnit { attribute: "tireCount", each: 20 },
        },
        ServiceTypeSpec {
            key: "balancing",
            label: "Wheel Balancing",
            price: Rate::PerUnit { attribute: "tireCount", each: 1500 },
            minutes: Rate::PerUnit { attribute: "tireCount", each: 10 },
        },
        ServiceTypeSpec {
            key: "rotation",
            label: "Tire Rotation",
            price: Rate::Flat(4000),
            minutes: Rate::Flat(45),
        },
        ServiceTypeSpec {
            key: "pressureCheck",
            label: "Pressure Check",
            price: Rate::Flat(1000),
            minutes: Rate::Flat(15),
        },
    ],
    attributes: &[AttributeSpec {
        key: "tireCount",
        label: "Number of tires",
        kind: AttributeKind::Choice(&[
            Choice { value: "1", label: "1 tire" },
            Choice { value: "2", label: "2 tires" },
            Choice { value: "3", label: "3 tires" },
            Choice { value: "4", label: "4 tires" },
        ]),
        default: "1",
        applies_to: Some(PER_TIRE),
    }],
    surcharges: &[],
    base_fee: 0,
    base_minutes: 0,
    on_demand_surcharge: 2000,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: true,
    requires_contact: false,
    allows_scheduling: true,
};

pub static EMERGENCY_RESCUE: CategoryConfig = CategoryConfig {
    category: ServiceCategory::EmergencyRescue,
    title: "Emergency Rescue",
    tagline: "Immediate roadside assistance, around the clock.",
    keyword: "emergency",
    service_types: &[
        ServiceTypeSpec {
            key: "towing",
            label: "Towing",
            price: Rate::Flat(8000),
            minutes: Rate::Flat(45),
        },
        ServiceTypeSpec {
            key: "jumpStart",
            label: "Jump Start",
            price: Rate::Flat(4000),
            minutes: Rate::Flat(20),
        },
        ServiceTypeSpec {
            key: "lockout",
            label: "Lockout Assistance",
            price: Rate::Flat(5000),
            minutes: Rate::Flat(25),
        },
        ServiceTypeSpec {
            key: "flatTire",
            label: "Flat Tire",
            price: Rate::Flat(4500),
            minutes: Rate::Flat(30),
        },
        ServiceTypeSpec {
            key: "fuelDelivery",
            label: "Emergency Fuel",
            price: Rate::Flat(3500),
            minutes: Rate::Flat(25),
        },
    ],
    attributes: &[
        VEHICLE_TYPE,
        AttributeSpec {
            key: "isVehicleAccessible",
            label: "Is the vehicle accessible?",
            kind: AttributeKind::Choice(&[
                Choice { value: "yes", label: "Yes" },
                Choice { value: "no", label: "No" },
            ]),
            default: "yes",
            applies_to: None,
        },
    ],
    surcharges: &[
        extra("vehicleType", "suv", 1500, 0),
        extra("vehicleType", "truck", 2500, 0),
        extra("isVehicleAccessible", "no", 2000, 15),
    ],
    base_fee: 0,
    base_minutes: 0,
    // 紧急救援总是即时服务，不单独加价
    on_demand_surcharge: 0,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: false,
    requires_contact: true,
    allows_scheduling: false,
};

pub static BATTERY: CategoryConfig = CategoryConfig {
    category: ServiceCategory::Battery,
    title: "Battery Services",
    tagline: "Battery replacement, charging and diagnostics.",
    keyword: "battery",
    service_types: &[
        ServiceTypeSpec {
            key: "replacement",
            label: "Battery Replacement",
            price: Rate::ByOption {
                attribute: "batteryType",
                table: &[("standard", 12000), ("premium", 18000), ("agm", 22000)],
            },
            minutes: Rate::Flat(30),
        },
        ServiceTypeSpec {
            key: "charging",
            label: "Battery Charging",
            price: Rate::Flat(5000),
            minutes: Rate::Flat(45),
        },
        ServiceTypeSpec {
            key: "diagnostics",
            label: "Battery Diagnostics",
            price: Rate::Flat(3000),
            minutes: Rate::Flat(20),
        },
    ],
    attributes: &[
        AttributeSpec {
            key: "batteryType",
            label: "Battery type",
            kind: AttributeKind::Choice(&[
                Choice { value: "standard", label: "Standard" },
                Choice { value: "premium", label: "Premium" },
                Choice { value: "agm", label: "AGM" },
            ]),
            default: "standard",
            applies_to: Some(&["replacement"]),
        },
        toggle("addJumpStart", "Add jump start"),
        toggle("addInspection", "Add electrical inspection"),
    ],
    surcharges: &[
        extra("addJumpStart", "true", 2500, 10),
        extra("addInspection", "true", 1500, 15),
    ],
    base_fee: 0,
    base_minutes: 0,
    on_demand_surcharge: 2000,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: true,
    requires_contact: false,
    allows_scheduling: true,
};

const OIL_TYPES: &[Choice] = &[
    Choice { value: "conventional", label: "Conventional" },
    Choice { value: "syntheticBlend", label: "Synthetic Blend" },
    Choice { value: "synthetic", label: "Full Synthetic" },
];

pub static ENGINE_OIL: CategoryConfig = CategoryConfig {
    category: ServiceCategory::EngineOil,
    title: "Engine Oil Services",
    tagline: "Oil changes and full engine service without the garage visit.",
    keyword: "oil",
    service_types: &[
        ServiceTypeSpec {
            key: "oilChange",
            label: "Oil Change",
            price: Rate::ByOption {
                attribute: "oilType",
                table: &[("conventional", 4000), ("syntheticBlend", 5500), ("synthetic", 7000)],
            },
            minutes: Rate::Flat(30),
        },
        ServiceTypeSpec {
            key: "fullService",
            label: "Full Service",
            price: Rate::ByOption {
                attribute: "oilType",
                table: &[("conventional", 6000), ("syntheticBlend", 7500), ("synthetic", 9000)],
            },
            minutes: Rate::Flat(60),
        },
        ServiceTypeSpec {
            key: "oilTopUp",
            label: "Oil Top-Up",
            price: Rate::ByOption {
                attribute: "oilType",
                table: &[("conventional", 2000), ("syntheticBlend", 2500), ("synthetic", 3000)],
            },
            minutes: Rate::Flat(15),
        },
    ],
    attributes: &[
        AttributeSpec {
            key: "oilType",
            label: "Oil type",
            kind: AttributeKind::Choice(OIL_TYPES),
            default: "conventional",
            applies_to: None,
        },
        VEHICLE_TYPE,
        AttributeSpec {
            key: "filterReplacement",
            label: "Replace oil filter",
            kind: AttributeKind::Toggle,
            default: "false",
            applies_to: Some(&["oilChange", "fullService"]),
        },
    ],
    surcharges: &[
        extra("vehicleType", "suv", 1000, 0),
        extra("vehicleType", "truck", 1500, 10),
        extra("filterReplacement", "true", 1500, 10),
    ],
    base_fee: 0,
    base_minutes: 0,
    on_demand_surcharge: 1500,
    duration_buffer: DEFAULT_BUFFER,
    requires_vehicle: true,
    requires_contact: false,
    allows_scheduling: true,
};

#[cfg(test)]
mod tests;
