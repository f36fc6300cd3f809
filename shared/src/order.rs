use crate::account::{Reference, Service};
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

// =========================================================
// 订单状态
// =========================================================

/// 订单状态，由管理员通过 Order API 推进
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
    /// 后端返回了前端未知的状态
    #[serde(other)]
    Unknown,
}

/// 状态徽章的样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub badge_class: &'static str,
}

impl OrderStatus {
    /// 管理员可以设置的状态（下拉框 / 标签页顺序）
    pub const SETTABLE: [OrderStatus; 6] = [
        Self::Pending,
        Self::Approved,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::SETTABLE.into_iter().find(|s| s.as_str() == value)
    }

    /// 状态到样式的封闭映射
    pub fn style(&self) -> StatusStyle {
        match self {
            Self::Pending => StatusStyle {
                label: "Pending",
                badge_class: "badge badge-warning",
            },
            Self::Approved => StatusStyle {
                label: "Approved",
                badge_class: "badge badge-info",
            },
            Self::InProgress => StatusStyle {
                label: "In Progress",
                badge_class: "badge badge-primary",
            },
            Self::Completed => StatusStyle {
                label: "Completed",
                badge_class: "badge badge-success",
            },
            Self::Cancelled => StatusStyle {
                label: "Cancelled",
                badge_class: "badge badge-neutral",
            },
            Self::Rejected => StatusStyle {
                label: "Rejected",
                badge_class: "badge badge-error",
            },
            Self::Unknown => StatusStyle {
                label: "Unknown",
                badge_class: "badge badge-ghost",
            },
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.style().label)
    }
}

// =========================================================
// 订单结构
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub service: Reference<Service>,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub service_details: serde_json::Value,
}

/// 订单中填充的客户信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<Reference<OrderCustomer>>,
    #[serde(default)]
    pub services: Vec<OrderLine>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Order {
    pub fn customer(&self) -> Option<&OrderCustomer> {
        match self.user.as_ref()? {
            Reference::Populated(customer) => Some(customer),
            Reference::Id(_) => None,
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// 订单号的短格式（id 末 8 位）
    pub fn short_id(&self) -> &str {
        let start = self.id.len().saturating_sub(8);
        self.id.get(start..).unwrap_or(&self.id)
    }

    pub fn service_summary(&self) -> String {
        self.services
            .iter()
            .map(|line| line.service_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// `POST /orders/create` 的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub services: Vec<OrderLine>,
    pub address: Address,
    pub total_amount: f64,
    pub scheduled_date: String,
    pub special_instructions: String,
    pub payment_method: String,
    pub payment_status: String,
}
