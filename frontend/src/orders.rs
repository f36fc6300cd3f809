//! 管理后台订单视图
//!
//! 列表：一次拉取全部订单，按状态标签与搜索词在本地过滤。
//! 详情：状态与备注各自独立更新，互不影响。

use crate::error::ClientError;
use crate::notify::Notice;
use autoserve_shared::{Order, OrderStatus};
use chrono::DateTime;
use std::cmp::Reverse;

// =========================================================
// 列表过滤
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTab {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusTab {
    /// 标签页顺序
    pub fn all() -> Vec<StatusTab> {
        std::iter::once(StatusTab::All)
            .chain(OrderStatus::SETTABLE.into_iter().map(StatusTab::Only))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusTab::All => "All",
            StatusTab::Only(status) => status.style().label,
        }
    }

    pub fn includes(&self, status: OrderStatus) -> bool {
        match self {
            StatusTab::All => true,
            StatusTab::Only(only) => *only == status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub tab: StatusTab,
    pub search: String,
}

impl OrderFilter {
    /// 搜索词匹配订单号或客户名（不区分大小写）
    fn matches_search(order: &Order, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        order.id.to_lowercase().contains(needle)
            || order
                .customer_name()
                .is_some_and(|name| name.to_lowercase().contains(needle))
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.tab.includes(order.status)
            && Self::matches_search(order, &self.search.trim().to_lowercase())
    }

    /// 过滤并按创建时间倒序
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        let mut visible: Vec<&Order> = orders.iter().filter(|o| self.matches(o)).collect();
        visible.sort_by_key(|o| Reverse(created_at_millis(o)));
        visible
    }
}

/// 无法解析的创建时间排在最后
fn created_at_millis(order: &Order) -> Option<i64> {
    order
        .created_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.timestamp_millis())
}

/// 每个标签页的订单数（不受搜索词影响）
pub fn tab_counts(orders: &[Order]) -> Vec<(StatusTab, usize)> {
    StatusTab::all()
        .into_iter()
        .map(|tab| {
            let count = orders.iter().filter(|o| tab.includes(o.status)).count();
            (tab, count)
        })
        .collect()
}

// =========================================================
// 详情
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct OrderDetailState {
    order: Option<Order>,
    notes_draft: String,
    status_saving: bool,
    notes_saving: bool,
}

impl OrderDetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, order: Order) {
        self.notes_draft = order.admin_notes.clone().unwrap_or_default();
        self.order = Some(order);
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn notes_draft(&self) -> &str {
        &self.notes_draft
    }

    pub fn edit_notes(&mut self, notes: &str) {
        self.notes_draft = notes.to_string();
    }

    pub fn status_saving(&self) -> bool {
        self.status_saving
    }

    pub fn notes_saving(&self) -> bool {
        self.notes_saving
    }

    fn loaded_id(&self) -> Result<String, ClientError> {
        self.order
            .as_ref()
            .map(|o| o.id.clone())
            .ok_or_else(|| ClientError::Malformed("order is not loaded".to_string()))
    }

    /// 返回要请求的订单 id；状态未变化时返回 `None`（不发请求）
    pub fn begin_status_update(&mut self, status: OrderStatus) -> Result<Option<String>, ClientError> {
        let id = self.loaded_id()?;
        if self.status_saving {
            return Err(ClientError::AlreadySubmitting);
        }
        if self.order.as_ref().is_some_and(|o| o.status == status) {
            return Ok(None);
        }
        self.status_saving = true;
        Ok(Some(id))
    }

    pub fn finish_status_update(
        &mut self,
        status: OrderStatus,
        result: Result<Option<Order>, ClientError>,
    ) -> Notice {
        self.status_saving = false;
        match result {
            Ok(updated) => {
                let status = updated.map(|o| o.status).unwrap_or(status);
                if let Some(order) = self.order.as_mut() {
                    order.status = status;
                }
                Notice::success(format!("Order status updated to {status}"))
            }
            Err(e) => {
                tracing::warn!("status update failed: {e}");
                Notice::from(&e)
            }
        }
    }

    /// 返回 (订单 id, 备注)
    pub fn begin_notes_update(&mut self) -> Result<(String, String), ClientError> {
        let id = self.loaded_id()?;
        if self.notes_saving {
            return Err(ClientError::AlreadySubmitting);
        }
        self.notes_saving = true;
        Ok((id, self.notes_draft.trim().to_string()))
    }

    pub fn finish_notes_update(
        &mut self,
        notes: &str,
        result: Result<Option<Order>, ClientError>,
    ) -> Notice {
        self.notes_saving = false;
        match result {
            Ok(_) => {
                if let Some(order) = self.order.as_mut() {
                    order.admin_notes = Some(notes.to_string());
                }
                Notice::success("Notes saved")
            }
            Err(e) => {
                tracing::warn!("notes update failed: {e}");
                Notice::from(&e)
            }
        }
    }
}
