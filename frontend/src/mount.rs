//! 组件挂载标记
//!
//! 异步任务在 await 之后先检查标记，组件已卸载时丢弃结果。

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct MountGuard {
    mounted: Rc<Cell<bool>>,
}

impl MountGuard {
    pub fn new() -> Self {
        Self {
            mounted: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// 所有克隆共享同一标记
    pub fn unmount(&self) {
        self.mounted.set(false);
    }

    /// 仍挂载时才执行 `apply`
    pub fn apply<T>(&self, value: T, apply: impl FnOnce(T)) -> bool {
        if !self.is_mounted() {
            tracing::debug!("dropping result for unmounted component");
            return false;
        }
        apply(value);
        true
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use std::cell::RefCell;

    #[test]
    fn test_clones_share_the_flag() {
        let guard = MountGuard::new();
        let task = guard.clone();
        assert!(task.is_mounted());
        guard.unmount();
        assert!(!task.is_mounted());
    }

    #[tokio::test]
    async fn test_late_result_is_dropped_after_unmount() {
        let api = crate::api::MarketplaceApi::new("http://api.test/api", MockHttpClient::new());
        let guard = MountGuard::new();
        let applied = RefCell::new(None);

        let task_guard = guard.clone();
        let pending = async {
            let services = api.list_services(None).await;
            task_guard.apply(services, |s| *applied.borrow_mut() = Some(s))
        };
        // 请求尚未完成时组件已卸载
        guard.unmount();
        assert!(!pending.await);
        assert!(applied.borrow().is_none());
    }
}
