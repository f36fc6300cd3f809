//! 定时器封装模块
//!
//! 基于 `gloo-timers`，配合 `location::Debouncer` 的代数计数实现防抖。

use crate::location::Debouncer;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;

/// 防抖定时器
///
/// 每次 `schedule` 都会取消上一个定时器；即使取消失败，
/// 过期的回调也会被代数检查丢弃。
#[derive(Clone, Default)]
pub struct DebounceTimer {
    state: Rc<RefCell<(Debouncer, Option<Timeout>)>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&self, millis: u32, callback: F)
    where
        F: FnOnce() + 'static,
    {
        let generation = {
            let mut state = self.state.borrow_mut();
            if let Some(previous) = state.1.take() {
                previous.cancel();
            }
            state.0.arm()
        };

        let state = Rc::clone(&self.state);
        let timeout = Timeout::new(millis, move || {
            // 定时器句柄留到下一次 schedule/cancel 再释放
            let due = state.borrow().0.is_current(generation);
            if due {
                callback();
            }
        });
        self.state.borrow_mut().1 = Some(timeout);
    }

    pub fn cancel(&self) {
        let mut state = self.state.borrow_mut();
        state.0.arm();
        if let Some(previous) = state.1.take() {
            previous.cancel();
        }
    }
}
