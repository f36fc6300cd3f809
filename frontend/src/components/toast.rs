use crate::notify::Notice;
use leptos::prelude::*;

/// 提示停留时间
const TOAST_DURATION_SECS: u64 = 3;

/// 全局提示通道
///
/// 每次显示都会递增代数，过期的自动关闭不会清掉更新的提示。
#[derive(Clone, Copy)]
pub struct Toaster {
    current: RwSignal<Option<(u64, Notice)>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
        }
    }

    pub fn show(&self, notice: Notice) {
        self.current.update(|current| {
            let generation = current.as_ref().map_or(0, |(g, _)| g + 1);
            *current = Some((generation, notice));
        });
    }

    pub fn dismiss(&self) {
        self.current.set(None);
    }

    /// 作为路由等外部模块的回调
    pub fn callback(&self) -> Callback<Notice> {
        let toaster = *self;
        Callback::new(move |notice| toaster.show(notice))
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().unwrap_or_else(|| {
        tracing::error!("Toaster was not provided");
        Toaster::new()
    })
}

#[component]
pub fn ToastHost(toaster: Toaster) -> impl IntoView {
    // 3秒后清除通知
    Effect::new(move |_| {
        if let Some((generation, _)) = toaster.current.get() {
            set_timeout(
                move || {
                    let expired = toaster
                        .current
                        .with_untracked(|c| c.as_ref().is_some_and(|(g, _)| *g == generation));
                    if expired {
                        toaster.dismiss();
                    }
                },
                std::time::Duration::from_secs(TOAST_DURATION_SECS),
            );
        }
    });

    move || {
        toaster.current.get().map(|(_, notice)| {
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=notice.kind.alert_class() on:click=move |_| toaster.dismiss()>
                        <span>{notice.message}</span>
                    </div>
                </div>
            }
        })
    }
}
