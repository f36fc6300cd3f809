//! 浏览器日志
//!
//! `tracing` 事件经 fmt 层格式化后写入浏览器控制台，
//! WARN 及以上走 `console.error`，其余走 `console.log`。

use std::io::{self, Write};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// 每条事件一个缓冲，drop 时整体输出
pub struct ConsoleWriter {
    buf: Vec<u8>,
    error: bool,
}

impl Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buf);
        let line = wasm_bindgen::JsValue::from_str(text.trim_end());
        if self.error {
            web_sys::console::error_1(&line);
        } else {
            web_sys::console::log_1(&line);
        }
        self.buf.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            buf: Vec::new(),
            error: false,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            buf: Vec::new(),
            error: *meta.level() <= Level::WARN,
        }
    }
}

/// 安装全局 subscriber；重复调用时保留第一次的安装
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .without_time()
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .try_init();

    if installed.is_err() {
        web_sys::console::log_1(&"[AutoServe] tracing subscriber already installed".into());
    }
}
