//! 全局关闭信号
//!
//! 对应宿主进程的全局 "ok" 判定：一旦触发，服务循环在下一次迭代开始时退出。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 全局关闭信号（可克隆，所有克隆共享同一个标志）
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭（不可撤销）
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}
