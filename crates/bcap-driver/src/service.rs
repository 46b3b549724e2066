//! 通信服务开关
//!
//! 服务（后台通信活动）是一个简单的二值开关：`start()` / `stop()`。
//! 重复的 `stop()` 必须被容忍。

use std::sync::atomic::{AtomicBool, Ordering};

/// 服务开关（原子版本，用于线程间共享）
///
/// # 使用场景
///
/// - 轮询线程在每次 `poll()` 时读取开关，决定是否与控制器通信
/// - 控制线程在切换模式前关闭开关
#[derive(Debug, Default)]
pub struct ServiceSwitch {
    active: AtomicBool,
}

impl ServiceSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开服务
    ///
    /// 返回 `true` 表示状态发生了变化（之前处于关闭状态）。
    pub fn start(&self) -> bool {
        !self.active.swap(true, Ordering::AcqRel)
    }

    /// 关闭服务
    ///
    /// 返回 `true` 表示状态发生了变化。已关闭时再次调用是无操作。
    pub fn stop(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_transitions() {
        let switch = ServiceSwitch::new();
        assert!(!switch.is_active());

        assert!(switch.start());
        assert!(switch.is_active());
        // 重复打开不改变状态
        assert!(!switch.start());

        assert!(switch.stop());
        assert!(!switch.is_active());
    }

    #[test]
    fn test_duplicate_stop_tolerated() {
        let switch = ServiceSwitch::new();
        assert!(!switch.stop());
        assert!(!switch.stop());
        assert!(!switch.is_active());
    }
}
