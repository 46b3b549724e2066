//! 控制模式定义
//!
//! 当前模式（整数模式码）由上层监督器独占写入，驱动层通过只读视图读取，
//! 用于状态上报。

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

/// 空闲 / 手动模式
///
/// 只有在此模式下，服务循环才会自由运行。任何非零值都表示程序控制（slave）模式。
pub const IDLE_MODE: i32 = 0;

/// 当前模式单元（唯一写入者）
///
/// # 设计目的
///
/// - 监督器持有 `ModeCell`，是唯一的写入者
/// - 驱动持有 [`ModeView`]，只能读取
///
/// 写入只发生在服务停止之后（由监督器的 stop-before-write 顺序保证），
/// 因此不需要额外的锁。`ModeCell` 不实现 `Clone`，避免出现第二个写入者。
///
/// # 示例
///
/// ```rust
/// use bcap_driver::mode::{ModeCell, IDLE_MODE};
///
/// let cell = ModeCell::new();
/// let view = cell.view();
///
/// assert_eq!(view.get(), IDLE_MODE);
/// cell.set(0x202);
/// assert_eq!(view.get(), 0x202);
/// ```
#[derive(Debug, Default)]
pub struct ModeCell {
    inner: Arc<AtomicI32>,
}

impl ModeCell {
    /// 创建新的模式单元（初始为空闲模式）
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicI32::new(IDLE_MODE)),
        }
    }

    /// 获取当前模式
    pub fn get(&self) -> i32 {
        self.inner.load(Ordering::Acquire)
    }

    /// 设置模式
    ///
    /// Release: 读取方看到新模式时，也能看到写入前的服务停止状态
    pub fn set(&self, mode: i32) {
        self.inner.store(mode, Ordering::Release);
    }

    /// 是否为空闲模式
    pub fn is_idle(&self) -> bool {
        self.get() == IDLE_MODE
    }

    /// 创建只读视图
    pub fn view(&self) -> ModeView {
        ModeView {
            inner: self.inner.clone(),
        }
    }
}

/// 当前模式的只读视图（驱动侧持有）
#[derive(Debug, Clone)]
pub struct ModeView {
    inner: Arc<AtomicI32>,
}

impl ModeView {
    /// 获取当前模式
    pub fn get(&self) -> i32 {
        self.inner.load(Ordering::Acquire)
    }

    /// 是否为空闲模式
    pub fn is_idle(&self) -> bool {
        self.get() == IDLE_MODE
    }

    /// 创建一个不关联任何监督器的视图（恒为空闲模式）
    pub fn detached() -> Self {
        Self {
            inner: Arc::new(AtomicI32::new(IDLE_MODE)),
        }
    }
}
