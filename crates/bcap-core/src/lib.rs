//! 控制器生命周期监督模块
//!
//! 本模块管理单个 DENSO 控制器会话的完整生命周期，包括：
//! - 根据配置选择驱动变体（RC8 / RC8 COBOTTA / RC9）
//! - 会话初始化握手
//! - 固定周期的服务循环（保持通信通道活跃）
//! - 运行时模式切换（手动 / 程序控制），失败时自动复位为空闲模式
//!
//! # 使用场景
//!
//! 进程入口读取配置 → `RobotCore::initialize()` → 专用线程运行 `RobotCore::start()` →
//! 其他线程按需调用 `stop()` / `change_mode()`，或通过 [`ControlClient`] 投递请求。

pub mod config;
pub mod control;
mod error;
pub mod selector;
pub mod shutdown;
mod supervisor;

pub use config::CoreConfig;
pub use control::{ControlClient, ControlRequest};
pub use error::CoreError;
pub use selector::{
    BcapFactory, COBOTTA_MODEL, ControllerType, DriverFactory, is_cobotta_model, select_driver,
    select_variant,
};
pub use shutdown::ShutdownSignal;
pub use supervisor::{LifecycleState, RobotCore};
