//! 驱动层模块
//!
//! 本模块提供 DENSO RC8 / RC9 控制器的驱动能力，包括：
//! - 控制器驱动能力接口（会话初始化、服务启停、轮询、机器人句柄）
//! - 三种硬件变体（RC8、RC8 COBOTTA、RC9）
//! - 当前模式的单写者 / 只读视图
//! - 会话链路抽象与进程内模拟链路
//!
//! # 使用场景
//!
//! 一般不直接使用本 crate，而是通过 `bcap-core` 的监督器管理驱动生命周期。

mod controller;
mod error;
pub mod link;
pub mod mode;
pub mod service;
pub mod sim;

pub use controller::{
    BcapController, COBOTTA_ROBOT_NAME, ControllerDriver, ControllerParams, ControllerVariant,
    DEFAULT_ROBOT_NAME, RobotHandle,
};
pub use error::{DriverError, STATUS_FAIL, STATUS_INVALID_ARG, STATUS_NOT_INITIALIZED};
pub use link::{SessionEndpoint, SessionLink};
pub use mode::{IDLE_MODE, ModeCell, ModeView};
pub use service::ServiceSwitch;
pub use sim::{SimLink, SimStats};
