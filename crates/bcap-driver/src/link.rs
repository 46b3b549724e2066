//! 会话链路抽象
//!
//! 与物理控制器通信的传输层（b-CAP 等）由外部提供，这里只定义驱动需要的能力。

use crate::error::DriverError;
use std::time::Duration;

/// 会话端点
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEndpoint {
    /// 控制器网络地址
    pub address: String,
    /// 会话配置文件
    pub config_file: String,
    /// 控制周期
    pub cycle: Duration,
}

/// 会话链路
///
/// 所有方法都在驱动内部的锁下调用，实现不需要自行同步。
pub trait SessionLink: Send {
    /// 建立会话
    fn connect(&mut self, endpoint: &SessionEndpoint) -> Result<(), DriverError>;

    /// 保活 / 推进通信状态
    ///
    /// `mode` 是当前模式码，仅用于上报。
    fn heartbeat(&mut self, mode: i32) -> Result<(), DriverError>;

    /// 请求机器人切换模式
    fn change_mode(&mut self, robot: &str, mode: i32) -> Result<(), DriverError>;

    /// 关闭会话
    fn disconnect(&mut self) {}
}

impl<L: SessionLink + ?Sized> SessionLink for Box<L> {
    fn connect(&mut self, endpoint: &SessionEndpoint) -> Result<(), DriverError> {
        (**self).connect(endpoint)
    }

    fn heartbeat(&mut self, mode: i32) -> Result<(), DriverError> {
        (**self).heartbeat(mode)
    }

    fn change_mode(&mut self, robot: &str, mode: i32) -> Result<(), DriverError> {
        (**self).change_mode(robot, mode)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}
