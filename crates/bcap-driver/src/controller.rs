//! 控制器驱动
//!
//! [`ControllerDriver`] 是监督器看到的能力接口：会话初始化、服务启停、轮询、机器人句柄。
//! 三种硬件变体（RC8、RC8 COBOTTA、RC9）由同一个 [`BcapController`] 实现，
//! 通过 [`ControllerVariant`] 标签区分。

use crate::error::DriverError;
use crate::link::{SessionEndpoint, SessionLink};
use crate::mode::ModeView;
use crate::service::ServiceSwitch;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// COBOTTA 的机器人型号名
pub const COBOTTA_ROBOT_NAME: &str = "CVR038A1";

/// 非 COBOTTA 变体使用的通用机器人名
pub const DEFAULT_ROBOT_NAME: &str = "Robot";

/// 控制器驱动（能力接口）
///
/// 所有方法都取 `&self`：轮询线程与控制线程会同时持有同一个驱动，
/// 实现内部负责同步。
pub trait ControllerDriver: Send + Sync {
    /// 硬件系列名（仅用于日志）
    fn family(&self) -> &'static str;

    /// 执行会话握手
    fn initialize_session(&self, config_file: &str) -> Result<(), DriverError>;

    /// 开始通信服务
    fn start_service(&self);

    /// 停止通信服务
    ///
    /// 必须容忍重复调用，以及与 `poll()` 并发调用。
    fn stop_service(&self);

    /// 推进一次通信状态
    ///
    /// 失败由驱动自行记录，不向上传播。
    fn poll(&self);

    /// 获取机器人句柄
    fn robot(&self, index: usize) -> Result<Box<dyn RobotHandle + '_>, DriverError>;
}

/// 机器人句柄
pub trait RobotHandle {
    /// 切换控制模式
    fn change_mode(&self, mode: i32) -> Result<(), DriverError>;
}

/// 控制器硬件变体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerVariant {
    /// RC8 基础型号
    Rc8,
    /// RC8 上的 COBOTTA 紧凑型机械臂
    Rc8Cobotta,
    /// RC9
    Rc9,
}

impl ControllerVariant {
    /// 硬件系列名
    pub fn family(self) -> &'static str {
        match self {
            ControllerVariant::Rc8 => "RC8",
            ControllerVariant::Rc8Cobotta => "RC8 COBOTTA",
            ControllerVariant::Rc9 => "RC9",
        }
    }

    /// 机器人名（模式切换时发给控制器）
    pub fn robot_name(self) -> &'static str {
        match self {
            ControllerVariant::Rc8Cobotta => COBOTTA_ROBOT_NAME,
            ControllerVariant::Rc8 | ControllerVariant::Rc9 => DEFAULT_ROBOT_NAME,
        }
    }
}

impl fmt::Display for ControllerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family())
    }
}

/// 驱动构造参数
#[derive(Debug, Clone)]
pub struct ControllerParams {
    /// 控制器显示名（可为空）
    pub name: String,
    /// 控制器网络地址
    pub address: String,
    /// 控制周期
    pub cycle: Duration,
    /// 当前模式的只读视图
    pub mode: ModeView,
}

/// b-CAP 控制器驱动
///
/// 链路放在 `Mutex` 中：`poll()` 与 `robot(0).change_mode()` 可能来自不同线程。
pub struct BcapController<L: SessionLink> {
    variant: ControllerVariant,
    params: ControllerParams,
    service: ServiceSwitch,
    connected: AtomicBool,
    link: Mutex<L>,
}

impl<L: SessionLink> BcapController<L> {
    pub fn new(variant: ControllerVariant, params: ControllerParams, link: L) -> Self {
        Self {
            variant,
            params,
            service: ServiceSwitch::new(),
            connected: AtomicBool::new(false),
            link: Mutex::new(link),
        }
    }

    pub fn variant(&self) -> ControllerVariant {
        self.variant
    }

    /// 控制器显示名
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// 当前模式（只读）
    pub fn mode(&self) -> i32 {
        self.params.mode.get()
    }

    pub fn is_service_active(&self) -> bool {
        self.service.is_active()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl<L: SessionLink> ControllerDriver for BcapController<L> {
    fn family(&self) -> &'static str {
        self.variant.family()
    }

    fn initialize_session(&self, config_file: &str) -> Result<(), DriverError> {
        if config_file.is_empty() {
            return Err(DriverError::InvalidInput(
                "session config file is empty".to_string(),
            ));
        }

        let endpoint = SessionEndpoint {
            address: self.params.address.clone(),
            config_file: config_file.to_string(),
            cycle: self.params.cycle,
        };
        self.link.lock().connect(&endpoint)?;
        self.connected.store(true, Ordering::Release);

        info!(
            "{} session established: {} ({})",
            self.variant, endpoint.address, endpoint.config_file
        );
        Ok(())
    }

    fn start_service(&self) {
        if self.service.start() {
            debug!("{} service started", self.variant);
        }
    }

    fn stop_service(&self) {
        if self.service.stop() {
            debug!("{} service stopped", self.variant);
        }
    }

    fn poll(&self) {
        if !self.service.is_active() {
            trace!("{} poll skipped: service inactive", self.variant);
            return;
        }

        let mode = self.params.mode.get();
        if let Err(e) = self.link.lock().heartbeat(mode) {
            warn!("{} poll failed: {}", self.variant, e);
        }
    }

    fn robot(&self, index: usize) -> Result<Box<dyn RobotHandle + '_>, DriverError> {
        if !self.is_connected() {
            return Err(DriverError::NotConnected);
        }
        if index != 0 {
            return Err(DriverError::NoSuchRobot(index));
        }
        Ok(Box::new(BcapRobot {
            controller: self,
            name: self.variant.robot_name(),
        }))
    }
}

impl<L: SessionLink> Drop for BcapController<L> {
    fn drop(&mut self) {
        if *self.connected.get_mut() {
            self.service.stop();
            self.link.get_mut().disconnect();
        }
    }
}

/// b-CAP 机器人句柄（借用所属控制器）
struct BcapRobot<'a, L: SessionLink> {
    controller: &'a BcapController<L>,
    name: &'static str,
}

impl<L: SessionLink> RobotHandle for BcapRobot<'_, L> {
    fn change_mode(&self, mode: i32) -> Result<(), DriverError> {
        self.controller.link.lock().change_mode(self.name, mode)?;
        info!(
            "{} {}: mode changed to {:#x}",
            self.controller.variant, self.name, mode
        );
        Ok(())
    }
}
