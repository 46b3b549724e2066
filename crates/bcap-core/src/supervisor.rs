//! 生命周期监督器
//!
//! 独占一个控制器驱动，在专用线程上运行固定周期的服务循环，
//! 并允许其他线程并发地停止循环或切换模式。
//!
//! # 并发模型
//!
//! - 循环线程：`start()`，阻塞直到取消标志或全局关闭信号被观察到
//! - 控制线程：`stop()` / `change_mode()`，可以有任意多个
//!
//! `poll_gate` 覆盖循环中"检查取消标志 + `poll()`"这一段。`stop()` 和 `change_mode()`
//! 在调用 `stop_service()` 之前先获取它，因此：
//! - `stop_service()` 返回后循环不会再调用 `poll()`
//! - 模式写入时没有正在进行的 `poll()`
//!
//! 取消是协作式的：正在进行的 `poll()` 不会被打断。

use crate::config::CoreConfig;
use crate::control::{CONTROL_QUEUE_CAPACITY, ControlClient, ControlRequest};
use crate::error::CoreError;
use crate::selector::{ControllerType, DriverFactory, select_driver};
use crate::shutdown::ShutdownSignal;
use bcap_driver::{ControllerDriver, ControllerParams, IDLE_MODE, ModeCell};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 监督器生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// 未配置（初始状态，或初始化失败）
    Unconfigured = 0,
    /// 已初始化，驱动就绪
    Ready = 1,
    /// 服务循环运行中
    Running = 2,
    /// 服务循环已退出
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Ready,
            2 => Self::Running,
            3 => Self::Stopped,
            _ => Self::Unconfigured,
        }
    }
}

/// 生命周期监督器
///
/// # 示例
///
/// ```rust,no_run
/// use bcap_core::{BcapFactory, CoreConfig, RobotCore, ShutdownSignal};
/// use bcap_driver::{ControllerParams, SimLink};
/// use std::sync::Arc;
///
/// let config = CoreConfig {
///     config_file: Some("rc8.xml".to_string()),
///     ..CoreConfig::default()
/// };
/// let factory = BcapFactory::new(|_: &ControllerParams| SimLink::new());
/// let mut core = RobotCore::new(config, factory, ShutdownSignal::new());
/// core.initialize().unwrap();
///
/// let core = Arc::new(core);
/// let looper = core.clone();
/// let handle = std::thread::spawn(move || looper.start());
///
/// core.change_mode(0x202, false).unwrap();
/// core.stop();
/// handle.join().unwrap();
/// ```
pub struct RobotCore {
    config: CoreConfig,
    factory: Box<dyn DriverFactory>,
    /// 活动驱动（初始化成功后才存在）
    driver: Option<Box<dyn ControllerDriver>>,
    /// 当前模式（监督器是唯一写入者）
    mode: ModeCell,
    /// 控制周期（初始化后不变）
    cycle: Duration,
    /// 取消标志
    quit: AtomicBool,
    shutdown: ShutdownSignal,
    /// 服务是否已由监督器打开（保证 start_service 不会连续调用两次）
    service_active: AtomicBool,
    /// 覆盖"检查取消标志 + poll()"
    poll_gate: Mutex<()>,
    /// 串行化 change_mode()
    mode_lock: Mutex<()>,
    state: AtomicU8,
    requests_tx: Sender<ControlRequest>,
    requests_rx: Receiver<ControlRequest>,
}

impl RobotCore {
    /// 创建监督器（未配置状态）
    pub fn new(
        config: CoreConfig,
        factory: impl DriverFactory + 'static,
        shutdown: ShutdownSignal,
    ) -> Self {
        let (requests_tx, requests_rx) = crossbeam_channel::bounded(CONTROL_QUEUE_CAPACITY);
        Self {
            config,
            factory: Box::new(factory),
            driver: None,
            mode: ModeCell::new(),
            cycle: Duration::ZERO,
            quit: AtomicBool::new(false),
            shutdown,
            service_active: AtomicBool::new(false),
            poll_gate: Mutex::new(()),
            mode_lock: Mutex::new(()),
            state: AtomicU8::new(LifecycleState::Unconfigured as u8),
            requests_tx,
            requests_rx,
        }
    }

    /// 初始化：选择驱动并执行会话握手
    ///
    /// # 错误
    ///
    /// - `CoreError::MissingParameter`: 缺少会话配置文件或控制周期
    /// - `CoreError::InvalidParameter`: 控制周期无效
    /// - `CoreError::UnsupportedController`: 控制器类型码不是 8 或 9
    /// - `CoreError::Driver`: 会话握手失败（驱动状态码原样透传）
    ///
    /// 任何失败都使监督器保持未配置状态，不保留驱动。
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        let config_file = self.config.session_config_file()?.to_string();
        let cycle = self.config.control_cycle()?;

        let params = ControllerParams {
            name: self.config.controller_name.clone(),
            address: self.config.ip_address.clone(),
            cycle,
            mode: self.mode.view(),
        };
        let driver = select_driver(
            self.factory.as_ref(),
            self.config.controller_type,
            &self.config.robot_model,
            params,
        )?;

        info!("controller hardware: {}", driver.family());
        info!("control cycle [ms]: {:.1}", cycle.as_secs_f64() * 1000.0);

        driver.initialize_session(&config_file)?;

        self.driver = Some(driver);
        self.cycle = cycle;
        self.set_state(LifecycleState::Ready);
        Ok(())
    }

    /// 运行服务循环（阻塞）
    ///
    /// 清除取消标志、打开服务，然后按控制周期循环：处理控制请求、`poll()`。
    /// 启动前已排队的 Stop 请求被丢弃，模式切换请求在第一次迭代中处理。
    /// 只有取消标志或全局关闭信号能让循环退出，`poll()` 的失败不会。
    pub fn start(&self) {
        let Some(driver) = self.driver.as_deref() else {
            error!("start() called before a successful initialize()");
            return;
        };

        self.quit.store(false, Ordering::Release);
        // 启动前排队的 Stop 与被清除的取消标志一起作废
        let mut carried = self.discard_pending_stops();
        {
            let _gate = self.poll_gate.lock();
            self.start_service(driver);
        }
        self.set_state(LifecycleState::Running);
        info!("service loop started (period {:?})", self.cycle);

        let period = self.cycle;
        let mut next_tick = Instant::now() + period;
        let mut iterations: u64 = 0;

        loop {
            if self.should_exit() {
                break;
            }

            for request in carried.drain(..) {
                self.handle_request(request);
            }
            self.process_requests();

            {
                let _gate = self.poll_gate.lock();
                // stop() 可能在处理请求期间被调用
                if self.should_exit() {
                    break;
                }
                driver.poll();
            }
            iterations += 1;

            let now = Instant::now();
            if next_tick > now {
                spin_sleep::sleep(next_tick - now);
                next_tick += period;
            } else {
                warn!(
                    "service loop overrun: iteration finished {:?} after its deadline",
                    now - next_tick
                );
                next_tick = now + period;
            }
        }

        self.set_state(LifecycleState::Stopped);
        info!("service loop exited after {} iterations", iterations);
    }

    /// 停止服务循环（任意线程可调用）
    ///
    /// 设置取消标志，等待当前迭代的 `poll()` 结束，然后关闭服务。
    /// 重复调用只会再次关闭服务，驱动必须容忍。
    pub fn stop(&self) {
        self.quit.store(true, Ordering::Release);

        let Some(driver) = self.driver.as_deref() else {
            debug!("stop() before initialize(): nothing to stop");
            return;
        };
        let _gate = self.poll_gate.lock();
        self.stop_service(driver);
    }

    /// 切换模式
    ///
    /// 1. 无条件关闭服务（保证没有正在进行的 `poll()`）
    /// 2. 通过 0 号机器人句柄切换模式
    /// 3. 成功则记录新模式，任何失败都把模式复位为空闲
    /// 4. 结果模式为空闲且 `resume_service` 为真时，重新打开服务
    ///
    /// 返回值是模式切换本身的结果；模式复位与返回值无关。
    pub fn change_mode(&self, mode: i32, resume_service: bool) -> Result<(), CoreError> {
        let _serial = self.mode_lock.lock();

        let Some(driver) = self.driver.as_deref() else {
            self.mode.set(IDLE_MODE);
            return Err(CoreError::NotInitialized);
        };

        let _gate = self.poll_gate.lock();
        self.stop_service(driver);

        let result = driver
            .robot(0)
            .map_err(CoreError::from)
            .and_then(|robot| match ControllerType::try_from(self.config.controller_type) {
                Ok(ControllerType::Rc8 | ControllerType::Rc9) => {
                    robot.change_mode(mode).map_err(CoreError::from)
                },
                Err(e) => Err(e),
            });

        let applied = if result.is_ok() { mode } else { IDLE_MODE };
        self.mode.set(applied);

        if applied == IDLE_MODE && resume_service {
            self.start_service(driver);
        }

        match &result {
            Ok(()) => info!("mode changed to {:#x}", applied),
            Err(e) => warn!(
                "mode change to {:#x} failed (0x{:08X}): {}; falling back to idle",
                mode,
                e.code(),
                e
            ),
        }
        result
    }

    /// 控制请求客户端
    pub fn control_client(&self) -> ControlClient {
        ControlClient::new(self.requests_tx.clone())
    }

    /// 当前模式
    pub fn current_mode(&self) -> i32 {
        self.mode.get()
    }

    /// 取消标志是否已置位
    pub fn is_stop_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// 是否已成功初始化
    pub fn is_initialized(&self) -> bool {
        self.driver.is_some()
    }

    /// 服务是否处于打开状态
    pub fn is_service_active(&self) -> bool {
        self.service_active.load(Ordering::Acquire)
    }

    /// 生命周期状态
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 控制周期（初始化前为零）
    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    /// 硬件系列名（初始化前为 `None`）
    pub fn family(&self) -> Option<&'static str> {
        self.driver.as_deref().map(|d| d.family())
    }

    /// 监督器配置
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn should_exit(&self) -> bool {
        self.quit.load(Ordering::Acquire) || self.shutdown.is_triggered()
    }

    fn start_service(&self, driver: &dyn ControllerDriver) {
        if !self.service_active.swap(true, Ordering::AcqRel) {
            driver.start_service();
        }
    }

    fn stop_service(&self, driver: &dyn ControllerDriver) {
        self.service_active.store(false, Ordering::Release);
        driver.stop_service();
    }

    /// 在循环线程上处理所有待处理的控制请求
    fn process_requests(&self) {
        while let Ok(request) = self.requests_rx.try_recv() {
            self.handle_request(request);
        }
    }

    /// 取出队列中的请求，丢弃 Stop，其余留给第一次迭代处理
    fn discard_pending_stops(&self) -> Vec<ControlRequest> {
        let mut carried = Vec::new();
        let mut discarded = 0usize;
        while let Ok(request) = self.requests_rx.try_recv() {
            match request {
                ControlRequest::Stop => discarded += 1,
                other => carried.push(other),
            }
        }
        if discarded > 0 {
            debug!("discarded {} stop request(s) queued before start()", discarded);
        }
        carried
    }

    fn handle_request(&self, request: ControlRequest) {
        match request {
            ControlRequest::ChangeMode {
                mode,
                resume_service,
                reply,
            } => {
                trace!("control request: change mode {:#x}", mode);
                let result = self.change_mode(mode, resume_service);
                // 请求方可能已超时放弃
                let _ = reply.send(result);
            },
            ControlRequest::Stop => {
                trace!("control request: stop");
                self.stop();
            },
        }
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Drop for RobotCore {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.as_deref()
            && *self.service_active.get_mut()
        {
            driver.stop_service();
        }
    }
}
