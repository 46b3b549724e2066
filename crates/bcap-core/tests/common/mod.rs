//! 记录型驱动
//!
//! 记录监督器对驱动的每一次调用，用于验证调用顺序与并发性质。

#![allow(dead_code)]

use bcap_core::{CoreConfig, DriverFactory};
use bcap_driver::{
    ControllerDriver, ControllerParams, ControllerVariant, DriverError, ModeView, RobotHandle,
    STATUS_INVALID_ARG,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 驱动调用事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    InitSession(String),
    StartService,
    StopService,
    /// `poll()`，附带调用时的服务状态
    Poll { active: bool },
    ChangeMode(i32),
}

/// 共享记录器（测试与驱动各持一份）
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    created: Mutex<Vec<ControllerVariant>>,
    rejected_modes: Mutex<Vec<i32>>,
    session_error: Mutex<Option<DriverError>>,
    robot_unavailable: AtomicBool,
    service_active: AtomicBool,
    poll_delay: Mutex<Duration>,
    last_view: Mutex<Option<ModeView>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    pub fn polls(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Poll { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn created(&self) -> Vec<ControllerVariant> {
        self.created.lock().clone()
    }

    pub fn reject_mode(&self, mode: i32) {
        self.rejected_modes.lock().push(mode);
    }

    pub fn fail_session(&self, error: DriverError) {
        *self.session_error.lock() = Some(error);
    }

    pub fn set_robot_unavailable(&self, unavailable: bool) {
        self.robot_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_poll_delay(&self, delay: Duration) {
        *self.poll_delay.lock() = delay;
    }

    pub fn service_active(&self) -> bool {
        self.service_active.load(Ordering::SeqCst)
    }

    /// 驱动看到的模式（通过只读视图）
    pub fn observed_mode(&self) -> Option<i32> {
        self.last_view.lock().as_ref().map(|v| v.get())
    }

    fn push(&self, event: Event) {
        self.events.lock().push(event);
    }
}

pub struct RecordingDriver {
    variant: ControllerVariant,
    recorder: Arc<Recorder>,
}

impl ControllerDriver for RecordingDriver {
    fn family(&self) -> &'static str {
        self.variant.family()
    }

    fn initialize_session(&self, config_file: &str) -> Result<(), DriverError> {
        self.recorder.push(Event::InitSession(config_file.to_string()));
        match self.recorder.session_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start_service(&self) {
        self.recorder.service_active.store(true, Ordering::SeqCst);
        self.recorder.push(Event::StartService);
    }

    fn stop_service(&self) {
        self.recorder.service_active.store(false, Ordering::SeqCst);
        self.recorder.push(Event::StopService);
    }

    fn poll(&self) {
        let active = self.recorder.service_active();
        self.recorder.push(Event::Poll { active });
        let delay = *self.recorder.poll_delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    fn robot(&self, index: usize) -> Result<Box<dyn RobotHandle + '_>, DriverError> {
        if self.recorder.robot_unavailable.load(Ordering::SeqCst) {
            return Err(DriverError::NotConnected);
        }
        if index != 0 {
            return Err(DriverError::NoSuchRobot(index));
        }
        Ok(Box::new(RecordingRobot {
            recorder: &*self.recorder,
        }))
    }
}

struct RecordingRobot<'a> {
    recorder: &'a Recorder,
}

impl RobotHandle for RecordingRobot<'_> {
    fn change_mode(&self, mode: i32) -> Result<(), DriverError> {
        self.recorder.push(Event::ChangeMode(mode));
        if self.recorder.rejected_modes.lock().contains(&mode) {
            return Err(DriverError::ModeRejected {
                mode,
                code: STATUS_INVALID_ARG,
            });
        }
        Ok(())
    }
}

pub struct RecordingFactory {
    recorder: Arc<Recorder>,
}

impl RecordingFactory {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self { recorder }
    }
}

impl DriverFactory for RecordingFactory {
    fn create(
        &self,
        variant: ControllerVariant,
        params: ControllerParams,
    ) -> Box<dyn ControllerDriver> {
        self.recorder.created.lock().push(variant);
        *self.recorder.last_view.lock() = Some(params.mode);
        Box::new(RecordingDriver {
            variant,
            recorder: self.recorder.clone(),
        })
    }
}

/// 测试用配置
pub fn test_config(controller_type: i32, model: &str, cycle_msec: f64) -> CoreConfig {
    CoreConfig {
        ip_address: "127.0.0.1".to_string(),
        controller_type,
        robot_model: model.to_string(),
        controller_name: "test".to_string(),
        config_file: Some("session.xml".to_string()),
        control_cycle_msec: Some(cycle_msec),
    }
}
