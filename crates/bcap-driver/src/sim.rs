//! 进程内模拟链路
//!
//! 无硬件依赖，用于测试和离线运行。所有交互都计入共享的 [`SimStats`]。

use crate::error::{DriverError, STATUS_INVALID_ARG};
use crate::link::{SessionEndpoint, SessionLink};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// 模拟链路统计（原子计数器）
#[derive(Debug, Default)]
pub struct SimStats {
    connects: AtomicU32,
    disconnects: AtomicU32,
    heartbeats: AtomicU64,
    mode_changes: AtomicU32,
    last_reported_mode: AtomicI32,
    last_mode: AtomicI32,
    endpoint: Mutex<Option<SessionEndpoint>>,
}

impl SimStats {
    /// 成功建立会话的次数
    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::Relaxed)
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::Relaxed)
    }

    /// 成功的心跳次数
    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }

    /// 被接受的模式切换次数
    pub fn mode_changes(&self) -> u32 {
        self.mode_changes.load(Ordering::Relaxed)
    }

    /// 最近一次被接受的模式
    pub fn last_mode(&self) -> i32 {
        self.last_mode.load(Ordering::Relaxed)
    }

    /// 最近一次心跳上报的模式
    pub fn last_reported_mode(&self) -> i32 {
        self.last_reported_mode.load(Ordering::Relaxed)
    }

    /// 最近一次连接使用的端点
    pub fn endpoint(&self) -> Option<SessionEndpoint> {
        self.endpoint.lock().clone()
    }
}

/// 模拟链路
///
/// # 示例
///
/// ```rust
/// use bcap_driver::{SessionEndpoint, SessionLink, SimLink};
/// use std::time::Duration;
///
/// let mut link = SimLink::new().reject_mode(0x203);
/// let stats = link.stats();
///
/// let endpoint = SessionEndpoint {
///     address: "127.0.0.1".into(),
///     config_file: "rc8.xml".into(),
///     cycle: Duration::from_millis(8),
/// };
/// link.connect(&endpoint).unwrap();
/// link.heartbeat(0).unwrap();
/// assert!(link.change_mode("Robot", 0x203).is_err());
/// assert_eq!(stats.heartbeats(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SimLink {
    stats: Arc<SimStats>,
    refuse_connect: Option<u32>,
    rejected_modes: Vec<i32>,
    connected: bool,
}

impl SimLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 共享同一个统计对象（多个链路实例累计到一起）
    pub fn with_stats(stats: Arc<SimStats>) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }

    /// 拒绝建立会话，返回给定状态码
    pub fn refuse_connect(mut self, code: u32) -> Self {
        self.refuse_connect = Some(code);
        self
    }

    /// 拒绝切换到给定模式
    pub fn reject_mode(mut self, mode: i32) -> Self {
        self.rejected_modes.push(mode);
        self
    }

    pub fn stats(&self) -> Arc<SimStats> {
        self.stats.clone()
    }
}

impl SessionLink for SimLink {
    fn connect(&mut self, endpoint: &SessionEndpoint) -> Result<(), DriverError> {
        if let Some(code) = self.refuse_connect {
            return Err(DriverError::Connect {
                endpoint: endpoint.address.clone(),
                code,
            });
        }
        self.connected = true;
        self.stats.connects.fetch_add(1, Ordering::Relaxed);
        *self.stats.endpoint.lock() = Some(endpoint.clone());
        Ok(())
    }

    fn heartbeat(&mut self, mode: i32) -> Result<(), DriverError> {
        if !self.connected {
            return Err(DriverError::NotConnected);
        }
        self.stats.last_reported_mode.store(mode, Ordering::Relaxed);
        self.stats.heartbeats.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn change_mode(&mut self, robot: &str, mode: i32) -> Result<(), DriverError> {
        if !self.connected {
            return Err(DriverError::NotConnected);
        }
        if self.rejected_modes.contains(&mode) {
            return Err(DriverError::ModeRejected {
                mode,
                code: STATUS_INVALID_ARG,
            });
        }
        trace!("sim: {} -> mode {:#x}", robot, mode);
        self.stats.last_mode.store(mode, Ordering::Relaxed);
        self.stats.mode_changes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.stats.disconnects.fetch_add(1, Ordering::Relaxed);
        }
    }
}
