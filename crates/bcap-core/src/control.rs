//! 控制请求通道
//!
//! 宿主前端的服务请求（切换模式、停止）通过有界队列投递给监督器，
//! 由服务循环在每次迭代开始、`poll()` 之前在循环线程上处理。

use crate::error::CoreError;
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError};
use std::time::{Duration, Instant};

/// 请求队列容量
pub const CONTROL_QUEUE_CAPACITY: usize = 16;

/// 控制请求
#[derive(Debug)]
pub enum ControlRequest {
    /// 切换模式，结果通过 `reply` 返回
    ChangeMode {
        mode: i32,
        resume_service: bool,
        reply: Sender<Result<(), CoreError>>,
    },
    /// 停止服务循环
    Stop,
}

/// 控制请求客户端（可克隆，可跨线程）
#[derive(Debug, Clone)]
pub struct ControlClient {
    tx: Sender<ControlRequest>,
}

impl ControlClient {
    pub(crate) fn new(tx: Sender<ControlRequest>) -> Self {
        Self { tx }
    }

    /// 请求切换模式，阻塞直到服务循环处理完毕
    ///
    /// 只有服务循环运行时请求才会被处理。队列已满时立即返回 `QueueFull`。
    pub fn change_mode(&self, mode: i32, resume_service: bool) -> Result<(), CoreError> {
        let reply = self.send_change_mode(mode, resume_service, None)?;
        reply.recv().map_err(|_| CoreError::ChannelClosed)?
    }

    /// 请求切换模式，最多等待 `timeout`（入队与应答共用同一个截止时间）
    ///
    /// 应答超时后请求仍留在队列中，之后仍会被执行。
    pub fn change_mode_timeout(
        &self,
        mode: i32,
        resume_service: bool,
        timeout: Duration,
    ) -> Result<(), CoreError> {
        let deadline = Instant::now() + timeout;
        let reply = self.send_change_mode(mode, resume_service, Some(deadline))?;
        match reply.recv_deadline(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CoreError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(CoreError::ChannelClosed),
        }
    }

    /// 请求停止服务循环（不等待）
    pub fn stop(&self) -> Result<(), CoreError> {
        match self.tx.try_send(ControlRequest::Stop) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(CoreError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(CoreError::ChannelClosed),
        }
    }

    /// 投递模式切换请求
    ///
    /// 没有截止时间时不等待队列空位。
    fn send_change_mode(
        &self,
        mode: i32,
        resume_service: bool,
        deadline: Option<Instant>,
    ) -> Result<Receiver<Result<(), CoreError>>, CoreError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let request = ControlRequest::ChangeMode {
            mode,
            resume_service,
            reply: reply_tx,
        };
        match deadline {
            Some(deadline) => match self.tx.send_deadline(request, deadline) {
                Ok(()) => Ok(reply_rx),
                Err(SendTimeoutError::Timeout(_)) => Err(CoreError::Timeout),
                Err(SendTimeoutError::Disconnected(_)) => Err(CoreError::ChannelClosed),
            },
            None => match self.tx.try_send(request) {
                Ok(()) => Ok(reply_rx),
                Err(TrySendError::Full(_)) => Err(CoreError::QueueFull),
                Err(TrySendError::Disconnected(_)) => Err(CoreError::ChannelClosed),
            },
        }
    }
}
