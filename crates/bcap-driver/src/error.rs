//! 驱动层错误类型定义

use thiserror::Error;

/// 通用失败（E_FAIL）
pub const STATUS_FAIL: u32 = 0x8000_4005;

/// 参数无效（E_INVALIDARG）
pub const STATUS_INVALID_ARG: u32 = 0x8007_0057;

/// 对象未初始化（E_NOT_INITIALIZED 语义，沿用 COM 保留码）
pub const STATUS_NOT_INITIALIZED: u32 = 0x8000_0008;

/// 驱动层错误类型
///
/// 每个错误都带有一个不透明的 32 位状态码（`code()`），
/// 上层只负责记录和转发，不解释其含义。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// 会话握手失败（控制器拒绝连接或配置文件无效）
    #[error("Failed to open session to {endpoint} (0x{code:08X})")]
    Connect { endpoint: String, code: u32 },

    /// 会话尚未建立
    #[error("Session not established")]
    NotConnected,

    /// 机器人索引不存在（当前只支持单臂，索引 0）
    #[error("No robot at index {0}")]
    NoSuchRobot(usize),

    /// 控制器拒绝切换到指定模式
    #[error("Controller rejected mode {mode:#x} (0x{code:08X})")]
    ModeRejected { mode: i32, code: u32 },

    /// 链路层错误（通信中断、超时等）
    #[error("Link error (0x{code:08X}): {message}")]
    Link { code: u32, message: String },

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 不透明状态码
    pub fn code(&self) -> u32 {
        match self {
            DriverError::Connect { code, .. }
            | DriverError::ModeRejected { code, .. }
            | DriverError::Link { code, .. } => *code,
            DriverError::NotConnected => STATUS_NOT_INITIALIZED,
            DriverError::NoSuchRobot(_) | DriverError::InvalidInput(_) => STATUS_INVALID_ARG,
        }
    }
}
