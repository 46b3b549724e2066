//! 监督器错误类型定义

use bcap_driver::{DriverError, STATUS_FAIL, STATUS_INVALID_ARG, STATUS_NOT_INITIALIZED};
use thiserror::Error;

/// 监督器错误类型
///
/// # 错误分类
///
/// - 配置错误（`MissingParameter` / `InvalidParameter` / `UnsupportedController` / `Config`）：
///   致命，在 `initialize()` 阶段检测，调用方应中止启动
/// - 会话握手错误（`Driver`）：原样透传驱动的状态码，同样致命
/// - 模式切换错误：由监督器就地恢复（模式复位为空闲），状态码仍返回给调用方
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// 必需参数缺失
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// 参数值无效
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// 不支持的控制器类型
    #[error("Invalid argument value [controller_type]: {0}")]
    UnsupportedController(i32),

    /// 配置文件读取或解析失败
    #[error("Config error: {0}")]
    Config(String),

    /// 尚未成功初始化
    #[error("Supervisor not initialized")]
    NotInitialized,

    /// 控制请求通道已关闭（监督器已析构）
    #[error("Control channel closed")]
    ChannelClosed,

    /// 控制请求队列已满
    #[error("Control queue full")]
    QueueFull,

    /// 等待控制请求应答超时
    #[error("Control request timeout")]
    Timeout,

    /// 驱动错误（原样透传）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl CoreError {
    /// 不透明状态码
    ///
    /// 驱动错误透传驱动自己的状态码。
    pub fn code(&self) -> u32 {
        match self {
            CoreError::UnsupportedController(_) | CoreError::InvalidParameter { .. } => {
                STATUS_INVALID_ARG
            },
            CoreError::NotInitialized => STATUS_NOT_INITIALIZED,
            CoreError::MissingParameter(_)
            | CoreError::Config(_)
            | CoreError::ChannelClosed
            | CoreError::QueueFull
            | CoreError::Timeout => STATUS_FAIL,
            CoreError::Driver(e) => e.code(),
        }
    }

    /// 是否属于配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CoreError::MissingParameter(_)
                | CoreError::InvalidParameter { .. }
                | CoreError::UnsupportedController(_)
                | CoreError::Config(_)
        )
    }
}
