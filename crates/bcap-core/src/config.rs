//! 监督器配置
//!
//! 字段与默认值对应参数前端声明的参数：
//!
//! ```toml
//! ip_address = "192.168.0.1"
//! controller_type = 8
//! robot_model = "cobotta"
//! controller_name = ""
//! config_file = "/etc/bcap/rc8_config.xml"
//! control_cycle_msec = 8.0
//! ```

use crate::error::CoreError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 默认控制器地址
pub const DEFAULT_IP_ADDRESS: &str = "127.0.0.1";

/// 默认控制器类型（RC8）
pub const DEFAULT_CONTROLLER_TYPE: i32 = 8;

/// 默认控制周期（毫秒）
pub const DEFAULT_CONTROL_CYCLE_MSEC: f64 = 8.0;

/// 监督器配置
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// 控制器网络地址
    pub ip_address: String,
    /// 控制器类型码（8 = RC8，9 = RC9）
    pub controller_type: i32,
    /// 机器人型号标识（仅用于区分 RC8 上的 COBOTTA）
    pub robot_model: String,
    /// 控制器显示名（可为空）
    pub controller_name: String,
    /// 会话配置文件（必需）
    pub config_file: Option<String>,
    /// 控制周期（毫秒）
    pub control_cycle_msec: Option<f64>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ip_address: DEFAULT_IP_ADDRESS.to_string(),
            controller_type: DEFAULT_CONTROLLER_TYPE,
            robot_model: String::new(),
            controller_name: String::new(),
            config_file: None,
            control_cycle_msec: Some(DEFAULT_CONTROL_CYCLE_MSEC),
        }
    }
}

impl CoreConfig {
    /// 从 TOML 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// 会话配置文件（缺失或为空都视为致命错误）
    pub fn session_config_file(&self) -> Result<&str, CoreError> {
        match self.config_file.as_deref() {
            Some(file) if !file.is_empty() => Ok(file),
            _ => Err(CoreError::MissingParameter("config_file")),
        }
    }

    /// 控制周期
    ///
    /// 缺失时返回错误，不在此处替换为默认值。
    pub fn control_cycle(&self) -> Result<Duration, CoreError> {
        let msec = self
            .control_cycle_msec
            .ok_or(CoreError::MissingParameter("control_cycle_msec"))?;
        if !msec.is_finite() || msec <= 0.0 {
            return Err(CoreError::InvalidParameter {
                name: "control_cycle_msec",
                reason: format!("{} (must be a positive number of milliseconds)", msec),
            });
        }
        let cycle = Duration::from_nanos((msec * 1_000_000.0).round() as u64);
        if cycle.is_zero() {
            return Err(CoreError::InvalidParameter {
                name: "control_cycle_msec",
                reason: format!("{} (rounds to a zero period)", msec),
            });
        }
        Ok(cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.ip_address, "127.0.0.1");
        assert_eq!(config.controller_type, 8);
        assert_eq!(config.robot_model, "");
        assert_eq!(config.config_file, None);
        assert_eq!(config.control_cycle_msec, Some(8.0));
        assert_eq!(config.control_cycle().unwrap(), Duration::from_millis(8));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = CoreConfig::from_toml_str(
            r#"
            controller_type = 9
            config_file = "rc9.xml"
            control_cycle_msec = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.controller_type, 9);
        assert_eq!(config.ip_address, DEFAULT_IP_ADDRESS);
        assert_eq!(config.session_config_file().unwrap(), "rc9.xml");
        assert_eq!(config.control_cycle().unwrap(), Duration::from_millis(4));
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let err = CoreConfig::from_toml_str("ip = \"10.0.0.1\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let mut config = CoreConfig::default();
        assert_eq!(
            config.session_config_file(),
            Err(CoreError::MissingParameter("config_file"))
        );

        config.config_file = Some(String::new());
        assert_eq!(
            config.session_config_file(),
            Err(CoreError::MissingParameter("config_file"))
        );
    }

    #[test]
    fn test_control_cycle_validation() {
        let mut config = CoreConfig {
            control_cycle_msec: None,
            ..CoreConfig::default()
        };
        assert_eq!(
            config.control_cycle(),
            Err(CoreError::MissingParameter("control_cycle_msec"))
        );

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-7, 4e-7] {
            config.control_cycle_msec = Some(bad);
            assert!(matches!(
                config.control_cycle(),
                Err(CoreError::InvalidParameter { .. })
            ));
        }

        // 最小可表示周期：1ns
        config.control_cycle_msec = Some(1e-6);
        assert_eq!(config.control_cycle().unwrap(), Duration::from_nanos(1));

        config.control_cycle_msec = Some(0.5);
        assert_eq!(config.control_cycle().unwrap(), Duration::from_micros(500));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ip_address = \"192.168.0.1\"").unwrap();
        writeln!(file, "robot_model = \"cobotta\"").unwrap();
        writeln!(file, "config_file = \"cobotta.xml\"").unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.ip_address, "192.168.0.1");
        assert_eq!(config.robot_model, "cobotta");
        assert_eq!(config.control_cycle_msec, Some(DEFAULT_CONTROL_CYCLE_MSEC));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CoreConfig::load("/nonexistent/bcap-core.toml").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
