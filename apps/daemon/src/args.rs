//! 命令行参数
//!
//! 配置来源优先级：命令行 > 配置文件 > 默认值。

use anyhow::{Context, Result};
use bcap_core::CoreConfig;
use clap::Parser;
use std::path::PathBuf;

/// DENSO 控制器会话守护进程
///
/// 按配置选择 RC8 / RC8 COBOTTA / RC9 驱动，完成会话握手后以固定周期维持服务循环
#[derive(Parser, Debug, Default)]
#[command(name = "bcap_core_daemon")]
#[command(about = "Supervise one DENSO controller session", long_about = None)]
pub struct Args {
    /// TOML 配置文件路径（可选）
    ///
    /// 未指定时使用内置默认值，再由下列参数覆盖
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 控制器网络地址
    ///
    /// 默认: 127.0.0.1
    #[arg(long)]
    pub ip_address: Option<String>,

    /// 控制器类型（8 = RC8，9 = RC9）
    ///
    /// 默认: 8
    #[arg(long)]
    pub controller_type: Option<i32>,

    /// 机器人型号（"cobotta" 在 RC8 上选择 COBOTTA 驱动）
    #[arg(long)]
    pub robot_model: Option<String>,

    /// 控制器显示名
    #[arg(long)]
    pub controller_name: Option<String>,

    /// 会话配置文件（必需，可来自配置文件）
    #[arg(long)]
    pub config_file: Option<String>,

    /// 控制周期（毫秒）
    ///
    /// 默认: 8.0
    #[arg(long)]
    pub control_cycle_msec: Option<f64>,

    /// 启动后切换到的模式码（支持 0x 前缀的十六进制）
    ///
    /// 默认: 不切换（保持空闲模式）
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<i32>,
}

impl Args {
    /// 合并配置文件与命令行覆盖
    pub fn resolve_config(&self) -> Result<CoreConfig> {
        let mut config = match &self.config {
            Some(path) => CoreConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CoreConfig::default(),
        };

        if let Some(ip_address) = &self.ip_address {
            config.ip_address = ip_address.clone();
        }
        if let Some(controller_type) = self.controller_type {
            config.controller_type = controller_type;
        }
        if let Some(robot_model) = &self.robot_model {
            config.robot_model = robot_model.clone();
        }
        if let Some(controller_name) = &self.controller_name {
            config.controller_name = controller_name.clone();
        }
        if let Some(config_file) = &self.config_file {
            config.config_file = Some(config_file.clone());
        }
        if let Some(cycle) = self.control_cycle_msec {
            config.control_cycle_msec = Some(cycle);
        }

        Ok(config)
    }
}

/// 解析模式码：十进制或 `0x` 前缀十六进制
fn parse_mode(s: &str) -> Result<i32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16),
        None => s.parse::<i32>(),
    };
    parsed.map_err(|e| format!("invalid mode '{}': {}", s, e))
}
