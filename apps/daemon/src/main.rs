//! DENSO 控制器会话守护进程主入口
//!
//! 读取配置 → 初始化会话 → 专用线程运行服务循环 → 等待 Ctrl+C → 停止并退出。
//! 会话链路使用模拟链路（`SimLink`）。

mod args;

use anyhow::{Context, Result, anyhow};
use args::Args;
use bcap_core::{BcapFactory, RobotCore, ShutdownSignal};
use bcap_driver::{ControllerParams, SimLink};
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时的日志过滤
const DEFAULT_LOG_FILTER: &str = "bcap_core=info,bcap_driver=info,bcap_core_daemon=info";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.resolve_config()?;

    // 1. 信号处理：触发全局关闭并唤醒主线程
    let shutdown = ShutdownSignal::new();
    let (signal_tx, signal_rx) = crossbeam_channel::bounded::<()>(1);
    let handler_shutdown = shutdown.clone();
    ctrlc::set_handler(move || {
        handler_shutdown.trigger();
        let _ = signal_tx.try_send(());
    })
    .context("Failed to set signal handler")?;

    // 2. 初始化会话
    let factory = BcapFactory::new(|_: &ControllerParams| SimLink::new());
    let mut core = RobotCore::new(config, factory, shutdown);
    core.initialize().map_err(|e| {
        error!("{}", e);
        anyhow!("Failed to initialize. ({:X})", e.code())
    })?;

    // 3. 服务循环在专用线程上运行
    let core = Arc::new(core);
    let looper = core.clone();
    let handle = thread::Builder::new()
        .name("bcap-core-loop".into())
        .spawn(move || looper.start())
        .context("Failed to spawn service loop")?;

    if let Some(mode) = args.mode
        && let Err(e) = core.change_mode(mode, true)
    {
        warn!("Initial mode change to 0x{:X} failed: {}", mode, e);
    }

    info!("bcap_core_daemon started. Press Ctrl+C to stop.");
    let _ = signal_rx.recv();
    info!("Received interrupt signal. Shutting down...");

    // 4. 停止循环并等待线程退出
    core.stop();
    handle
        .join()
        .map_err(|_| anyhow!("Service loop thread panicked"))?;

    info!("bcap_core_daemon stopped");
    Ok(())
}
