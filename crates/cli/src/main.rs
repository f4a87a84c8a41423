//! # CARLA Drive
//!
//! 命令行入口：
//! - 配置加载与验证
//! - 会话运行（连接 → 生成 → 驾驶 → 回收，失败自动重试）
//! - Ctrl-C 优雅关闭

mod cli;

use std::sync::Arc;

use actor_factory::CarlaClient;
use anyhow::{Context, Result};
use clap::Parser;
use config_loader::ConfigLoader;
use contracts::DriveConfig;
use control::InputDevice;
use presenter::{DisplayPresenter, FrameRecorder, Surface};
use tracing::{info, warn};

use carla_drive::{resolve_config, SessionRunner, ShutdownSignal};
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "CARLA Drive starting");

    let config = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Failed to resolve configuration")?;

    if cli.dry_run {
        print_config(&config)?;
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                on_ctrl_c.trigger();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let recorder = if config.recording.enabled {
        let recorder = FrameRecorder::create(&config.recording.output_dir)
            .context("Failed to start frame recorder")?;
        info!(output_dir = %recorder.output_dir().display(), "Saving frames");
        Some(Arc::new(recorder))
    } else {
        None
    };

    #[cfg(feature = "real-carla")]
    let client = actor_factory::RealCarlaClient::new();

    #[cfg(not(feature = "real-carla"))]
    let client = {
        warn!("Built without `real-carla`, driving the mock simulator");
        actor_factory::MockCarlaClient::with_config(actor_factory::MockConfig {
            sensor: actor_factory::MockSensorConfig {
                image_width: config.display.width,
                image_height: config.display.height,
                ..Default::default()
            },
            ..Default::default()
        })
    };

    let session = Session {
        config,
        recorder,
        shutdown,
        max_ticks: cli.max_ticks,
    };

    #[cfg(feature = "window")]
    {
        if !cli.headless {
            let (surface, input) = presenter::WindowSurface::open(
                session.config.display.width,
                session.config.display.height,
                &session.config.display.title,
            )
            .context("Failed to open display window")?;
            return session.run(client, surface, input).await;
        }
    }

    if !cli.headless {
        info!("Built without `window`, rendering headless");
    }
    let surface = presenter::HeadlessSurface::new(
        session.config.display.width,
        session.config.display.height,
    )
    .context("Failed to create headless surface")?;
    session.run(client, surface, control::IdleInput).await
}

/// Everything the runner needs besides client, surface and input
struct Session {
    config: DriveConfig,
    recorder: Option<Arc<FrameRecorder>>,
    shutdown: ShutdownSignal,
    max_ticks: u64,
}

impl Session {
    async fn run<C, S, I>(self, client: C, surface: S, input: I) -> Result<()>
    where
        C: CarlaClient,
        S: Surface,
        I: InputDevice,
    {
        let mut runner =
            SessionRunner::new(client, DisplayPresenter::new(surface), input, self.config)
                .with_shutdown(self.shutdown);
        if let Some(recorder) = self.recorder {
            runner = runner.with_recorder(recorder);
        }
        if self.max_ticks > 0 {
            runner = runner.with_max_ticks(self.max_ticks);
        }

        let stats = runner.run().await;
        stats.print_summary();
        Ok(())
    }
}

/// Initialize logging (and metrics) based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    observability::init_with_config(observability::ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port > 0).then_some(cli.metrics_port),
        default_log_level: default_log_level.to_string(),
    })
}

fn print_config(config: &DriveConfig) -> Result<()> {
    let rendered = ConfigLoader::to_toml(config).context("Failed to render configuration")?;
    println!("Configuration is valid.\n");
    println!("{rendered}");
    Ok(())
}
