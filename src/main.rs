use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use xo_mqtt_relay::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[derive(Debug, Parser)]
#[command(name = "xo-mqtt-relay", version, about = "Relay Xen Orchestra host stats to MQTT")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "CONFIG_FILE", default_value = "config.toml")]
    config: String,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config is read before logging so its debug flag can pick the level.
    let app_config = config::AppConfig::load(&cli.config)?;
    init_logging(cli.debug || app_config.logging.debug);

    if let Some(configured) = app_config.sampling.corrected_from {
        tracing::warn!(
            configured,
            sample_interval_secs = app_config.sampling.sample_interval_secs,
            update_interval_secs = app_config.sampling.update_interval_secs,
            "update interval is not a multiple of the sample interval; using fallback"
        );
    }

    let settings = collector::WindowSettings::from_config(&app_config);
    let scheduler_config = scheduler::SchedulerConfig::from_config(&app_config);
    tracing::info!(
        name = version::NAME,
        version = version::VERSION,
        host = %app_config.xo.host_uuid,
        update_interval_secs = app_config.sampling.update_interval_secs,
        sample_interval_secs = app_config.sampling.sample_interval_secs,
        samples_per_window = settings.sample_count,
        payload_mode = ?app_config.mqtt.payload_mode,
        "starting"
    );

    let client = xo_client::XoClient::new(&app_config.xo)
        .map_err(|e| anyhow::anyhow!("XO client: {}", e))?;
    let (bus, _eventloop_handle) = bus::MqttBus::connect(
        &app_config.mqtt,
        &version::default_client_id(&app_config.xo.host_uuid),
    );

    if app_config.mqtt.discovery {
        let failed = discovery::announce(&bus, &app_config).await;
        if failed > 0 {
            tracing::warn!(failed, "some discovery configs were not published");
        }
    }

    let publisher = publisher::SamplePublisher::from_config(bus, &app_config);
    let sampler = scheduler::SampleScheduler::new(
        collector::MetricCollector::new(client, settings),
        publisher,
        scheduler_config,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let scheduler_run = sampler.run(shutdown_rx);
    tokio::pin!(scheduler_run);

    tokio::select! {
        _ = &mut scheduler_run => return Ok(()),
        _ = shutdown_signal() => tracing::info!("Received shutdown signal"),
    }
    let _ = shutdown_tx.send(());
    scheduler_run.await;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
