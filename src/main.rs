use color_eyre::{eyre::eyre, Result};
use reversejoy::config::RuntimeConfig;
use reversejoy::controller::{ControllerHandle, ControllerSettings, LogSink};
use reversejoy::input::{parse_line, InputHandler, InputTracker};
use std::io::BufRead;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = setup()?;

    let settings = ControllerSettings::from(&config);
    let mut controller = ControllerHandle::spawn(settings, Box::new(LogSink::default()));

    // stdin stands in for the OS hook layer: one event per line on its own delivery thread
    let tracker = controller.tracker();
    let shutdown = controller.shutdown_token();
    std::thread::Builder::new()
        .name("input-delivery".to_string())
        .spawn(move || feed_stdin(&tracker, &shutdown))
        .map_err(|e| eyre!("Failed to spawn input thread: {}", e))?;

    info!("Translating input, press J (or Ctrl+C) to exit, G to toggle");
    tokio::select! {
        _ = controller.exit_requested() => {}
        result = tokio::signal::ctrl_c() => {
            result.map_err(|e| eyre!("Failed to listen for Ctrl+C: {}", e))?;
            info!("Ctrl+C received");
            controller.request_shutdown();
        }
    }

    let stats = controller
        .shutdown()
        .await
        .map_err(|e| eyre!("Failed to shut down controller: {}", e))?;

    info!(
        "Clean exit completed: {} ticks, {} input-driven emits, {} reports sent, {} sink failures",
        stats.ticks, stats.input_emits, stats.reports_sent, stats.sink_failures
    );
    Ok(())
}

fn setup() -> Result<RuntimeConfig> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }

    let config =
        RuntimeConfig::load_default().map_err(|e| eyre!("Failed to load configuration: {}", e))?;
    setup_logging_env(config.log_level());
    debug!("Runtime configuration: {:?}", config);
    Ok(config)
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn feed_stdin(tracker: &Arc<InputTracker>, shutdown: &CancellationToken) {
    for line in std::io::stdin().lock().lines() {
        if shutdown.is_cancelled() {
            break;
        }

        match line {
            Ok(line) => match parse_line(&line) {
                Ok(Some(event)) => {
                    let outcome = tracker.handle_input_event(event);
                    debug!("{:?} -> {:?}", event, outcome);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring input line '{}': {}", line.trim(), e),
            },
            Err(e) => {
                warn!("Failed to read input: {}", e);
                return;
            }
        }
    }
    info!("Input stream closed");
}
