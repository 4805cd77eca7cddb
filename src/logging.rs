use std::io;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_PREFIX: &str = "filmflux.log";

/// Filter for a `-v` count; `RUST_LOG` wins when set.
fn env_filter(verbose_level: u8, default_level: &str) -> EnvFilter {
    let level = match verbose_level {
        0 => default_level,
        // -v: debug but keep hyper's connection chatter out
        1 => "debug,hyper_util=warn,hyper::proto::h1=warn",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Log to a daily rotated file in `log_dir`. The terminal belongs to the TUI.
pub fn init_file_logging(verbose_level: u8, log_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_PREFIX);

    let fmt_layer = fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(false)
        .with_writer(file_appender);

    Registry::default()
        .with(env_filter(verbose_level, "info"))
        .with(fmt_layer)
        .init();
    Ok(())
}

/// Log to stderr, quiet by default, for the one-shot commands.
pub fn init_stderr_logging(verbose_level: u8) {
    let fmt_layer = fmt::layer()
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);

    Registry::default()
        .with(env_filter(verbose_level, "warn"))
        .with(fmt_layer)
        .init();
}
