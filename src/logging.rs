use crate::config::{AppConfig, LogRotation};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Quiet HTTP client internals unless asked for.
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,reqwest=warn,tower_http=info";

fn file_appender(config: &AppConfig) -> RollingFileAppender {
    let (dir, file) = (&config.log_dir, &config.log_file);
    match config.rotation {
        LogRotation::Hourly => rolling::hourly(dir, file),
        LogRotation::Daily => rolling::daily(dir, file),
        LogRotation::Never => rolling::never(dir, file),
    }
}

/// `RUST_LOG` wins over the configured level.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", log_level, DEPENDENCY_DIRECTIVES)))
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(config));
    let filter = env_filter(&config.log_level);

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_dependency_directives() {
        let filter = EnvFilter::new(format!("debug,{}", DEPENDENCY_DIRECTIVES)).to_string();
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("reqwest=warn"));
    }

    #[test]
    fn test_never_rotation_writes_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_yaml_str(&format!(
            r#"
log_level: "info"
log_dir: "{}"
log_file: "app.log"
use_json: false
rotation: "never"
gateway:
  host: "127.0.0.1"
  port: 0
shopify:
  api_key: "k"
  api_secret: "s"
  app_url: "https://app.example.com"
"#,
            dir.path().display()
        ))
        .unwrap();

        use std::io::Write;
        let mut appender = file_appender(&config);
        appender.write_all(b"line\n").unwrap();
        appender.flush().unwrap();
        assert!(dir.path().join("app.log").exists());
    }
}
