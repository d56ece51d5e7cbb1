use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Used when neither `RUST_LOG` nor `[log] filter` is set.
pub const DEFAULT_FILTER: &str = "grid_service=info,grid_client=info";

/// `RUST_LOG` wins over the config file, which wins over the default.
pub fn filter_directives(cfg: &LogConfig, env: Option<String>) -> String {
    env.filter(|s| !s.trim().is_empty())
        .or_else(|| cfg.filter.clone())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Logs go to stderr so the CLI tools keep stdout clean.
pub fn init_tracing(cfg: &LogConfig) {
    let directives = filter_directives(cfg, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directives}' ({e}); using '{DEFAULT_FILTER}'");
        EnvFilter::new(DEFAULT_FILTER)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_config_and_default() {
        let cfg = LogConfig { filter: Some("grid_service=debug".to_string()) };

        assert_eq!(filter_directives(&cfg, Some("warn".to_string())), "warn");
        assert_eq!(filter_directives(&cfg, None), "grid_service=debug");
        assert_eq!(filter_directives(&cfg, Some("  ".to_string())), "grid_service=debug");
        assert_eq!(filter_directives(&LogConfig::default(), None), DEFAULT_FILTER);
    }
}
