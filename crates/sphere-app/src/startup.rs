//! Startup output.

use sphere_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
   _____ __             __      _____       __
  / ___// /_____  _____/ /__   / ___/____  / /_  ___  ________
  \__ \/ __/ __ \/ ___/ //_/   \__ \/ __ \/ __ \/ _ \/ ___/ _ \
 ___/ / /_/ /_/ / /__/ ,<     ___/ / /_/ / / / /  __/ /  /  __/
/____/\__/\____/\___/_/|_|   /____/ .___/_/ /_/\___/_/   \___/
                                 /_/
    "#
    );
}

/// Prints where the client connects and as whom.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!("Remote:      {}", config.remote.base_url);
    info!(
        "Identity:    {}",
        config.remote.identity.as_deref().unwrap_or("anonymous")
    );
    info!("Fetch retry: {} attempt(s)", config.cache.fetch_retry.max_attempts);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default());
    }
}
