use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "IDLC_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs a stderr subscriber filtered by `IDLC_LOG`.
///
/// Returns `false` when a global subscriber was already installed, which
/// happens when several tests or embedders initialize logging.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_twice_is_harmless() {
        let _ = init();
        assert!(!init());
    }
}
