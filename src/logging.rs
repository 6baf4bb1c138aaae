use tracing_subscriber::{EnvFilter, fmt};

// RUST_LOG overrides the default of info for everything
pub fn init() {
    fmt()
        .with_env_filter(filter())
        .with_target(false)
        .init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(filter().to_string(), "info");
        }
    }
}
