//! Tracing setup for binaries and integration harnesses that embed the
//! client.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_directives` (e.g. `"community_groups_client=info"`).
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(
    default_directives: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_tracing("community_groups_client=debug");
        assert!(init_tracing("community_groups_client=debug").is_err());
    }
}
