pub mod classes;
pub mod config;
pub mod preprocess;
pub mod server;
pub mod torch;

/// Process-level setup helpers
pub mod util {
    use tracing_subscriber::EnvFilter;

    /// Install the global tracing subscriber. `RUST_LOG` wins over the
    /// configured filter when it is set
    pub fn init_tracing(filter: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

}
