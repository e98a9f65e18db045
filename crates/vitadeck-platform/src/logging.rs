/// Installs `env_logger`, filtered by `RUST_LOG` (default `info`). Safe to
/// call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
