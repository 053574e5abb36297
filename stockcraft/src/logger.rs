use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr so human and JSON reports on stdout stay clean
///
/// Row warnings are printed by the formatter, so the library only logs errors
/// unless `--verbose` (or `RUST_LOG`) asks for more.
pub fn init_cli_logger(verbose: bool) {
    let default_filter = if verbose {
        "stockcraft=debug,stockcraft_core=debug"
    } else {
        "stockcraft=info,stockcraft_core=error"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
