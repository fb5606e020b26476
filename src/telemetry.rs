use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

/// Initialise tracing: console output at reduced verbosity (unless
/// `verbose` or an explicit filter raises it) plus an optional persistent
/// file layer at full verbosity.
///
/// # Errors
///
/// Returns an error if the filter is invalid, if the log file cannot be
/// opened, if JSON output is requested without the `json-logs` feature, or
/// if installing the global subscriber fails.
pub fn init_tracing(
    explicit_filter: Option<&str>,
    verbose: bool,
    log_file: Option<&Path>,
    use_json: bool,
) -> Result<()> {
    let mut filter_candidates = Vec::new();
    if let Some(f) = explicit_filter {
        filter_candidates.push(f.to_string());
    }
    if let Ok(env) = std::env::var("RUST_LOG") {
        filter_candidates.push(env);
    }
    filter_candidates.push(if verbose { "debug" } else { "info" }.to_string());

    let console_filter = filter_candidates
        .into_iter()
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))?;

    let file_layer = match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| {
                    Error::Telemetry(format!("cannot open log file {}: {err}", path.display()))
                })?;
            let filter = EnvFilter::try_new("debug")
                .map_err(|err| Error::Telemetry(err.to_string()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    #[cfg(feature = "json-logs")]
    if use_json {
        let subscriber = Registry::default().with(file_layer).with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .json()
                .flatten_event(true)
                .with_filter(console_filter),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|err| Error::Telemetry(err.to_string()))?;
        return Ok(());
    }

    #[cfg(not(feature = "json-logs"))]
    if use_json {
        return Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        ));
    }

    let subscriber = Registry::default().with(file_layer).with(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(console_filter),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| Error::Telemetry(err.to_string()))
}
