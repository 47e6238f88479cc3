//! # Logging
//!
//! Diagnostics go to stderr through `tracing`; listings are printed to stdout
//! by the CLI. `RUST_LOG` always wins over the built-in filter.

use tracing_subscriber::EnvFilter;

/// AWS crates stay quiet unless `RUST_LOG` says otherwise
const QUIET_TARGETS: [&str; 4] = ["aws_config", "aws_smithy_runtime", "aws_sdk_dynamodb", "hyper"];

/// Default filter directives for the chosen verbosity
#[must_use]
pub fn filter_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    let mut directives = vec![format!("eden={level}"), "warn".to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    directives.join(",")
}

/// Install the global subscriber.
///
/// Verbose output adds target, file and line to every event.
pub fn init_logging(verbose: bool, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter_directives(verbose).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi);

    // A second init (tests) is not an error worth reporting
    let _ = if verbose {
        builder
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        builder.with_target(false).without_time().try_init()
    };
}
