use std::env;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Environment variable selecting the log format ("json" or "pretty")
pub const LOG_FORMAT_ENV: &str = "BUGSNAG_LOG_FORMAT";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Output is JSON when
/// `BUGSNAG_LOG_FORMAT=json`, human readable otherwise.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "bugsnag_axum={level},bugsnag_notifier={level},bugsnag_core={level},tower_http=info,reqwest=info"
        )
        .into()
    });

    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .try_init()?;
    }

    Ok(())
}
