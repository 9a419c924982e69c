//! Logging and tracing initialization for the PulseX dashboard.
//!
//! Provides [`init_tracing`] to configure structured logging with two modes:
//! - **JSON mode** (`json = true`): machine-readable output with nanosecond
//!   timestamps, for log aggregation when the dashboard runs as a service.
//! - **Pretty mode** (`json = false`): human-readable colored output for
//!   local use.
//!
//! Both modes respect the `RUST_LOG` environment variable for filtering
//! (e.g., `RUST_LOG=px_sheets=debug,px_dashboard=trace`).
//!
//! A [`SecretSanitizer`] layer flags events that carry service-account keys,
//! OAuth tokens or other secret-looking values.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the global tracing subscriber.
///
/// # Arguments
///
/// * `json` - When `true`, emit structured JSON logs with nanosecond timestamps.
///   When `false`, emit pretty-printed logs with ANSI colors.
///
/// Calling this twice is harmless: the second subscriber is not installed.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(SecretSanitizer);

    let result = if json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_timer(NanosecondTimer)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        registry.with(json_layer).try_init()
    } else {
        let pretty_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_span_events(FmtSpan::CLOSE);

        registry.with(pretty_layer).try_init()
    };

    if result.is_err() {
        tracing::debug!("global tracing subscriber already set");
    }
}

/// Timer that emits nanosecond-precision RFC 3339 timestamps for JSON logs.
#[derive(Debug, Clone)]
struct NanosecondTimer;

impl tracing_subscriber::fmt::time::FormatTime for NanosecondTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let now = chrono::Utc::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.9fZ"))
    }
}

/// A tracing layer that warns when recorded fields look like credentials.
///
/// Patterns detected:
/// - PEM blocks (`-----BEGIN ...`), as found in service-account keys
/// - OAuth access tokens (`ya29.` prefix)
/// - Base64-like strings of 32+ characters
/// - Fields named `private_key`, `access_token`, `assertion`, `token`, ...
#[derive(Debug, Clone)]
pub struct SecretSanitizer;

impl<S> Layer<S> for SecretSanitizer
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &span::Attributes<'_>,
        _id: &span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = SecretCheckVisitor::default();
        attrs.record(&mut visitor);
        if visitor.found_secret {
            tracing::warn!(
                "potential secret detected in span fields, make sure credentials are not logged"
            );
        }
    }

    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = SecretCheckVisitor::default();
        event.record(&mut visitor);
        if visitor.found_secret {
            tracing::warn!(
                "potential secret detected in event fields, make sure credentials are not logged"
            );
        }
    }
}

/// Visitor that checks field names and values for secret-like patterns.
#[derive(Default)]
struct SecretCheckVisitor {
    found_secret: bool,
}

/// Field names that always indicate secrets regardless of value.
const SENSITIVE_FIELD_NAMES: &[&str] = &[
    "private_key",
    "private_key_id",
    "access_token",
    "refresh_token",
    "assertion",
    "token",
    "client_secret",
    "password",
    "api_key",
    "secret",
];

impl SecretCheckVisitor {
    /// Check if a string value looks like a key or token.
    fn looks_like_secret(value: &str) -> bool {
        if value.contains("-----BEGIN") {
            return true;
        }
        if value.starts_with("ya29.") {
            return true;
        }
        if value.len() < 32 {
            return false;
        }

        // Long unbroken base64 runs (no spaces, mostly alphanumeric).
        let alnum_count = value.chars().filter(|c| c.is_alphanumeric()).count();
        let ratio = alnum_count as f64 / value.len() as f64;
        ratio > 0.85
            && value
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_'))
    }
}

impl Visit for SecretCheckVisitor {
    fn record_debug(&mut self, field: &Field, _value: &dyn fmt::Debug) {
        if SENSITIVE_FIELD_NAMES.contains(&field.name()) {
            self.found_secret = true;
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if SENSITIVE_FIELD_NAMES.contains(&field.name()) || Self::looks_like_secret(value) {
            self.found_secret = true;
        }
    }
}
