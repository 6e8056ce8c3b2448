use std::panic;

use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::layer::RedactingLayer;

/// Initializes the global tracing subscriber: JSON records in release
/// builds, compact single-line records in debug builds, both redacted at
/// the sink, plus a panic hook that logs instead of only printing to
/// stderr so a panic on a spawned task (container-stop fan-out, the
/// subscription webhook processor) still reaches the same log stream.
pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!("{service_name}={default_level},tower_http=warn,hyper=warn,sqlx=warn").into()
    });

    let json = !cfg!(debug_assertions);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(RedactingLayer::new(json))
        .init();

    let service_name = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");

        error!(service = %service_name, %location, "panic: {payload}");
    }));
}
