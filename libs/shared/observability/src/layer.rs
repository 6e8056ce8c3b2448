use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::redact::redact_value;

/// Collects an event's fields into a JSON object. `tracing`'s `Visit`
/// trait hands us one typed callback per field rather than a single
/// key/value pair, so every variant folds into the same map.
#[derive(Default)]
struct FieldCollector(Map<String, Value>);

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_string(), json_number_or_string(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), Value::String(format!("{value:?}")));
    }
}

fn json_number_or_string(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

/// A `tracing_subscriber::Layer` that is the sink itself: it collects
/// every event's fields, redacts any that match the sensitive-key
/// substring list (see [`crate::redact`]), and writes the result to
/// stdout — JSON in production, a compact single line in development.
/// Because redaction happens here rather than at each call site, no
/// `tracing::info!`/`event!` call anywhere in the codebase can leak a
/// secret by omitting a guard.
pub struct RedactingLayer {
    json: bool,
}

impl RedactingLayer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl<S: Subscriber> Layer<S> for RedactingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let mut fields = Value::Object(collector.0);
        redact_value(&mut fields);

        let metadata = event.metadata();
        let timestamp = chrono::Utc::now().to_rfc3339();

        if self.json {
            let record = serde_json::json!({
                "timestamp": timestamp,
                "level": metadata.level().as_str(),
                "target": metadata.target(),
                "fields": fields,
            });
            println!("{record}");
        } else {
            println!(
                "{timestamp} {:>5} {target}: {fields}",
                metadata.level().as_str(),
                target = metadata.target(),
            );
        }
    }
}
