//! Tracing setup for the browser.
//!
//! Events always go to the browser console through `tracing-wasm`. When the
//! host passes a `logger` callback to `init`, every event is also handed to it
//! as `{ level, target, message, timestamp }`.

use std::cell::RefCell;
use std::fmt::Write;
use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

static SUBSCRIBER: Once = Once::new();

thread_local! {
    static LOGGER_CALLBACK: RefCell<Option<js_sys::Function>> = const { RefCell::new(None) };
}

/// Forwards each event to the registered JS logger.
struct JsCallbackLayer;

impl<S> tracing_subscriber::Layer<S> for JsCallbackLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        LOGGER_CALLBACK.with(|cb| {
            let Some(callback) = cb.borrow().clone() else {
                return;
            };

            let metadata = event.metadata();
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);

            let timestamp = web_time::SystemTime::now()
                .duration_since(web_time::UNIX_EPOCH)
                .map(|d| d.as_millis() as f64)
                .unwrap_or(0.0);

            let js_event = js_sys::Object::new();
            let fields: [(&str, JsValue); 4] = [
                ("level", metadata.level().as_str().into()),
                ("target", metadata.target().into()),
                ("message", visitor.finish().into()),
                ("timestamp", timestamp.into()),
            ];
            for (name, value) in fields {
                let _ = js_sys::Reflect::set(&js_event, &name.into(), &value);
            }

            let _ = callback.call1(&JsValue::NULL, &js_event);
        });
    }
}

/// Collects the `message` field, then any other fields as `name=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    extra: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.extra.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.extra,
            (false, false) => format!("{} {}", self.message, self.extra),
        }
    }

    fn push_extra(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.extra.is_empty() {
            self.extra.push(' ');
        }
        let _ = write!(self.extra, "{}={}", name, value);
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_extra(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_extra(field.name(), format_args!("{}", value));
        }
    }
}

fn console_config() -> tracing_wasm::WASMLayerConfig {
    tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::DEBUG)
        .build()
}

/// Register `logger` (if any) and install the global subscriber once.
///
/// Calling again replaces the logger; the subscriber itself is kept.
pub(crate) fn install(logger: Option<js_sys::Function>) {
    if let Some(callback) = logger {
        LOGGER_CALLBACK.with(|cell| *cell.borrow_mut() = Some(callback));
    }

    SUBSCRIBER.call_once(|| {
        let subscriber = tracing_subscriber::registry()
            .with(JsCallbackLayer)
            .with(tracing_wasm::WASMLayer::new(console_config()));
        tracing::subscriber::set_global_default(subscriber).ok();
    });
}
