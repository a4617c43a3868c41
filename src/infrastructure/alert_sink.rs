// Alert sink backed by the tracing subscriber
use crate::application::alert::AlertSink;

pub const ALERT_TITLE: &str = "Car Diagnostic Alert";

/// Surfaces each alert as a `warn` event on the `alerts` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl TracingAlertSink {
    pub fn new() -> Self {
        Self
    }
}

impl AlertSink for TracingAlertSink {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "alerts", title = ALERT_TITLE, "{}", message);
    }
}
