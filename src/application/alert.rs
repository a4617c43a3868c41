// Alert sink trait - Where raised warnings are surfaced
/// Receives one message per tick that produced a warning. Delivery is the
/// sink's business; the engine never retries.
pub trait AlertSink: Send + Sync {
    fn notify(&self, message: &str);
}
