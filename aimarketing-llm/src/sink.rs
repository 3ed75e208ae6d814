//! Display seam for incremental replies.

/// Receives the normalized reply text as it grows.
///
/// Each call carries the whole reply so far, not a delta, so a sink can
/// simply replace what it shows. Successive texts of one request only ever
/// extend each other.
pub trait ReplySink {
    /// Show `reply`, replacing whatever was published before.
    fn publish(&mut self, reply: &str);
}

/// A sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ReplySink for NoopSink {
    fn publish(&mut self, _reply: &str) {}
}

impl<F: FnMut(&str)> ReplySink for F {
    fn publish(&mut self, reply: &str) {
        self(reply)
    }
}
