use shared::{
    domain::{Hand, HandAngles},
    error::SinkError,
};
use tracing::warn;

/// View layer that draws the hands. Setting the same rotation twice must be a
/// visual no-op.
pub trait RenderSink: Send + Sync {
    fn set_rotation(&self, hand: Hand, degrees: f32) -> Result<(), SinkError>;
}

/// Pushes every hand to `sink`. Failures are logged and skipped; returns how
/// many hands were applied.
pub fn publish(sink: &dyn RenderSink, angles: &HandAngles) -> usize {
    let mut applied = 0;
    for (hand, degrees) in angles.iter() {
        match sink.set_rotation(hand, degrees) {
            Ok(()) => applied += 1,
            Err(err) => warn!(?hand, degrees, "dropping hand update: {err}"),
        }
    }
    applied
}
