//! Link quality: the sender's exponentially weighted average over unicast
//! ack outcomes.

/// Weight of the newest ack sample in the moving average.
pub const QUALITY_WEIGHT: f32 = 0.01;
/// Quality below this triggers a hop request.
pub const HOP_THRESHOLD: f32 = 0.75;

/// Ack-success average, starting from a perfect link. Stays in [0, 1]: each
/// update is a convex combination of the old value and a sample in [0, 1].
#[derive(Debug, Clone)]
pub struct LinkQuality {
    quality: f32,
    sample_override: Option<f32>,
}

impl LinkQuality {
    pub fn new() -> Self {
        LinkQuality {
            quality: 1.0,
            sample_override: None,
        }
    }

    /// Fold one ack outcome in and return the new quality.
    pub fn record(&mut self, acked: bool) -> f32 {
        let sample = self
            .sample_override
            .unwrap_or(if acked { 1.0 } else { 0.0 });
        self.quality = self.quality * (1.0 - QUALITY_WEIGHT) + sample * QUALITY_WEIGHT;
        self.quality
    }

    pub fn get(&self) -> f32 {
        self.quality
    }

    pub fn is_low(&self) -> bool {
        self.quality < HOP_THRESHOLD
    }

    /// Back to the optimistic baseline. Called once a hop request has been
    /// handed to the radio, so one degraded stretch yields one request.
    pub fn reset(&mut self) {
        self.quality = 1.0;
    }

    /// Force every subsequent sample to `sample` regardless of ack status,
    /// e.g. 0.5 to exercise hopping on a healthy bench link. `None` restores
    /// real samples.
    pub fn set_sample_override(&mut self, sample: Option<f32>) {
        self.sample_override = sample;
    }
}

impl Default for LinkQuality {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_perfect() {
        let quality = LinkQuality::new();
        assert_eq!(quality.get(), 1.0);
        assert!(!quality.is_low());
    }

    #[test]
    fn stays_in_unit_interval() {
        let mut quality = LinkQuality::new();
        for i in 0..10_000 {
            let q = quality.record(i % 3 == 0);
            assert!((0.0..=1.0).contains(&q));
        }
        for _ in 0..10_000 {
            let q = quality.record(false);
            assert!((0.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn threshold_crossing_takes_29_losses() {
        let mut quality = LinkQuality::new();
        for _ in 0..28 {
            quality.record(false);
        }
        assert!(!quality.is_low());
        quality.record(false);
        assert!(quality.is_low());
    }

    #[test]
    fn reset_restores_baseline() {
        let mut quality = LinkQuality::new();
        for _ in 0..50 {
            quality.record(false);
        }
        assert!(quality.is_low());
        quality.reset();
        assert_eq!(quality.get(), 1.0);
    }

    #[test]
    fn sample_override_pins_the_sample() {
        let mut quality = LinkQuality::new();
        quality.set_sample_override(Some(0.5));
        // Acked frames still drag the average toward the forced sample.
        for _ in 0..1000 {
            quality.record(true);
        }
        assert!(quality.get() < HOP_THRESHOLD);
        quality.set_sample_override(None);
        quality.reset();
        quality.record(true);
        assert!(quality.get() > 0.99);
    }
}
