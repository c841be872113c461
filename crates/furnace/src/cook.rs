//! Cook progress toward the current smelt.

use serde::{Deserialize, Serialize};

/// Accumulated cook progress, bounded to `[0, threshold]`.
///
/// Progress is not tied to a particular input: it is reinterpreted every tick
/// against whatever the selector currently finds smeltable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookClock {
    progress: u32,
    threshold: u32,
    regression: u32,
}

impl CookClock {
    /// Zero progress.
    pub fn new(threshold: u32, regression: u32) -> Self {
        Self {
            progress: 0,
            threshold: threshold.max(1),
            regression,
        }
    }

    /// Current progress in ticks.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Progress at which a smelt completes.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Advance by one tick with `burning` fuel slots lit. Returns true when the
    /// smelt is complete; the caller commits it and calls [`CookClock::reset`].
    pub fn advance(&mut self, burning: usize) -> bool {
        if burning > 0 {
            let step = u32::try_from(burning).unwrap_or(u32::MAX);
            self.progress = self.progress.saturating_add(step).min(self.threshold);
        } else {
            self.progress = self.progress.saturating_sub(self.regression);
        }
        self.progress >= self.threshold
    }

    /// Drop progress to zero.
    pub fn reset(&mut self) {
        self.progress = 0;
    }

    /// Set progress, clamped to the threshold.
    pub fn set_progress(&mut self, value: u32) {
        self.progress = value.min(self.threshold);
    }

    /// `progress / threshold` clamped to `[0, 1]`.
    pub fn fraction_complete(&self) -> f64 {
        (f64::from(self.progress) / f64::from(self.threshold)).clamp(0.0, 1.0)
    }
}
