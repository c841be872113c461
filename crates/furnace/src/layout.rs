//! Slot partitioning and tunable constants.

use serde::{Deserialize, Serialize};
use smeltery_core::DEFAULT_MAX_STACK;
use std::ops::Range;

/// Ticks needed to finish one smelt.
pub const COOK_TIME_FOR_COMPLETION: u32 = 200;

/// Cook progress lost per tick while smeltable input sits without fuel.
pub const UNFUELLED_REGRESSION: u32 = 2;

/// Simulation rate.
pub const TICKS_PER_SECOND: u32 = 20;

/// Largest burn duration a fuel item may report.
pub const MAX_BURN_TICKS: u32 = i16::MAX as u32;

/// Fixed partition of the slot array into fuel, input and output ranges.
///
/// Fuel slots come first, then input, then output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLayout {
    /// Number of fuel slots.
    pub fuel: usize,
    /// Number of input slots.
    pub input: usize,
    /// Number of output slots.
    pub output: usize,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SlotLayout {
    /// Four fuel, five input and five output slots.
    pub const DEFAULT: Self = Self {
        fuel: 4,
        input: 5,
        output: 5,
    };

    /// Total number of slots.
    pub fn total(&self) -> usize {
        self.fuel + self.input + self.output
    }

    /// Slot indices holding fuel.
    pub fn fuel_range(&self) -> Range<usize> {
        0..self.fuel
    }

    /// Slot indices holding items to smelt.
    pub fn input_range(&self) -> Range<usize> {
        self.fuel..self.fuel + self.input
    }

    /// Slot indices receiving results.
    pub fn output_range(&self) -> Range<usize> {
        self.fuel + self.input..self.total()
    }

    /// Classify a slot index.
    pub fn region(&self, slot: usize) -> Option<SlotRegion> {
        if self.fuel_range().contains(&slot) {
            Some(SlotRegion::Fuel(slot))
        } else if self.input_range().contains(&slot) {
            Some(SlotRegion::Input(slot - self.fuel))
        } else if self.output_range().contains(&slot) {
            Some(SlotRegion::Output(slot - self.fuel - self.input))
        } else {
            None
        }
    }
}

/// Which range a slot belongs to, with its offset inside that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRegion {
    /// Fuel slot `n`.
    Fuel(usize),
    /// Input slot `n`.
    Input(usize),
    /// Output slot `n`.
    Output(usize),
}

/// How an output stack is matched against a smelting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPolicy {
    /// Variants must be equal for items that declare subtypes.
    #[default]
    Exact,
    /// Only item id and tag are compared.
    IgnoreVariant,
}

/// Tunable behaviour of one appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnaceTuning {
    /// Global per-slot capacity.
    pub stack_limit: u32,
    /// Cook progress at which a smelt completes.
    pub completion_threshold: u32,
    /// Cook progress lost per tick without burning fuel.
    pub regression_per_tick: u32,
    /// Ticks per real-time second, for "seconds of fuel remaining".
    pub ticks_per_second: u32,
    /// Output stacking match rule.
    pub variant_policy: VariantPolicy,
}

impl Default for FurnaceTuning {
    fn default() -> Self {
        Self {
            stack_limit: DEFAULT_MAX_STACK,
            completion_threshold: COOK_TIME_FOR_COMPLETION,
            regression_per_tick: UNFUELLED_REGRESSION,
            ticks_per_second: TICKS_PER_SECOND,
            variant_policy: VariantPolicy::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_ranges_are_contiguous() {
        let layout = SlotLayout::DEFAULT;
        assert_eq!(layout.total(), 14);
        assert_eq!(layout.fuel_range(), 0..4);
        assert_eq!(layout.input_range(), 4..9);
        assert_eq!(layout.output_range(), 9..14);
    }

    #[test]
    fn region_classifies_every_slot() {
        let layout = SlotLayout::DEFAULT;
        assert_eq!(layout.region(0), Some(SlotRegion::Fuel(0)));
        assert_eq!(layout.region(3), Some(SlotRegion::Fuel(3)));
        assert_eq!(layout.region(4), Some(SlotRegion::Input(0)));
        assert_eq!(layout.region(9), Some(SlotRegion::Output(0)));
        assert_eq!(layout.region(13), Some(SlotRegion::Output(4)));
        assert_eq!(layout.region(14), None);
    }
}
