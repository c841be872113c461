//! Per-slot fuel burn timers.

use crate::rules::SmeltingRules;
use serde::{Deserialize, Serialize};
use smeltery_core::ItemStack;
use tracing::debug;

/// Outcome of one fuel tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FuelTick {
    /// Slots that burned during this tick.
    pub burning: usize,
    /// Slots that consumed a fresh fuel item during this tick.
    pub refuelled: usize,
}

/// Remaining and initial burn time for each fuel slot.
///
/// Invariant: `remaining[i] <= initial[i]` after every [`FuelBank::advance_one_tick`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelBank {
    remaining: Vec<u32>,
    initial: Vec<u32>,
}

impl FuelBank {
    /// All timers zero.
    pub fn new(slots: usize) -> Self {
        Self {
            remaining: vec![0; slots],
            initial: vec![0; slots],
        }
    }

    /// Number of fuel slots tracked.
    pub fn slots(&self) -> usize {
        self.remaining.len()
    }

    /// Ticks left on each slot's current charge.
    pub fn remaining(&self) -> &[u32] {
        &self.remaining
    }

    /// Ticks each slot's current charge started with.
    pub fn initial(&self) -> &[u32] {
        &self.initial
    }

    /// Burn one tick on every slot, pulling a new fuel item from `fuel_slots`
    /// whenever a slot has nothing left to burn.
    ///
    /// A slot burns at most once per tick and consumes at most one item per
    /// tick, so every fuel item yields exactly its burn duration in burning ticks.
    pub fn advance_one_tick<R: SmeltingRules + ?Sized>(
        &mut self,
        fuel_slots: &mut [ItemStack],
        rules: &R,
    ) -> FuelTick {
        let mut tick = FuelTick::default();
        for (i, stack) in fuel_slots.iter_mut().enumerate().take(self.slots()) {
            let mut refuelled = false;
            if self.remaining[i] == 0 {
                refuelled = self.refuel(i, stack, rules);
            }
            if self.remaining[i] > 0 {
                self.remaining[i] -= 1;
                tick.burning += 1;
            }
            // Top up immediately so the slot stays lit across charges.
            if self.remaining[i] == 0 && !refuelled {
                refuelled = self.refuel(i, stack, rules);
            }
            if refuelled {
                tick.refuelled += 1;
            }
        }
        tick
    }

    fn refuel<R: SmeltingRules + ?Sized>(&mut self, slot: usize, stack: &mut ItemStack, rules: &R) -> bool {
        if stack.is_empty() {
            return false;
        }
        let duration = rules.burn_duration(stack);
        if duration == 0 {
            return false;
        }

        self.remaining[slot] = duration;
        self.initial[slot] = duration;
        let remnant = rules.container_item(stack);
        stack.shrink(1);
        if stack.is_empty() {
            *stack = remnant;
        }
        debug!(slot, duration, "fuel slot refuelled");
        true
    }

    /// Slots with burn time left.
    pub fn burning_count(&self) -> usize {
        self.remaining.iter().filter(|&&r| r > 0).count()
    }

    /// `remaining / initial` clamped to `[0, 1]`; zero when nothing has burned.
    pub fn fraction_remaining(&self, slot: usize) -> f64 {
        let (Some(&remaining), Some(&initial)) = (self.remaining.get(slot), self.initial.get(slot)) else {
            return 0.0;
        };
        if initial == 0 {
            return 0.0;
        }
        (f64::from(remaining) / f64::from(initial)).clamp(0.0, 1.0)
    }

    /// Whole seconds of burn time left.
    pub fn seconds_remaining(&self, slot: usize, ticks_per_second: u32) -> u32 {
        let remaining = self.remaining.get(slot).copied().unwrap_or(0);
        remaining / ticks_per_second.max(1)
    }

    /// Raise `initial` to `remaining` wherever a raw write left it behind.
    /// Returns the slots that were raised.
    pub(crate) fn raise_initial_to_remaining(&mut self) -> Vec<usize> {
        let mut raised = Vec::new();
        for (slot, (initial, &remaining)) in self.initial.iter_mut().zip(&self.remaining).enumerate() {
            if *initial < remaining {
                *initial = remaining;
                raised.push(slot);
            }
        }
        raised
    }

    /// Raw timer write used by the sync table and record decoder.
    pub(crate) fn set_remaining(&mut self, slot: usize, value: u32) -> bool {
        match self.remaining.get_mut(slot) {
            Some(r) => {
                *r = value;
                true
            }
            None => false,
        }
    }

    /// Raw timer write used by the sync table and record decoder.
    pub(crate) fn set_initial(&mut self, slot: usize, value: u32) -> bool {
        match self.initial.get_mut(slot) {
            Some(r) => {
                *r = value;
                true
            }
            None => false,
        }
    }
}
