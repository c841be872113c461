//! The appliance aggregate and its per-tick state machine.

use crate::cook::CookClock;
use crate::error::FurnaceError;
use crate::fuel::FuelBank;
use crate::layout::{FurnaceTuning, SlotLayout, SlotRegion};
use crate::rules::{ApplianceHost, SmeltingRules};
use crate::selector::{SmeltPlan, SmeltSelector};
use crate::slots::SlotArray;
use smeltery_core::ItemStack;
use tracing::{trace, warn};

static EMPTY_SLOT: ItemStack = ItemStack::EMPTY;

/// Derived activity of the appliance; computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing smeltable, or no room for the result.
    Idle,
    /// Smeltable input with fuel burning.
    Active,
    /// Smeltable input but no fuel burning; progress regresses.
    Stalled,
}

/// What happened during one [`ApplianceState::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Activity during this tick.
    pub phase: Phase,
    /// Fuel slots that burned this tick.
    pub burning: usize,
    /// Fuel items consumed this tick.
    pub refuelled: usize,
    /// Smelt completed this tick, if any.
    pub smelted: Option<SmeltPlan>,
    /// Burning-slot count differed from the previous tick.
    pub burning_changed: bool,
}

/// Slot contents plus fuel and cook timers of one appliance.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceState {
    tuning: FurnaceTuning,
    selector: SmeltSelector,
    pub(crate) slots: SlotArray,
    pub(crate) fuel: FuelBank,
    pub(crate) clock: CookClock,
    /// `None` until the first tick after construction or load.
    cached_burning: Option<usize>,
    dirty: bool,
}

impl ApplianceState {
    /// Empty appliance with the default layout and tuning.
    pub fn new() -> Self {
        Self::with_config(SlotLayout::DEFAULT, FurnaceTuning::default())
    }

    /// Empty appliance with an explicit layout and tuning.
    pub fn with_config(layout: SlotLayout, tuning: FurnaceTuning) -> Self {
        Self {
            tuning,
            selector: SmeltSelector::new(&tuning),
            slots: SlotArray::new(layout),
            fuel: FuelBank::new(layout.fuel),
            clock: CookClock::new(tuning.completion_threshold, tuning.regression_per_tick),
            cached_burning: None,
            dirty: false,
        }
    }

    /// Slot partition.
    pub fn layout(&self) -> SlotLayout {
        self.slots.layout()
    }

    /// Tunables.
    pub fn tuning(&self) -> &FurnaceTuning {
        &self.tuning
    }

    /// Read-only view of the slot array.
    pub fn slots(&self) -> &SlotArray {
        &self.slots
    }

    /// Fuel timers.
    pub fn fuel_bank(&self) -> &FuelBank {
        &self.fuel
    }

    /// Cook progress in ticks.
    pub fn cook_progress(&self) -> u32 {
        self.clock.progress()
    }

    /// Advance the simulation by one tick.
    ///
    /// The dry-run smelt check gates fuel consumption: fuel never burns while
    /// there is nothing to smelt or no room for the result.
    pub fn tick<R, H>(&mut self, rules: &R, host: &mut H) -> TickReport
    where
        R: SmeltingRules + ?Sized,
        H: ApplianceHost + ?Sized,
    {
        let mut report = TickReport {
            phase: Phase::Idle,
            burning: 0,
            refuelled: 0,
            smelted: None,
            burning_changed: false,
        };

        if self.selector.can_smelt(&self.slots, rules) {
            let fuel_tick = self.fuel.advance_one_tick(self.slots.fuel_mut(), rules);
            report.burning = fuel_tick.burning;
            report.refuelled = fuel_tick.refuelled;
            report.phase = if fuel_tick.burning > 0 {
                Phase::Active
            } else {
                Phase::Stalled
            };
            if fuel_tick.refuelled > 0 {
                self.dirty = true;
                host.request_persistence_dirty();
            }

            if self.clock.advance(fuel_tick.burning) {
                report.smelted = self.selector.perform_smelt(&mut self.slots, rules);
                self.clock.reset();
                if report.smelted.is_some() {
                    self.dirty = true;
                    host.request_persistence_dirty();
                }
            }
        } else {
            self.clock.reset();
        }

        let burning = self.number_of_burning_fuel_slots();
        if self.cached_burning != Some(burning) {
            self.cached_burning = Some(burning);
            report.burning_changed = true;
            host.notify_visual_and_lighting_refresh(burning);
        }

        trace!(
            phase = ?report.phase,
            burning = report.burning,
            cook = self.clock.progress(),
            "appliance tick"
        );
        report
    }

    /// Current derived phase, without ticking.
    pub fn phase<R: SmeltingRules + ?Sized>(&self, rules: &R) -> Phase {
        if !self.selector.can_smelt(&self.slots, rules) {
            Phase::Idle
        } else if self.fuel.burning_count() > 0 {
            Phase::Active
        } else {
            Phase::Stalled
        }
    }

    /// Whether some input can be smelted right now. Never mutates.
    pub fn can_smelt<R: SmeltingRules + ?Sized>(&self, rules: &R) -> bool {
        self.selector.can_smelt(&self.slots, rules)
    }

    // ---- derived metrics ----

    /// Fraction of the current charge left in a fuel slot, `[0, 1]`.
    pub fn fraction_of_fuel_remaining(&self, fuel_slot: usize) -> f64 {
        self.fuel.fraction_remaining(fuel_slot)
    }

    /// Whole seconds of burn time left in a fuel slot.
    pub fn seconds_of_fuel_remaining(&self, fuel_slot: usize) -> u32 {
        self.fuel
            .seconds_remaining(fuel_slot, self.tuning.ticks_per_second)
    }

    /// Fuel slots with burn time left.
    pub fn number_of_burning_fuel_slots(&self) -> usize {
        self.fuel.burning_count()
    }

    /// Cook progress as a fraction of the completion threshold, `[0, 1]`.
    pub fn fraction_of_cook_complete(&self) -> f64 {
        self.clock.fraction_complete()
    }

    // ---- slot access ----

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot contents; out-of-range indices log and read as empty.
    pub fn get_slot(&self, index: usize) -> &ItemStack {
        match self.slots.get(index) {
            Ok(stack) => stack,
            Err(err) => {
                warn!(%err, "get_slot");
                &EMPTY_SLOT
            }
        }
    }

    /// Checked slot read.
    pub fn try_get_slot(&self, index: usize) -> Result<&ItemStack, FurnaceError> {
        self.slots.get(index)
    }

    /// Overwrite a slot; counts above the stack limit are capped.
    /// Out-of-range indices log and are ignored.
    pub fn set_slot(&mut self, index: usize, stack: ItemStack) {
        if let Err(err) = self.try_set_slot(index, stack) {
            warn!(%err, "set_slot");
        }
    }

    /// Checked slot write.
    pub fn try_set_slot(&mut self, index: usize, stack: ItemStack) -> Result<(), FurnaceError> {
        self.slots.set(index, stack, self.tuning.stack_limit)?;
        self.dirty = true;
        Ok(())
    }

    /// Empty a slot and return its prior contents.
    pub fn remove_slot(&mut self, index: usize) -> ItemStack {
        match self.slots.remove(index) {
            Ok(stack) => {
                if !stack.is_empty() {
                    self.dirty = true;
                }
                stack
            }
            Err(err) => {
                warn!(%err, "remove_slot");
                ItemStack::EMPTY
            }
        }
    }

    /// Take up to `count` units from a slot as a separate stack.
    pub fn split_slot(&mut self, index: usize, count: u32) -> ItemStack {
        match self.slots.split(index, count) {
            Ok(stack) => {
                if !stack.is_empty() {
                    self.dirty = true;
                }
                stack
            }
            Err(err) => {
                warn!(%err, "split_slot");
                ItemStack::EMPTY
            }
        }
    }

    /// True when every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.all_empty()
    }

    /// Empty every slot. Timers are left alone.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.dirty = true;
    }

    /// Whether `stack` may be placed in `index` by an automated inserter.
    /// Fuel and input slots accept anything; output slots accept nothing.
    pub fn accepts(&self, index: usize, stack: &ItemStack) -> bool {
        match self.layout().region(index) {
            Some(SlotRegion::Fuel(_)) => accepts_in_fuel_slot(stack),
            Some(SlotRegion::Input(_)) => accepts_in_input_slot(stack),
            Some(SlotRegion::Output(_)) => accepts_in_output_slot(stack),
            None => false,
        }
    }

    // ---- dirty tracking ----

    /// State changed since the last [`ApplianceState::clear_dirty`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge a save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Forget the cached burning count so the next tick re-signals a refresh.
    pub(crate) fn invalidate_burning_cache(&mut self) {
        self.cached_burning = None;
    }
}

impl Default for ApplianceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything may go in a fuel slot; non-fuel simply never burns.
pub fn accepts_in_fuel_slot(_stack: &ItemStack) -> bool {
    true
}

/// Anything may go in an input slot; unsmeltable items are skipped.
pub fn accepts_in_input_slot(_stack: &ItemStack) -> bool {
    true
}

/// Output slots are filled only by smelting.
pub fn accepts_in_output_slot(_stack: &ItemStack) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CountingHost, RecipeBook};

    #[test]
    fn new_appliance_is_empty_and_idle() {
        let book = RecipeBook::standard();
        let state = ApplianceState::new();
        assert!(state.is_empty());
        assert_eq!(state.slot_count(), 14);
        assert_eq!(state.cook_progress(), 0);
        assert_eq!(state.phase(&book), Phase::Idle);
        assert_eq!(state.number_of_burning_fuel_slots(), 0);
    }

    #[test]
    fn first_tick_always_signals_refresh() {
        let book = RecipeBook::standard();
        let mut host = CountingHost::default();
        let mut state = ApplianceState::new();

        let report = state.tick(&book, &mut host);
        assert!(report.burning_changed);
        assert_eq!(host.burning_history, vec![0]);

        let report = state.tick(&book, &mut host);
        assert!(!report.burning_changed);
        assert_eq!(host.refreshes, 1);
    }

    #[test]
    fn idle_appliance_keeps_fuel() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        let coal = book.stack("coal", 3).unwrap();
        state.set_slot(0, coal.clone());

        for _ in 0..50 {
            state.tick(&book, &mut ());
        }
        assert_eq!(state.get_slot(0), &coal);
        assert_eq!(state.number_of_burning_fuel_slots(), 0);
    }

    #[test]
    fn four_fuel_slots_cook_four_times_faster() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        for fuel in 0..4 {
            state.set_slot(fuel, book.stack("coal", 1).unwrap());
        }
        state.set_slot(4, book.stack("iron_ore", 2).unwrap());

        for _ in 0..49 {
            let report = state.tick(&book, &mut ());
            assert_eq!(report.burning, 4);
            assert!(report.smelted.is_none());
        }
        assert_eq!(state.cook_progress(), 196);
        let report = state.tick(&book, &mut ());
        assert!(report.smelted.is_some());
        assert_eq!(state.cook_progress(), 0);
        assert_eq!(state.get_slot(9).count, 1);
    }

    #[test]
    fn slot_writes_cap_and_mark_dirty() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        state.set_slot(4, book.stack("sand", 200).unwrap());
        assert_eq!(state.get_slot(4).count, 64);
        assert!(state.is_dirty());
        state.clear_dirty();

        let taken = state.split_slot(4, 10);
        assert_eq!(taken.count, 10);
        assert_eq!(state.get_slot(4).count, 54);
        assert!(state.is_dirty());

        let rest = state.remove_slot(4);
        assert_eq!(rest.count, 54);
        assert!(state.get_slot(4).is_empty());
    }

    #[test]
    fn out_of_range_slot_access_degrades() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        assert!(state.get_slot(99).is_empty());
        state.set_slot(99, book.stack("sand", 1).unwrap());
        assert!(state.is_empty());
        assert!(state.remove_slot(99).is_empty());
        assert!(state.split_slot(99, 4).is_empty());
        assert!(state.try_get_slot(99).is_err());
    }

    #[test]
    fn slot_acceptance_by_region() {
        let book = RecipeBook::standard();
        let state = ApplianceState::new();
        let stone = book.stack("stone", 1).unwrap();
        assert!(state.accepts(0, &stone));
        assert!(state.accepts(4, &stone));
        assert!(!state.accepts(9, &stone));
        assert!(!state.accepts(14, &stone));
    }

    #[test]
    fn clear_empties_slots_but_keeps_timers() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        state.set_slot(0, book.stack("coal", 2).unwrap());
        state.set_slot(4, book.stack("iron_ore", 2).unwrap());
        state.tick(&book, &mut ());
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.number_of_burning_fuel_slots(), 1);
    }
}
