//! Integer-indexed table of the scalar simulation fields.
//!
//! A remote observer mirrors cook progress and fuel timers through this table
//! without receiving slot contents every tick. Layout, for `F` fuel slots:
//!
//! | id            | field                      |
//! |---------------|----------------------------|
//! | `0`           | cook progress              |
//! | `1..1+F`      | burn time remaining, slot i |
//! | `1+F..1+2F`   | burn time initial, slot i  |

use crate::cook::CookClock;
use crate::error::FurnaceError;
use crate::fuel::FuelBank;
use crate::layout::{FurnaceTuning, SlotLayout};
use crate::state::ApplianceState;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One entry of the field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncField {
    /// Cook progress in ticks.
    CookProgress,
    /// Burn time left in fuel slot `n`.
    BurnRemaining(usize),
    /// Burn time the current charge of fuel slot `n` started with.
    BurnInitial(usize),
}

impl SyncField {
    /// Number of fields for `fuel_slots` fuel slots.
    pub fn count(fuel_slots: usize) -> usize {
        1 + 2 * fuel_slots
    }

    /// Decode an id.
    pub fn from_id(id: usize, fuel_slots: usize) -> Option<Self> {
        match id {
            0 => Some(SyncField::CookProgress),
            id if id < 1 + fuel_slots => Some(SyncField::BurnRemaining(id - 1)),
            id if id < Self::count(fuel_slots) => Some(SyncField::BurnInitial(id - 1 - fuel_slots)),
            _ => None,
        }
    }

    /// Encode to an id.
    pub fn id(self, fuel_slots: usize) -> usize {
        match self {
            SyncField::CookProgress => 0,
            SyncField::BurnRemaining(slot) => 1 + slot,
            SyncField::BurnInitial(slot) => 1 + fuel_slots + slot,
        }
    }
}

fn to_wire(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn from_wire(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn read_field(clock: &CookClock, fuel: &FuelBank, id: usize) -> Result<i32, FurnaceError> {
    let slots = fuel.slots();
    match SyncField::from_id(id, slots) {
        Some(SyncField::CookProgress) => Ok(to_wire(clock.progress())),
        Some(SyncField::BurnRemaining(slot)) => Ok(to_wire(fuel.remaining()[slot])),
        Some(SyncField::BurnInitial(slot)) => Ok(to_wire(fuel.initial()[slot])),
        None => Err(FurnaceError::FieldOutOfRange {
            id,
            count: SyncField::count(slots),
        }),
    }
}

// Timer writes are stored raw (negatives become zero) so an observer can
// apply remaining/initial in either order. The authoritative state restores
// `remaining <= initial` afterwards.
fn write_field(clock: &mut CookClock, fuel: &mut FuelBank, id: usize, value: i32) -> Result<(), FurnaceError> {
    let slots = fuel.slots();
    let value = from_wire(value);
    match SyncField::from_id(id, slots) {
        Some(SyncField::CookProgress) => clock.set_progress(value),
        Some(SyncField::BurnRemaining(slot)) => {
            fuel.set_remaining(slot, value);
        }
        Some(SyncField::BurnInitial(slot)) => {
            fuel.set_initial(slot, value);
        }
        None => {
            return Err(FurnaceError::FieldOutOfRange {
                id,
                count: SyncField::count(slots),
            })
        }
    }
    Ok(())
}

impl ApplianceState {
    /// Number of sync fields.
    pub fn field_count(&self) -> usize {
        SyncField::count(self.fuel.slots())
    }

    /// Read a field; unknown ids log and read as 0.
    pub fn get_field(&self, id: usize) -> i32 {
        self.try_get_field(id).unwrap_or_else(|err| {
            warn!(%err, "get_field");
            0
        })
    }

    /// Write a field; unknown ids log and are ignored.
    pub fn set_field(&mut self, id: usize, value: i32) {
        if let Err(err) = self.try_set_field(id, value) {
            warn!(%err, "set_field");
        }
    }

    /// Checked field read.
    pub fn try_get_field(&self, id: usize) -> Result<i32, FurnaceError> {
        read_field(&self.clock, &self.fuel, id)
    }

    /// Checked field write. A timer write that would leave a slot with more
    /// burn time than its charge started with raises `initial` to match.
    pub fn try_set_field(&mut self, id: usize, value: i32) -> Result<(), FurnaceError> {
        write_field(&mut self.clock, &mut self.fuel, id, value)?;
        for slot in self.fuel.raise_initial_to_remaining() {
            debug!(id, slot, "initial burn time raised to remaining");
        }
        Ok(())
    }

    /// Copy of every field, for diffing against the last transmitted copy.
    pub fn sync_snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            values: (0..self.field_count()).map(|id| self.get_field(id)).collect(),
        }
    }
}

/// Every sync field value, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncSnapshot {
    /// Field values indexed by id.
    pub values: Vec<i32>,
}

impl SyncSnapshot {
    /// Write every field into `state`, in id order.
    ///
    /// Remaining timers land before initial ones, so a snapshot taken from a
    /// valid state is reproduced exactly.
    pub fn apply(&self, state: &mut ApplianceState) {
        for (id, &value) in self.values.iter().enumerate() {
            state.set_field(id, value);
        }
    }

    /// `(id, value)` pairs that differ from `previous`. Fields missing from
    /// `previous` always count as changed.
    pub fn diff(&self, previous: &SyncSnapshot) -> Vec<(usize, i32)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(id, value)| previous.values.get(*id) != Some(*value))
            .map(|(id, value)| (id, *value))
            .collect()
    }
}

/// Observer-side copy of the sync fields, exposing the same derived metrics
/// as the authoritative [`ApplianceState`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncMirror {
    tuning: FurnaceTuning,
    clock: CookClock,
    fuel: FuelBank,
}

impl SyncMirror {
    /// Zeroed mirror for an appliance with `layout` and `tuning`.
    pub fn new(layout: SlotLayout, tuning: FurnaceTuning) -> Self {
        Self {
            tuning,
            clock: CookClock::new(tuning.completion_threshold, tuning.regression_per_tick),
            fuel: FuelBank::new(layout.fuel),
        }
    }

    /// Number of sync fields.
    pub fn field_count(&self) -> usize {
        SyncField::count(self.fuel.slots())
    }

    /// Read a mirrored field; unknown ids log and read as 0.
    pub fn get_field(&self, id: usize) -> i32 {
        read_field(&self.clock, &self.fuel, id).unwrap_or_else(|err| {
            warn!(%err, "mirror get_field");
            0
        })
    }

    /// Apply one received field; unknown ids log and are ignored.
    pub fn set_field(&mut self, id: usize, value: i32) {
        if let Err(err) = write_field(&mut self.clock, &mut self.fuel, id, value) {
            warn!(%err, "mirror set_field");
        }
    }

    /// Apply a batch of `(id, value)` updates.
    pub fn apply(&mut self, updates: &[(usize, i32)]) {
        for &(id, value) in updates {
            self.set_field(id, value);
        }
    }

    /// Fraction of the current charge left in a fuel slot.
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

    /// Cook progress as a fraction of the completion threshold.
    pub fn fraction_of_cook_complete(&self) -> f64 {
        self.clock.fraction_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RecipeBook;

    #[test]
    fn id_layout_is_contiguous() {
        assert_eq!(SyncField::count(4), 9);
        assert_eq!(SyncField::from_id(0, 4), Some(SyncField::CookProgress));
        assert_eq!(SyncField::from_id(1, 4), Some(SyncField::BurnRemaining(0)));
        assert_eq!(SyncField::from_id(4, 4), Some(SyncField::BurnRemaining(3)));
        assert_eq!(SyncField::from_id(5, 4), Some(SyncField::BurnInitial(0)));
        assert_eq!(SyncField::from_id(8, 4), Some(SyncField::BurnInitial(3)));
        assert_eq!(SyncField::from_id(9, 4), None);
        for id in 0..9 {
            assert_eq!(SyncField::from_id(id, 4).unwrap().id(4), id);
        }
    }

    #[test]
    fn fields_read_live_state() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        state.set_slot(1, book.stack("coal", 1).unwrap());
        state.set_slot(4, book.stack("iron_ore", 1).unwrap());
        state.tick(&book, &mut ());

        assert_eq!(state.field_count(), 9);
        assert_eq!(state.get_field(0), 1);
        assert_eq!(state.get_field(2), 1599);
        assert_eq!(state.get_field(6), 1600);
        assert_eq!(state.get_field(1), 0);
    }

    #[test]
    fn out_of_range_ids_are_reported_not_fatal() {
        let mut state = ApplianceState::new();
        assert_eq!(state.get_field(9), 0);
        assert_eq!(
            state.try_get_field(42),
            Err(FurnaceError::FieldOutOfRange { id: 42, count: 9 })
        );
        state.set_field(9, 77);
        assert!(state.try_set_field(9, 77).is_err());
        assert_eq!(state.sync_snapshot().values, vec![0; 9]);
    }

    #[test]
    fn set_field_clamps_cook_and_negatives() {
        let mut state = ApplianceState::new();
        state.set_field(0, 10_000);
        assert_eq!(state.cook_progress(), 200);
        state.set_field(3, -5);
        assert_eq!(state.get_field(3), 0);
    }

    #[test]
    fn mirror_tracks_state_through_diffs() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        let mut mirror = SyncMirror::new(state.layout(), *state.tuning());
        state.set_slot(0, book.stack("coal", 1).unwrap());
        state.set_slot(4, book.stack("iron_ore", 1).unwrap());

        let mut sent = SyncSnapshot::default();
        for _ in 0..50 {
            state.tick(&book, &mut ());
            let current = state.sync_snapshot();
            mirror.apply(&current.diff(&sent));
            sent = current;
        }

        assert_eq!(mirror.fraction_of_cook_complete(), 0.25);
        assert_eq!(mirror.number_of_burning_fuel_slots(), 1);
        assert_eq!(mirror.fraction_of_fuel_remaining(0), state.fraction_of_fuel_remaining(0));
        assert_eq!(mirror.seconds_of_fuel_remaining(0), 77);
        for id in 0..mirror.field_count() {
            assert_eq!(mirror.get_field(id), state.get_field(id));
        }
    }

    #[test]
    fn timer_writes_keep_authoritative_bank_ordered() {
        let book = RecipeBook::standard();
        let mut state = ApplianceState::new();
        state.set_slot(4, book.stack("iron_ore", 1).unwrap());
        state.set_field(1, 500);
        assert_eq!(state.get_field(5), 500);

        for _ in 0..10 {
            state.tick(&book, &mut ());
            let bank = state.fuel_bank();
            assert!(bank.remaining()[0] <= bank.initial()[0]);
        }
        assert_eq!(state.get_field(1), 490);
        assert_eq!(state.get_field(5), 500);
        assert_eq!(state.fraction_of_fuel_remaining(0), 0.98);

        state.set_field(5, 100);
        assert_eq!(state.get_field(5), 490);
    }

    #[test]
    fn mirror_stores_timer_writes_raw() {
        let state = ApplianceState::new();
        let mut mirror = SyncMirror::new(state.layout(), *state.tuning());
        mirror.set_field(1, 500);
        assert_eq!(mirror.get_field(5), 0);
        mirror.set_field(5, 1600);
        assert_eq!(mirror.get_field(1), 500);
        assert_eq!(mirror.get_field(5), 1600);
    }

    #[test]
    fn snapshot_apply_reproduces_fields() {
        let book = RecipeBook::standard();
        let mut source = ApplianceState::new();
        source.set_slot(0, book.stack("coal", 1).unwrap());
        source.set_slot(1, book.stack("stick", 1).unwrap());
        source.set_slot(4, book.stack("iron_ore", 3).unwrap());
        for _ in 0..70 {
            source.tick(&book, &mut ());
        }

        let mut target = ApplianceState::new();
        target.set_field(2, 9_000);
        source.sync_snapshot().apply(&mut target);
        assert_eq!(target.sync_snapshot(), source.sync_snapshot());
        assert_eq!(target.fuel_bank(), source.fuel_bank());
    }

    #[test]
    fn diff_reports_only_changes() {
        let prev = SyncSnapshot { values: vec![1, 2, 3] };
        let next = SyncSnapshot { values: vec![1, 5, 3] };
        assert_eq!(next.diff(&prev), vec![(1, 5)]);
        assert_eq!(next.diff(&SyncSnapshot::default()).len(), 3);
    }
}
