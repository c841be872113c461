//! Structured, versionable record of an appliance.
//!
//! Field names are part of the on-disk contract. Reading is lenient: missing
//! keys default, unknown keys are ignored, wrongly typed entries are dropped,
//! and malformed values are clamped, padded or skipped (each one logged) so a
//! partially corrupt record still produces a usable appliance.

use crate::layout::{FurnaceTuning, SlotLayout};
use crate::state::ApplianceState;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use smeltery_core::{ItemId, ItemStack};
use tracing::warn;

/// Persisted form of an [`ApplianceState`].
///
/// Integers are stored wide so out-of-range values survive parsing and are
/// clamped on read instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ApplianceRecord {
    /// Cook progress.
    #[serde(rename = "CookTime")]
    pub cook_time: i64,
    /// Burn time left per fuel slot.
    #[serde(rename = "BurnTimeRemaining")]
    pub burn_time_remaining: Vec<i64>,
    /// Burn time the current charge started with, per fuel slot.
    #[serde(rename = "BurnTimeInitial")]
    pub burn_time_initial: Vec<i64>,
    /// Non-empty slots only.
    #[serde(rename = "Items")]
    pub items: Vec<SlotRecord>,
}

/// One non-empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SlotRecord {
    /// Slot index.
    #[serde(rename = "Slot")]
    pub slot: i64,
    /// Item id.
    #[serde(rename = "id")]
    pub id: i64,
    /// Item variant.
    #[serde(rename = "Variant")]
    pub variant: i64,
    /// Stack count.
    #[serde(rename = "Count")]
    pub count: i64,
    /// Opaque stack tag.
    #[serde(rename = "tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<u8>>,
}

impl<'de> Deserialize<'de> for ApplianceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// Integer view of a JSON number. Integral floats (`3.0`) are accepted and
/// values past `i64` saturate.
fn int_value(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_u64().map(|_| i64::MAX))
        .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

fn cook_value(map: &Map<String, Value>) -> i64 {
    match map.get("CookTime") {
        None | Some(Value::Null) => 0,
        Some(value) => int_value(value).unwrap_or_else(|| {
            warn!(%value, "CookTime is not an integer, using 0");
            0
        }),
    }
}

fn timer_values(map: &Map<String, Value>, key: &'static str) -> Vec<i64> {
    match map.get(key) {
        None => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(slot, value)| {
                int_value(value).unwrap_or_else(|| {
                    warn!(key, slot, %value, "timer is not an integer, using 0");
                    0
                })
            })
            .collect(),
        Some(value) => {
            warn!(key, %value, "timer list is not an array, treated as empty");
            Vec::new()
        }
    }
}

fn item_values(map: &Map<String, Value>) -> Vec<SlotRecord> {
    match map.get("Items") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let parsed = SlotRecord::from_value(entry);
                if parsed.is_none() {
                    warn!(index, %entry, "record item has the wrong shape, skipped");
                }
                parsed
            })
            .collect(),
        Some(value) => {
            warn!(%value, "Items is not an array, treated as empty");
            Vec::new()
        }
    }
}

impl SlotRecord {
    /// Type-check one `Items` entry. Absent or null fields default; any other
    /// wrongly typed field rejects the entry.
    fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let int = |key: &str| match entry.get(key) {
            None | Some(Value::Null) => Some(0),
            Some(value) => int_value(value),
        };
        let tag = match entry.get("tag") {
            None | Some(Value::Null) => None,
            Some(Value::Array(bytes)) => Some(
                bytes
                    .iter()
                    .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()?,
            ),
            Some(_) => return None,
        };
        Some(Self {
            slot: int("Slot")?,
            id: int("id")?,
            variant: int("Variant")?,
            count: int("Count")?,
            tag,
        })
    }
}

impl ApplianceRecord {
    /// Capture an appliance.
    pub fn from_state(state: &ApplianceState) -> Self {
        let fuel = state.fuel_bank();
        let items = state
            .slots()
            .iter()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(slot, stack)| SlotRecord {
                slot: slot as i64,
                id: i64::from(stack.item.raw()),
                variant: i64::from(stack.variant),
                count: i64::from(stack.count),
                tag: stack.tag.clone(),
            })
            .collect();

        Self {
            cook_time: i64::from(state.cook_progress()),
            burn_time_remaining: fuel.remaining().iter().map(|&t| i64::from(t)).collect(),
            burn_time_initial: fuel.initial().iter().map(|&t| i64::from(t)).collect(),
            items,
        }
    }

    /// Build a fresh appliance from this record.
    pub fn to_state(&self, layout: SlotLayout, tuning: FurnaceTuning) -> ApplianceState {
        let mut state = ApplianceState::with_config(layout, tuning);
        state.read_record(self);
        state
    }

    /// Pretty JSON bytes.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Parse JSON bytes. Only JSON syntax errors fail; every range problem is
    /// left for [`ApplianceState::read_record`] to repair.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Lenient conversion from an already parsed JSON tree. A non-object
    /// yields the empty record.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            warn!(%value, "record is not an object, using an empty record");
            return Self::default();
        };
        Self {
            cook_time: cook_value(map),
            burn_time_remaining: timer_values(map, "BurnTimeRemaining"),
            burn_time_initial: timer_values(map, "BurnTimeInitial"),
            items: item_values(map),
        }
    }
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn fit_timers(values: &[i64], len: usize, key: &'static str) -> Vec<u32> {
    if values.len() != len {
        warn!(key, found = values.len(), expected = len, "timer list resized");
    }
    let mut out: Vec<u32> = values
        .iter()
        .take(len)
        .enumerate()
        .map(|(slot, &value)| {
            if value < 0 {
                warn!(key, slot, value, "negative timer clamped to 0");
            }
            clamp_u32(value)
        })
        .collect();
    out.resize(len, 0);
    out
}

fn decode_slot(entry: &SlotRecord, slot_count: usize) -> Option<(usize, ItemStack)> {
    let slot = match usize::try_from(entry.slot) {
        Ok(slot) if slot < slot_count => slot,
        _ => {
            warn!(slot = entry.slot, slot_count, "record slot out of range, skipped");
            return None;
        }
    };
    let item = match u16::try_from(entry.id) {
        Ok(id) if id != ItemId::NONE.raw() => ItemId(id),
        _ => {
            warn!(slot, id = entry.id, "record item id invalid, skipped");
            return None;
        }
    };
    if entry.count <= 0 {
        warn!(slot, count = entry.count, "record stack count not positive, skipped");
        return None;
    }
    let variant = u16::try_from(entry.variant.max(0)).unwrap_or(u16::MAX);
    let mut stack = ItemStack::new(item, clamp_u32(entry.count)).with_variant(variant);
    stack.tag = entry.tag.clone();
    Some((slot, stack))
}

impl ApplianceState {
    /// Capture this appliance as a record.
    pub fn write_record(&self) -> ApplianceRecord {
        ApplianceRecord::from_state(self)
    }

    /// Replace contents and timers from a record.
    ///
    /// Every slot is emptied first, then the record's entries are applied.
    /// Never fails; each repair is logged.
    pub fn read_record(&mut self, record: &ApplianceRecord) {
        let threshold = self.clock.threshold();
        if record.cook_time < 0 || record.cook_time > i64::from(threshold) {
            warn!(value = record.cook_time, threshold, "cook time clamped");
        }
        self.clock.set_progress(clamp_u32(record.cook_time));

        let fuel_slots = self.fuel.slots();
        let remaining = fit_timers(&record.burn_time_remaining, fuel_slots, "BurnTimeRemaining");
        let initial = fit_timers(&record.burn_time_initial, fuel_slots, "BurnTimeInitial");
        for (slot, (&r, &i)) in remaining.iter().zip(&initial).enumerate() {
            if r > i {
                warn!(slot, remaining = r, initial = i, "initial burn time raised to remaining");
            }
            self.fuel.set_remaining(slot, r);
            self.fuel.set_initial(slot, i.max(r));
        }

        self.slots.clear();
        let slot_count = self.slots.len();
        let limit = self.tuning().stack_limit;
        for entry in &record.items {
            if let Some((slot, stack)) = decode_slot(entry, slot_count) {
                if stack.count > limit {
                    warn!(slot, count = stack.count, limit, "record stack count capped");
                }
                if let Err(err) = self.slots.set(slot, stack, limit) {
                    warn!(%err, "record slot rejected");
                }
            }
        }

        self.invalidate_burning_cache();
        self.clear_dirty();
    }

    /// Full record sent to an observer when it first starts tracking.
    pub fn update_record(&self) -> ApplianceRecord {
        self.write_record()
    }

    /// Apply a full record received from the authoritative side.
    pub fn apply_update_record(&mut self, record: &ApplianceRecord) {
        self.read_record(record);
    }
}
