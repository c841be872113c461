#![warn(missing_docs)]
//! Multi-slot smelting appliance simulation.
//!
//! Fuel slots burn in parallel, each burning slot adds one tick of cook
//! progress, and a completed smelt moves one input unit into the first output
//! slot that can take its result.

mod cook;
mod error;
mod fuel;
mod layout;
mod persist;
mod record;
mod rules;
mod selector;
mod slots;
mod state;
mod sync;

pub use cook::CookClock;
pub use error::{FurnaceError, RecipeError, StoreError};
pub use fuel::{FuelBank, FuelTick};
pub use layout::{
    FurnaceTuning, SlotLayout, SlotRegion, VariantPolicy, COOK_TIME_FOR_COMPLETION, MAX_BURN_TICKS,
    TICKS_PER_SECOND, UNFUELLED_REGRESSION,
};
pub use persist::{
    decode_record, encode_record, ApplianceStore, APPLIANCE_EXTENSION, APPLIANCE_MAGIC, APPLIANCE_VERSION,
    HEADER_LEN, MAX_RECORD_BYTES,
};
pub use record::{ApplianceRecord, SlotRecord};
pub use rules::{
    standard_defs, ApplianceHost, CountingHost, FuelDef, ItemDef, RecipeBook, RecipeDef, SmeltRecipe,
    SmeltingRules,
};
pub use selector::{SmeltPlan, SmeltSelector};
pub use slots::SlotArray;
pub use state::{
    accepts_in_fuel_slot, accepts_in_input_slot, accepts_in_output_slot, ApplianceState, Phase, TickReport,
};
pub use sync::{SyncField, SyncMirror, SyncSnapshot};
