use smeltery_furnace::{ApplianceState, RecipeBook};
use smeltery_testkit::{run_micro_worldtest, MicroWorldtestConfig};
use serde::Serialize;
use std::path::PathBuf;

fn snapshot_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/snapshots")
        .join(name)
}

#[test]
fn micro_two_sticks_one_slot_snapshot() {
    #[derive(Debug, Clone, Serialize)]
    struct Snap {
        burning: usize,
        cook: u32,
        fuel_items: u32,
        input: u32,
        output: u32,
        phase: String,
        remaining: u32,
    }

    let book = RecipeBook::standard();
    let mut state = ApplianceState::new();
    state.set_slot(0, book.stack("stick", 2).unwrap());
    state.set_slot(4, book.stack("iron_ore", 2).unwrap());

    let config = MicroWorldtestConfig::new(
        "micro_two_sticks_one_slot",
        220,
        snapshot_path("micro_two_sticks_one_slot.json"),
    )
    .sample_every(20);

    run_micro_worldtest(
        config,
        state,
        |_, state| {
            state.tick(&book, &mut ());
        },
        |_, state| Snap {
            burning: state.number_of_burning_fuel_slots(),
            cook: state.cook_progress(),
            fuel_items: state.slots().fuel().iter().map(|s| s.count).sum(),
            input: state.slots().input().iter().map(|s| s.count).sum(),
            output: state.slots().output().iter().map(|s| s.count).sum(),
            phase: format!("{:?}", state.phase(&book)),
            remaining: state.fuel_bank().remaining()[0],
        },
    )
    .expect("snapshot matches");
}
