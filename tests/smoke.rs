use serde_json::json;
use smeltery_core::SimTick;
use smeltery_furnace::{ApplianceState, RecipeBook};
use smeltery_testkit::{EventRecord, JsonlSink};

#[test]
fn deterministic_event_stream_can_be_written() {
    let path = std::env::temp_dir().join("smeltery-eventlog.jsonl");
    let mut sink = JsonlSink::create(&path).expect("can create temp log");

    let book = RecipeBook::standard();
    let mut state = ApplianceState::new();
    state.set_slot(0, book.stack("coal", 1).expect("coal exists"));
    state.set_slot(4, book.stack("sand", 1).expect("sand exists"));

    let mut tick = SimTick::ZERO;
    for _ in 0..200 {
        tick = tick.advance(1);
        if let Some(plan) = state.tick(&book, &mut ()).smelted {
            let record = EventRecord {
                tick,
                kind: "Smelted",
                payload: json!({ "output_slot": plan.output_slot }),
            };
            sink.write(&record).expect("can write event");
        }
    }
    sink.flush().expect("can flush");
    assert_eq!(sink.written(), 1);
    assert_eq!(tick, SimTick(200));
}
