//! Micro-worldtest harness: step a small simulation for a fixed number of
//! ticks, snapshot it every `sample_every` ticks, and compare the report
//! against a golden file.

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use smeltery_core::SimTick;
use std::path::PathBuf;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Name written into the report.
    pub name: String,
    /// Ticks to step. Tick 0 and the final tick are always captured.
    pub ticks: u64,
    /// Capture a frame every this many ticks (0 behaves like 1).
    pub sample_every: u64,
    /// Golden JSON file.
    pub snapshot_path: PathBuf,
}

impl MicroWorldtestConfig {
    /// Capture every tick.
    pub fn new(name: impl Into<String>, ticks: u64, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            ticks,
            sample_every: 1,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Builder-style sampling interval.
    pub fn sample_every(mut self, every: u64) -> Self {
        self.sample_every = every;
        self
    }
}

/// Snapshot captured at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Every captured frame of a run.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Run name.
    pub name: String,
    /// Frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

/// Step `state` and collect frames without touching any golden file.
pub fn record_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: &MicroWorldtestConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let every = config.sample_every.max(1);
    let mut frames = Vec::new();

    let mut tick = SimTick::ZERO;
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        if tick.0 % every == 0 || tick.0 == config.ticks {
            frames.push(MicroWorldtestFrame {
                tick: tick.0,
                snapshot: snapshot(tick, &state),
            });
        }
    }

    MicroWorldtestReport {
        name: config.name.clone(),
        frames,
    }
}

/// Run a micro-worldtest and assert (or update) its golden snapshot.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    state: State,
    step: StepFn,
    snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let report = record_micro_worldtest(&config, state, step, snapshot);
    assert_json_snapshot(&config.snapshot_path, &report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_captures_every_tick() {
        let config = MicroWorldtestConfig::new("counter", 4, "unused.json");
        let report = record_micro_worldtest(&config, 10u32, |_, n| *n += 2, |tick, n| (tick.0, *n));
        let frames: Vec<(u64, u32)> = report.frames.iter().map(|f| f.snapshot).collect();
        assert_eq!(frames, vec![(0, 10), (1, 12), (2, 14), (3, 16), (4, 18)]);
    }

    #[test]
    fn sampling_keeps_first_and_last_frames() {
        let config = MicroWorldtestConfig::new("counter", 7, "unused.json").sample_every(3);
        let report = record_micro_worldtest(&config, 0u32, |_, n| *n += 1, |_, n| *n);
        let ticks: Vec<u64> = report.frames.iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![0, 3, 6, 7]);
        assert_eq!(report.frames.last().unwrap().snapshot, 7);
    }
}
