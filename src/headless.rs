use crate::config::RunConfig;
use anyhow::{Context, Result};
use serde_json::json;
use smeltery_core::SimTick;
use smeltery_furnace::{ApplianceState, ApplianceStore, CountingHost, Phase, TickReport};
use smeltery_testkit::{EventRecord, JsonlSink, RunCounters, RunReport, RunReportSink};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

pub struct HeadlessConfig {
    pub run: RunConfig,
    /// Resume from a saved appliance file instead of the configured slots.
    pub load: Option<PathBuf>,
    /// Save the final appliance here, overriding the run configuration.
    pub save: Option<PathBuf>,
    /// JSONL event log.
    pub events: Option<PathBuf>,
    /// JSON run report.
    pub report: Option<PathBuf>,
}

pub struct HeadlessOutcome {
    pub state: ApplianceState,
    pub report: RunReport,
}

/// Split `path` into a store rooted at its parent and the file stem.
fn open_store(path: &Path) -> Result<(ApplianceStore, String)> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("appliance path has no file name: {}", path.display()))?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let store = ApplianceStore::new(&dir)
        .with_context(|| format!("failed to open appliance store {}", dir.display()))?;
    Ok((store, name))
}

pub fn run(cfg: HeadlessConfig) -> Result<HeadlessOutcome> {
    let started = Instant::now();
    let book = cfg.run.recipe_book()?;

    let mut state = match &cfg.load {
        Some(path) => {
            let (store, name) = open_store(path)?;
            let record = store
                .load(&name)
                .with_context(|| format!("failed to load appliance {}", path.display()))?;
            info!(path = %path.display(), "resuming saved appliance");
            record.to_state(cfg.run.layout, cfg.run.tuning)
        }
        None => cfg.run.build_state(&book),
    };

    let mut sink = cfg.events.as_ref().map(JsonlSink::create).transpose()?;
    let mut host = CountingHost::default();
    let mut counters = RunCounters::default();
    let mut phase = state.phase(&book);
    let mut tick = SimTick::ZERO;

    for _ in 0..cfg.run.ticks {
        tick = tick.advance(1);
        let report = state.tick(&book, &mut host);

        counters.ticks += 1;
        if report.burning > 0 {
            counters.burning_ticks += 1;
        }
        counters.fuel_consumed += report.refuelled as u64;
        if report.smelted.is_some() {
            counters.smelted += 1;
        }

        if let Some(sink) = sink.as_mut() {
            write_events(sink, tick, &report, phase)?;
        }
        phase = report.phase;
    }
    counters.refreshes = host.refreshes as u64;

    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
    }

    if let Some(path) = cfg.save.as_ref().or(cfg.run.save.as_ref()) {
        let (store, name) = open_store(path)?;
        store
            .save(&name, &state.write_record())
            .with_context(|| format!("failed to save appliance {}", path.display()))?;
        state.clear_dirty();
        info!(path = %store.path(&name).display(), "appliance saved");
    }

    let report = RunReport::new(cfg.run.name.clone(), counters)
        .final_phase(format!("{:?}", state.phase(&book)))
        .duration(started.elapsed().as_secs_f64());
    if let Some(path) = &cfg.report {
        RunReportSink::create(path)?.write(&report)?;
    }

    Ok(HeadlessOutcome { state, report })
}

fn write_events(sink: &mut JsonlSink, tick: SimTick, report: &TickReport, previous: Phase) -> Result<()> {
    if report.refuelled > 0 {
        sink.write(&EventRecord {
            tick,
            kind: "Refuel",
            payload: json!({ "slots": report.refuelled }),
        })?;
    }
    if let Some(plan) = &report.smelted {
        sink.write(&EventRecord {
            tick,
            kind: "Smelted",
            payload: json!({
                "input_slot": plan.input_slot,
                "output_slot": plan.output_slot,
                "item": plan.result.item.raw(),
                "variant": plan.result.variant,
                "count": plan.result.count,
            }),
        })?;
    }
    if report.burning_changed {
        sink.write(&EventRecord {
            tick,
            kind: "BurningChanged",
            payload: json!({ "burning": report.burning }),
        })?;
    }
    if report.phase != previous {
        sink.write(&EventRecord {
            tick,
            kind: "Phase",
            payload: json!({ "from": format!("{previous:?}"), "to": format!("{:?}", report.phase) }),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(tag: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("smeltery_headless_{tag}_{stamp}"))
    }

    fn headless(run: RunConfig) -> HeadlessConfig {
        HeadlessConfig {
            run,
            load: None,
            save: None,
            events: None,
            report: None,
        }
    }

    #[test]
    fn default_run_smelts_and_reports() {
        let dir = temp_dir("default");
        let mut cfg = headless(RunConfig::default());
        cfg.events = Some(dir.join("events.jsonl"));
        cfg.report = Some(dir.join("report.json"));

        let outcome = run(cfg).unwrap();
        // Coal and a stick light together, so ore cooks at two per tick.
        assert!(outcome.report.counters.smelted >= 6);
        assert_eq!(outcome.report.counters.ticks, 1200);

        let events = fs::read_to_string(dir.join("events.jsonl")).unwrap();
        let kinds: Vec<String> = events
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["kind"].to_string())
            .collect();
        assert!(kinds.iter().any(|k| k == "\"Refuel\""));
        assert!(kinds.iter().any(|k| k == "\"Smelted\""));
        assert!(kinds.iter().any(|k| k == "\"BurningChanged\""));
        assert!(dir.join("report.json").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn configured_save_path_is_used_without_override() {
        let dir = temp_dir("configured");
        let configured = dir.join("configured.smlt");
        let overridden = dir.join("overridden.smlt");

        run(headless(RunConfig {
            ticks: 10,
            save: Some(configured.clone()),
            ..RunConfig::default()
        }))
        .unwrap();
        assert!(configured.exists());
        fs::remove_file(&configured).unwrap();

        let mut cfg = headless(RunConfig {
            ticks: 10,
            save: Some(configured.clone()),
            ..RunConfig::default()
        });
        cfg.save = Some(overridden.clone());
        run(cfg).unwrap();
        assert!(overridden.exists());
        assert!(!configured.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_then_resume_continues_the_run() {
        let dir = temp_dir("resume");
        let path = dir.join("kiln.smlt");

        let mut first = headless(RunConfig {
            ticks: 150,
            ..RunConfig::default()
        });
        first.save = Some(path.clone());
        let first = run(first).unwrap();
        assert!(path.exists());

        let mut second = headless(RunConfig {
            ticks: 150,
            slots: Vec::new(),
            ..RunConfig::default()
        });
        second.load = Some(path.clone());
        let second = run(second).unwrap();

        let straight = run(headless(RunConfig {
            ticks: 300,
            ..RunConfig::default()
        }))
        .unwrap();
        assert_eq!(second.state.slots(), straight.state.slots());
        assert_eq!(second.state.fuel_bank(), straight.state.fuel_bank());
        assert_eq!(second.state.cook_progress(), straight.state.cook_progress());
        assert_eq!(first.report.counters.smelted, 1);
        assert_eq!(straight.report.counters.smelted, 3);

        fs::remove_dir_all(&dir).ok();
    }
}
