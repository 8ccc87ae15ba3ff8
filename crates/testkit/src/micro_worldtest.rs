//! Micro-worldtest harness for deterministic, tick-based snapshot tests.
//!
//! A micro-worldtest steps a tiny simulation for a fixed number of ticks and
//! records selected state each tick. The report can be compared against a
//! golden JSON file ([`run_micro_worldtest`]) or captured in memory so two runs
//! can be compared directly ([`capture_micro_worldtest`]).

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use clawcade_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Human-readable name (written into the snapshot report).
    pub name: String,
    /// Number of ticks to step (report includes the initial snapshot at tick 0).
    pub ticks: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Every frame of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Test name.
    pub name: String,
    /// Frames in tick order, starting at tick 0.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

/// Step `state` for `ticks` ticks and collect a snapshot before the first step
/// and after every step (`ticks + 1` frames).
pub fn capture_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    name: impl Into<String>,
    ticks: u64,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> MicroWorldtestReport<Snapshot>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(MicroWorldtestFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    MicroWorldtestReport {
        name: name.into(),
        frames,
    }
}

/// Run a micro-worldtest and assert (or update) the snapshot at `config.snapshot_path`.
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
    let report = capture_micro_worldtest(config.name, config.ticks, state, step, snapshot);
    assert_json_snapshot(config.snapshot_path, &report)
}
