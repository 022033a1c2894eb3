//! Timed replays of toast calls against a page.
//!
//! A scenario is a list of `show_toast` calls at absolute page times plus the
//! instants at which the surface should be observed. Replays run on the
//! virtual clock, so they are deterministic.

use crate::{Page, Result, SurfaceSnapshot, ToastPresenter};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub at_ms: u64,
    pub message: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
    #[serde(default)]
    pub observe_at: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub at_ms: u64,
    pub surface: Option<SurfaceSnapshot>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Replay `scenario` and return one observation per `observe_at` entry, in
/// time order.
///
/// At a shared instant, timers due by then fire first, then the steps run
/// (in file order), then observations are taken.
pub fn run_scenario(
    page: &mut Page,
    presenter: &mut ToastPresenter,
    scenario: &Scenario,
) -> Result<Vec<Observation>> {
    // (time, kind, index): kind 0 = step, 1 = observation
    let mut events: Vec<(u64, u8, usize)> = Vec::new();
    events.extend(scenario.steps.iter().enumerate().map(|(i, s)| (s.at_ms, 0, i)));
    events.extend(scenario.observe_at.iter().enumerate().map(|(i, t)| (*t, 1, i)));
    events.sort();

    let mut observations = Vec::with_capacity(scenario.observe_at.len());
    for (at_ms, kind, idx) in events {
        page.advance_to(at_ms);
        if kind == 0 {
            let step = &scenario.steps[idx];
            presenter.show_toast(page, &step.message, step.category.as_deref())?;
        } else {
            observations.push(Observation {
                at_ms,
                surface: presenter.surface_snapshot(page),
            });
        }
    }
    Ok(observations)
}
