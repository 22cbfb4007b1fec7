//! Episode driver
//!
//! Owns every pilot for the lifetime of one run: applies start-of-tick
//! verdicts and rewards, integrates motion, then asks each surviving driver
//! for the next controls. A pilot bundles its car, its driver and its score,
//! so removing a dead car is a single operation on a single collection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::car::{Car, CarSnapshot};
use super::tick::{DeathCause, Verdict, advance, judge};
use super::track::Track;
use crate::report::{EpisodeEnd, EpisodeReport, ReportEntry};
use crate::settings::{ConfigError, SimulationConfig};
use crate::{Controls, Sensors};

/// Identifies a pilot within an episode (assigned in insertion order)
pub type PilotId = u32;

/// Decision function: sensor distances in, control signals out.
///
/// Signals are `[accelerate, turn_right, turn_left]`; each fires when it
/// exceeds its configured threshold.
pub trait Driver: Send {
    fn decide(&mut self, sensors: &Sensors) -> Controls;
}

impl<F> Driver for F
where
    F: FnMut(&Sensors) -> Controls + Send,
{
    fn decide(&mut self, sensors: &Sensors) -> Controls {
        self(sensors)
    }
}

/// Cloneable flag that stops an episode at the next tick boundary
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One candidate: its car, its decision function and its score
struct Pilot {
    id: PilotId,
    car: Car,
    driver: Box<dyn Driver>,
    /// Score reported to the optimizer (penalties land here only)
    score: f32,
    gates: u32,
    ticks: u64,
}

impl Pilot {
    fn entry(&self, death: Option<DeathCause>) -> ReportEntry {
        ReportEntry {
            id: self.id,
            fitness: self.score,
            gates: self.gates,
            ticks: self.ticks,
            death,
        }
    }
}

/// A single simulated run of one or more cars on one track
pub struct Episode<'t> {
    track: &'t Track,
    config: SimulationConfig,
    pilots: Vec<Pilot>,
    removed: Vec<ReportEntry>,
    /// Cars removed during the latest tick, kept for one more snapshot
    wrecks: Vec<(PilotId, Car)>,
    ticks: u64,
    ended: Option<EpisodeEnd>,
    abort: AbortHandle,
    next_id: PilotId,
}

impl<'t> Episode<'t> {
    /// Create an empty episode; the config is validated up front
    pub fn new(track: &'t Track, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            track,
            config,
            pilots: Vec::new(),
            removed: Vec::new(),
            wrecks: Vec::new(),
            ticks: 0,
            ended: None,
            abort: AbortHandle::default(),
            next_id: 0,
        })
    }

    /// Spawn a car on the start point driven by `driver`
    pub fn add_pilot(&mut self, driver: impl Driver + 'static) -> PilotId {
        let id = self.next_id;
        self.next_id += 1;
        self.pilots.push(Pilot {
            id,
            car: Car::spawn(self.track, self.config.detection_range),
            driver: Box::new(driver),
            score: 0.0,
            gates: 0,
            ticks: 0,
        });
        id
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ended(&self) -> Option<EpisodeEnd> {
        self.ended
    }

    /// Cars still driving
    pub fn active(&self) -> impl Iterator<Item = (PilotId, &Car)> {
        self.pilots.iter().map(|p| (p.id, &p.car))
    }

    pub fn active_count(&self) -> usize {
        self.pilots.len()
    }

    /// Renderable state of every active car, followed by the cars removed
    /// during the latest tick (with `alive == false`)
    pub fn snapshots(&self) -> Vec<(PilotId, CarSnapshot)> {
        let active = self.pilots.iter().map(|p| (p.id, &p.car));
        let wrecks = self.wrecks.iter().map(|(id, car)| (*id, car));
        active
            .chain(wrecks)
            .map(|(id, car)| (id, car.snapshot(self.track)))
            .collect()
    }

    /// Advance every active car by `dt` seconds (finite and positive).
    ///
    /// Returns why the episode ended, if it has. Once ended, further calls do
    /// nothing and keep returning the same reason.
    pub fn tick(&mut self, dt: f32) -> Option<EpisodeEnd> {
        debug_assert!(dt.is_finite() && dt > 0.0, "tick length must be positive, got {dt}");
        if self.ended.is_some() {
            return self.ended;
        }
        if self.abort.is_aborted() {
            return self.finish(EpisodeEnd::Aborted);
        }
        if self.pilots.is_empty() {
            return self.finish(EpisodeEnd::Extinct);
        }

        self.wrecks.clear();

        let track = self.track;
        let config = &self.config;
        let removed = &mut self.removed;
        let wrecks = &mut self.wrecks;
        let pilots = &mut self.pilots;
        let mut cap_reached = false;

        pilots.retain_mut(|pilot| {
            let verdict = judge(&mut pilot.car, track, config);
            if let Some(cause) = verdict.death_cause() {
                pilot.score -= config.wall_penalty;
                pilot.car.alive = false;
                log::debug!(
                    "Pilot {} removed ({:?}) after {} ticks, fitness {}",
                    pilot.id,
                    cause,
                    pilot.ticks,
                    pilot.score
                );
                removed.push(pilot.entry(Some(cause)));
                wrecks.push((pilot.id, pilot.car.clone()));
                return false;
            }

            if verdict == Verdict::Checkpoint {
                pilot.car.fitness += config.checkpoint_reward;
                pilot.score += config.checkpoint_reward;
                pilot.gates += 1;
            }
            if pilot.car.fitness >= config.fitness_cap {
                cap_reached = true;
            }

            advance(&mut pilot.car, track, config, dt);
            pilot.ticks += 1;
            true
        });

        for pilot in pilots.iter_mut() {
            let controls = pilot.driver.decide(&pilot.car.sensor_distances);
            pilot.car.apply_controls(&controls, config);
        }

        self.ticks += 1;

        if cap_reached {
            log::debug!("Fitness cap {} reached at tick {}", self.config.fitness_cap, self.ticks);
            self.finish(EpisodeEnd::FitnessCap)
        } else if self.pilots.is_empty() {
            self.finish(EpisodeEnd::Extinct)
        } else if self.config.max_ticks.is_some_and(|max| self.ticks >= max) {
            log::warn!("Tick budget exhausted with {} cars driving", self.pilots.len());
            self.finish(EpisodeEnd::TickBudget)
        } else {
            None
        }
    }

    fn finish(&mut self, end: EpisodeEnd) -> Option<EpisodeEnd> {
        if end == EpisodeEnd::Aborted {
            log::warn!("Episode aborted at tick {}", self.ticks);
        }
        self.ended = Some(end);
        self.ended
    }

    /// Tick at `config.tick_dt` until the episode ends
    pub fn run(mut self) -> EpisodeReport {
        log::info!(
            "Episode started: {} pilots, {} gates",
            self.pilots.len(),
            self.track.gate_count()
        );
        let dt = self.config.tick_dt;
        while self.tick(dt).is_none() {}
        let report = self.into_report();
        log::info!(
            "Episode ended ({:?}) after {} ticks, best fitness {:?}",
            report.end,
            report.ticks,
            report.best().map(|e| e.fitness)
        );
        report
    }

    /// Final per-pilot results: survivors and removed cars alike.
    ///
    /// An episode reported before it ended counts as aborted.
    pub fn into_report(self) -> EpisodeReport {
        let end = self.ended.unwrap_or(EpisodeEnd::Aborted);
        let mut report = EpisodeReport::new(end, self.ticks);
        for pilot in &self.pilots {
            report.insert(pilot.entry(None));
        }
        for entry in self.removed {
            report.insert(entry);
        }
        report
    }
}
