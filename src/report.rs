//! Episode results for the optimizer
//!
//! One entry per pilot, kept sorted best-first by final fitness.

use serde::{Deserialize, Serialize};

use crate::sim::{DeathCause, PilotId};

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    /// A car reached the fitness cap (success)
    FitnessCap,
    /// Every car was removed
    Extinct,
    /// `max_ticks` elapsed
    TickBudget,
    /// Stopped through an `AbortHandle`
    Aborted,
}

/// Final result of one pilot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: PilotId,
    /// Externally tracked score (rewards minus penalties)
    pub fitness: f32,
    /// Gates crossed
    pub gates: u32,
    /// Ticks survived
    pub ticks: u64,
    /// `None` if the car was still driving when the episode ended
    pub death: Option<DeathCause>,
}

impl ReportEntry {
    pub fn survived(&self) -> bool {
        self.death.is_none()
    }
}

/// Ranked per-episode results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub end: EpisodeEnd,
    /// Ticks simulated
    pub ticks: u64,
    /// Sorted descending by fitness, ties by id
    pub entries: Vec<ReportEntry>,
}

impl EpisodeReport {
    pub fn new(end: EpisodeEnd, ticks: u64) -> Self {
        Self {
            end,
            ticks,
            entries: Vec::new(),
        }
    }

    /// Insert keeping rank order; returns the 1-indexed rank
    pub fn insert(&mut self, entry: ReportEntry) -> usize {
        let pos = self
            .entries
            .iter()
            .position(|e| {
                entry.fitness > e.fitness || (entry.fitness == e.fitness && entry.id < e.id)
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        pos + 1
    }

    /// Best entry (if any)
    pub fn best(&self) -> Option<&ReportEntry> {
        self.entries.first()
    }

    /// Result for a given pilot
    pub fn get(&self, id: PilotId) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// 1-indexed rank of a pilot
    pub fn rank_of(&self, id: PilotId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    pub fn mean_fitness(&self) -> Option<f32> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().map(|e| e.fitness).sum::<f32>() / self.entries.len() as f32)
    }

    pub fn survivors(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.survived())
    }

    pub fn reached_cap(&self) -> bool {
        self.end == EpisodeEnd::FitnessCap
    }
}
