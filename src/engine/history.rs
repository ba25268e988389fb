//! Per-entity {prev, current, next} history for tweening.
//!
//! The animator owns the only [`HistoryTracker`] of a run and advances it
//! once per frame, between transitions. Sinks only ever see it through a
//! shared reference.

use crate::engine::ranker::rank;
use crate::models::{Bucket, Entity, HistoryEntry, RankedEntry};
use std::collections::HashMap;

/// How an entity moves during one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenKind {
    /// Off-chart before, visible now; starts from its `prev` state.
    Entering,
    /// Visible before and now.
    Continuing,
    /// Visible before, off-chart now; heads toward its `next` state.
    Exiting,
}

/// Start and end state of one entity's transition.
#[derive(Debug, Clone, Copy)]
pub struct Tween<'a> {
    pub kind: TweenKind,
    pub from: &'a RankedEntry,
    pub to: &'a RankedEntry,
}

pub struct HistoryTracker {
    capacity: usize,
    entities: Vec<Entity>,
    prev: Vec<RankedEntry>,
    current: Vec<RankedEntry>,
    next: Vec<RankedEntry>,
    entries: HashMap<Entity, HistoryEntry>,
    /// Index of the frame `current` was ranked from.
    step: Option<usize>,
}

impl HistoryTracker {
    /// Start from the first ranking, used as prev, current and next.
    pub fn new(entities: Vec<Entity>, capacity: usize, initial: Vec<RankedEntry>) -> Self {
        let mut tracker = Self {
            capacity,
            entities,
            prev: initial.clone(),
            current: initial.clone(),
            next: initial,
            entries: HashMap::new(),
            step: None,
        };
        tracker.rebuild_entries();
        tracker
    }

    /// Rank `frames[0]` and start from it.
    pub fn from_frames(entities: Vec<Entity>, capacity: usize, frames: &[Bucket]) -> Self {
        let initial = frames
            .first()
            .map(|frame| rank(frame, &entities, capacity))
            .unwrap_or_default();
        Self::new(entities, capacity, initial)
    }

    /// Move to frame `index`: prev takes the old current, current is
    /// `frames[index]` ranked, next is `frames[index + 1]` ranked (the last
    /// frame is its own successor).
    pub fn advance(&mut self, frames: &[Bucket], index: usize) {
        let Some(last) = frames.len().checked_sub(1) else {
            return;
        };
        let index = index.min(last);

        let current = match self.step {
            // The previous step already ranked this frame as its successor.
            Some(step) if step + 1 == index || (step == last && index == last) => {
                std::mem::take(&mut self.next)
            }
            _ => rank(&frames[index], &self.entities, self.capacity),
        };
        let next = rank(&frames[(index + 1).min(last)], &self.entities, self.capacity);

        self.prev = std::mem::replace(&mut self.current, current);
        self.next = next;
        self.step = Some(index);
        self.rebuild_entries();
    }

    fn rebuild_entries(&mut self) {
        let prev = by_entity(&self.prev);
        let current = by_entity(&self.current);
        let next = by_entity(&self.next);

        let mut entries = HashMap::with_capacity(self.entities.len());
        for entity in &self.entities {
            let (Some(p), Some(c), Some(n)) = (
                prev.get(entity.as_str()),
                current.get(entity.as_str()),
                next.get(entity.as_str()),
            ) else {
                continue;
            };
            entries.insert(
                entity.clone(),
                HistoryEntry {
                    prev: (*p).clone(),
                    current: (*c).clone(),
                    next: (*n).clone(),
                },
            );
        }
        self.entries = entries;
    }

    pub fn get(&self, entity: &str) -> Option<&HistoryEntry> {
        self.entries.get(entity)
    }

    /// Index of the frame currently shown, `None` before the first advance.
    #[cfg(test)]
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    #[cfg(test)]
    pub fn prev_ranking(&self) -> &[RankedEntry] {
        &self.prev
    }

    pub fn current_ranking(&self) -> &[RankedEntry] {
        &self.current
    }

    #[cfg(test)]
    pub fn next_ranking(&self) -> &[RankedEntry] {
        &self.next
    }

    /// Top-K slice of the current ranking.
    pub fn visible(&self) -> &[RankedEntry] {
        &self.current[..self.capacity.min(self.current.len())]
    }

    /// Upper bound of the value axis: the largest visible value.
    pub fn domain_max(&self) -> f64 {
        self.visible()
            .iter()
            .map(|e| e.value)
            .fold(0.0, f64::max)
    }

    /// Transitions for everything on-chart before or after this step,
    /// visible entities first (in rank order), then exiting ones.
    pub fn tweens(&self) -> Vec<Tween<'_>> {
        let on_chart = |entry: &RankedEntry| entry.rank < self.capacity;

        let mut tweens: Vec<Tween<'_>> = self
            .visible()
            .iter()
            .filter_map(|entry| self.get(&entry.entity))
            .map(|h| Tween {
                kind: if on_chart(&h.prev) {
                    TweenKind::Continuing
                } else {
                    TweenKind::Entering
                },
                from: &h.prev,
                to: &h.current,
            })
            .collect();

        tweens.extend(
            self.prev
                .iter()
                .filter(|entry| entry.rank < self.capacity)
                .filter_map(|entry| self.get(&entry.entity))
                .filter(|h| !on_chart(&h.current))
                .map(|h| Tween {
                    kind: TweenKind::Exiting,
                    from: &h.prev,
                    to: &h.next,
                }),
        );

        tweens
    }
}

fn by_entity(ranking: &[RankedEntry]) -> HashMap<&str, &RankedEntry> {
    ranking.iter().map(|e| (e.entity.as_str(), e)).collect()
}
