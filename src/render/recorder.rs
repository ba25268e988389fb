//! Sink that keeps every frame in memory for reports.

use crate::animator::{RenderSink, Transition};
use crate::engine::HistoryTracker;
use crate::error::{RaceError, RaceResult};
use crate::models::RecordedFrame;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<RecordedFrame>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in step order.
    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.frames
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderSink for RecordingSink {
    async fn update_bars(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        let visible = history.visible();
        let frame = RecordedFrame {
            step: transition.step,
            date: transition.date,
            domain_max: transition.domain.1,
            visible: visible[..capacity.min(visible.len())].to_vec(),
        };

        self.frames
            .lock()
            .map_err(|_| RaceError::render("frame recorder lock poisoned"))?
            .push(frame);
        Ok(())
    }

    async fn update_labels(
        &self,
        _capacity: usize,
        _history: &HistoryTracker,
        _transition: &Transition,
    ) -> RaceResult<()> {
        Ok(())
    }

    async fn update_axis(&self, _transition: &Transition) -> RaceResult<()> {
        Ok(())
    }

    async fn update_ticker(
        &self,
        _date: NaiveDateTime,
        _transition: &Transition,
    ) -> RaceResult<()> {
        Ok(())
    }
}
