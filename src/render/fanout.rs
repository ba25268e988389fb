//! Sink that forwards each update to several sinks at once.

use crate::animator::{RenderSink, Transition};
use crate::engine::HistoryTracker;
use crate::error::RaceResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::future::try_join_all;

#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl FanoutSink {
    #[cfg(test)]
    pub fn new(sinks: Vec<Box<dyn RenderSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl RenderSink for FanoutSink {
    async fn update_bars(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        try_join_all(
            self.sinks
                .iter()
                .map(|sink| sink.update_bars(capacity, history, transition)),
        )
        .await?;
        Ok(())
    }

    async fn update_labels(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        try_join_all(
            self.sinks
                .iter()
                .map(|sink| sink.update_labels(capacity, history, transition)),
        )
        .await?;
        Ok(())
    }

    async fn update_axis(&self, transition: &Transition) -> RaceResult<()> {
        try_join_all(self.sinks.iter().map(|sink| sink.update_axis(transition))).await?;
        Ok(())
    }

    async fn update_ticker(
        &self,
        date: NaiveDateTime,
        transition: &Transition,
    ) -> RaceResult<()> {
        try_join_all(
            self.sinks
                .iter()
                .map(|sink| sink.update_ticker(date, transition)),
        )
        .await?;
        Ok(())
    }
}
