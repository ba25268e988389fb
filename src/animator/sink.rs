//! Rendering sink interface.

use crate::animator::transition::Transition;
use crate::engine::HistoryTracker;
use crate::error::RaceResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Receiver of per-step render updates.
///
/// Every method resolves when its share of the transition is done. The
/// animator awaits all four before it touches the history again, so the
/// `history` borrow is stable for the whole call.
#[async_trait]
pub trait RenderSink: Send + Sync {
    async fn update_bars(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()>;

    async fn update_labels(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()>;

    async fn update_axis(&self, transition: &Transition) -> RaceResult<()>;

    async fn update_ticker(&self, date: NaiveDateTime, transition: &Transition) -> RaceResult<()>;
}

#[async_trait]
impl<T: RenderSink + ?Sized> RenderSink for Arc<T> {
    async fn update_bars(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        (**self).update_bars(capacity, history, transition).await
    }

    async fn update_labels(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        (**self).update_labels(capacity, history, transition).await
    }

    async fn update_axis(&self, transition: &Transition) -> RaceResult<()> {
        (**self).update_axis(transition).await
    }

    async fn update_ticker(&self, date: NaiveDateTime, transition: &Transition) -> RaceResult<()> {
        (**self).update_ticker(date, transition).await
    }
}
