//! Serialized animation loop.
//!
//! The [`Animator`] loads the dataset once, prepares the interpolated frame
//! sequence and then walks it one transition at a time:
//! - Idle: nothing loaded yet; a failed load leaves the animator here
//! - Running: one step per frame, each awaited to completion
//! - Finished: the last transition completed (or a sink aborted the run)

pub mod sink;
pub mod transition;

pub use sink::RenderSink;
pub use transition::Transition;

use crate::engine::{accumulate, interpolate_frames, HistoryTracker};
use crate::error::{RaceError, RaceResult};
use crate::models::{Bucket, Entity, RunSummary};
use crate::source::{bucketize, DataSource, Dataset};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Immutable settings for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceConfig {
    /// Number of entities shown at once (top-K).
    pub capacity: usize,
    /// Synthetic sub-frames per pair of consecutive buckets.
    pub frames_per_interval: usize,
    pub transition_duration: Duration,
    /// Width of the drawing area in pixels; only the value scale uses it.
    pub display_width: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            capacity: 12,
            frames_per_interval: 2,
            transition_duration: Duration::from_millis(250),
            display_width: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Idle,
    Running { step: usize, total: usize },
    Finished,
}

/// Cumulative, interpolated frames ready to animate.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub entities: Vec<Entity>,
    /// Number of real date buckets the frames were built from.
    pub buckets: usize,
    pub frames: Vec<Bucket>,
}

/// Accumulate and interpolate a dataset.
pub fn prepare(dataset: Dataset, config: &RaceConfig) -> PreparedRun {
    let Dataset {
        entities,
        mut buckets,
    } = dataset;

    accumulate(&mut buckets, &entities);
    let frames = interpolate_frames(&buckets, &entities, config.frames_per_interval);

    debug!(
        "Prepared {} frames from {} buckets and {} entities",
        frames.len(),
        buckets.len(),
        entities.len()
    );

    PreparedRun {
        entities,
        buckets: buckets.len(),
        frames,
    }
}

pub struct Animator<S: RenderSink> {
    config: RaceConfig,
    sink: S,
    state: AnimatorState,
}

impl<S: RenderSink> Animator<S> {
    pub fn new(config: RaceConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            state: AnimatorState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Load data from `source` and animate it to completion.
    pub async fn start(&mut self, source: &dyn DataSource) -> RaceResult<RunSummary> {
        self.ensure_idle()?;

        info!("Loading data from {}", source.describe());
        let records = source.fetch_records().await?;
        let dataset = bucketize(&records)?;
        info!(
            "Loaded {} records into {} buckets for {} entities",
            records.len(),
            dataset.buckets.len(),
            dataset.entities.len()
        );

        self.run(dataset).await
    }

    /// Animate an already loaded dataset.
    pub async fn run(&mut self, dataset: Dataset) -> RaceResult<RunSummary> {
        self.ensure_idle()?;

        let prepared = prepare(dataset, &self.config);
        self.play_all(prepared).await
    }

    fn ensure_idle(&self) -> RaceResult<()> {
        if self.state != AnimatorState::Idle {
            return Err(RaceError::config("an animator can only be started once"));
        }
        Ok(())
    }

    async fn play_all(&mut self, prepared: PreparedRun) -> RaceResult<RunSummary> {
        let PreparedRun {
            entities,
            buckets,
            frames,
        } = prepared;
        let total = frames.len();

        if frames.is_empty() {
            warn!(
                "Nothing to animate: {} bucket(s) yield no frames (at least two dates are needed)",
                buckets
            );
            self.state = AnimatorState::Finished;
            return Ok(RunSummary {
                buckets,
                frames: 0,
                entities,
                final_ranking: Vec::new(),
            });
        }

        let mut history =
            HistoryTracker::from_frames(entities.clone(), self.config.capacity, &frames);
        info!("Animating {} frames", total);

        for (step, frame) in frames.iter().enumerate() {
            self.state = AnimatorState::Running { step, total };
            history.advance(&frames, step);

            let transition = Transition::new(
                step,
                frame.date,
                self.config.transition_duration,
                history.domain_max(),
            );
            debug!(
                "Step {}/{} ({}), domain max {:.1}",
                step + 1,
                total,
                frame.date.format("%Y-%m-%d"),
                transition.domain.1
            );

            if let Err(e) = self.play_step(&history, &transition).await {
                error!("Render failed at step {}: {}", step, e);
                self.state = AnimatorState::Finished;
                return Err(e);
            }
        }

        self.state = AnimatorState::Finished;
        info!("Animation finished after {} frames", total);

        Ok(RunSummary {
            buckets,
            frames: total,
            entities,
            final_ranking: history.current_ranking().to_vec(),
        })
    }

    /// Issue the four sink updates for one transition and wait for all of
    /// them, and for the transition itself, to complete.
    async fn play_step(
        &self,
        history: &HistoryTracker,
        transition: &Transition,
    ) -> RaceResult<()> {
        let capacity = self.config.capacity;

        futures::try_join!(
            self.sink.update_bars(capacity, history, transition),
            self.sink.update_labels(capacity, history, transition),
            self.sink.update_axis(transition),
            self.sink.update_ticker(transition.date, transition),
        )?;

        transition.end().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::Mutex;

    /// Records every update's start and end, and what the bars saw.
    #[derive(Default)]
    struct MockSink {
        events: Mutex<Vec<(usize, &'static str, &'static str)>>,
        visible: Mutex<Vec<Vec<String>>>,
        domains: Mutex<Vec<f64>>,
        fail_at: Option<usize>,
    }

    impl MockSink {
        async fn work(&self, step: usize, part: &'static str) -> RaceResult<()> {
            self.events.lock().unwrap().push((step, part, "start"));
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            if self.fail_at == Some(step) && part == "axis" {
                return Err(RaceError::render("axis exploded"));
            }
            self.events.lock().unwrap().push((step, part, "end"));
            Ok(())
        }
    }

    #[async_trait]
    impl RenderSink for MockSink {
        async fn update_bars(
            &self,
            _capacity: usize,
            history: &HistoryTracker,
            transition: &Transition,
        ) -> RaceResult<()> {
            self.visible.lock().unwrap().push(
                history
                    .visible()
                    .iter()
                    .map(|e| e.entity.clone())
                    .collect(),
            );
            self.domains.lock().unwrap().push(transition.domain.1);
            self.work(transition.step, "bars").await
        }

        async fn update_labels(
            &self,
            _capacity: usize,
            _history: &HistoryTracker,
            transition: &Transition,
        ) -> RaceResult<()> {
            self.work(transition.step, "labels").await
        }

        async fn update_axis(&self, transition: &Transition) -> RaceResult<()> {
            self.work(transition.step, "axis").await
        }

        async fn update_ticker(
            &self,
            _date: NaiveDateTime,
            transition: &Transition,
        ) -> RaceResult<()> {
            self.work(transition.step, "ticker").await
        }
    }

    /// Fails on load.
    struct BrokenSource;

    #[async_trait]
    impl DataSource for BrokenSource {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        async fn fetch_records(&self) -> RaceResult<Vec<Record>> {
            Err(RaceError::data_source("connection refused"))
        }
    }

    struct StaticSource(Vec<Record>);

    #[async_trait]
    impl DataSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        async fn fetch_records(&self) -> RaceResult<Vec<Record>> {
            Ok(self.0.clone())
        }
    }

    fn record(date: &str, country: &str, value: f64) -> Record {
        Record {
            date: date.to_string(),
            destination_country: country.to_string(),
            value_tonne: Some(value),
        }
    }

    fn records() -> Vec<Record> {
        vec![
            record("2022-03-01", "A", 10.0),
            record("2022-03-01", "B", 3.0),
            record("2022-03-02", "A", 5.0),
            record("2022-03-02", "B", 3.0),
            record("2022-03-03", "A", 0.0),
            record("2022-03-03", "B", 20.0),
        ]
    }

    fn quick_config(capacity: usize) -> RaceConfig {
        RaceConfig {
            capacity,
            frames_per_interval: 2,
            transition_duration: Duration::ZERO,
            display_width: 600,
        }
    }

    #[tokio::test]
    async fn test_transitions_are_serialized() {
        let mut animator = Animator::new(quick_config(12), MockSink::default());
        let summary = animator.start(&StaticSource(records())).await.unwrap();

        assert_eq!(summary.buckets, 3);
        assert_eq!(summary.frames, 4);

        let events = animator.sink().events.lock().unwrap().clone();
        assert_eq!(events.len(), 4 * 4 * 2);

        // No update of step N+1 starts before every update of step N ended.
        for (i, (step, _, kind)) in events.iter().enumerate() {
            if *kind != "start" || *step == 0 {
                continue;
            }
            let ended_before = events[..i]
                .iter()
                .filter(|(s, _, k)| *s == step - 1 && *k == "end")
                .count();
            assert_eq!(ended_before, 4, "step {} started early", step);
        }
    }

    #[tokio::test]
    async fn test_state_machine_and_summary() {
        let mut animator = Animator::new(quick_config(1), MockSink::default());
        assert_eq!(animator.state(), AnimatorState::Idle);

        let summary = animator.start(&StaticSource(records())).await.unwrap();
        assert_eq!(animator.state(), AnimatorState::Finished);
        assert_eq!(summary.entities, vec!["A", "B"]);

        // Cumulative: A 10,15,15 / B 3,6,26. Last frame is halfway 2022-03-02 -> 03.
        let finals: Vec<(&str, f64, usize)> = summary
            .final_ranking
            .iter()
            .map(|e| (e.entity.as_str(), e.value, e.rank))
            .collect();
        assert_eq!(finals, vec![("B", 16.0, 0), ("A", 15.0, 1)]);

        let visible = animator.sink().visible.lock().unwrap().clone();
        assert_eq!(visible, vec![vec!["A"], vec!["A"], vec!["A"], vec!["B"]]);
        let domains = animator.sink().domains.lock().unwrap().clone();
        assert_eq!(domains, vec![10.0, 12.5, 15.0, 16.0]);

        let again = animator.start(&StaticSource(records())).await;
        assert!(matches!(again, Err(RaceError::Config(_))));
    }

    #[tokio::test]
    async fn test_failed_load_stays_idle() {
        let mut animator = Animator::new(quick_config(12), MockSink::default());

        let err = animator.start(&BrokenSource).await.unwrap_err();
        assert!(matches!(err, RaceError::DataSource(_)));
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert!(animator.sink().events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_date_stays_idle() {
        let mut animator = Animator::new(quick_config(12), MockSink::default());
        let source = StaticSource(vec![record("03/01/2022", "A", 1.0)]);

        let err = animator.start(&source).await.unwrap_err();
        assert!(matches!(err, RaceError::DataFormat(_)));
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[tokio::test]
    async fn test_single_bucket_finishes_without_frames() {
        let mut animator = Animator::new(quick_config(12), MockSink::default());
        let source = StaticSource(vec![record("2022-03-01", "A", 1.0)]);

        let summary = animator.start(&source).await.unwrap();
        assert_eq!(summary.buckets, 1);
        assert_eq!(summary.frames, 0);
        assert!(summary.final_ranking.is_empty());
        assert_eq!(animator.state(), AnimatorState::Finished);
        assert!(animator.sink().events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_run() {
        let sink = MockSink {
            fail_at: Some(1),
            ..Default::default()
        };
        let mut animator = Animator::new(quick_config(12), sink);

        let err = animator.start(&StaticSource(records())).await.unwrap_err();
        assert!(matches!(err, RaceError::Render(_)));
        assert_eq!(animator.state(), AnimatorState::Finished);

        let events = animator.sink().events.lock().unwrap().clone();
        assert!(events.iter().all(|(step, _, _)| *step <= 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_step_lasts_the_transition_duration() {
        let config = RaceConfig {
            transition_duration: Duration::from_millis(250),
            ..quick_config(12)
        };
        let mut animator = Animator::new(config, MockSink::default());

        let before = tokio::time::Instant::now();
        animator.start(&StaticSource(records())).await.unwrap();

        assert!(before.elapsed() >= Duration::from_millis(4 * 250));
    }

    #[test]
    fn test_prepare_counts() {
        let dataset = bucketize(&records()).unwrap();
        let prepared = prepare(
            dataset,
            &RaceConfig {
                frames_per_interval: 3,
                ..RaceConfig::default()
            },
        );

        assert_eq!(prepared.buckets, 3);
        assert_eq!(prepared.frames.len(), 6);
        assert_eq!(prepared.frames[3].value("A"), 15.0);
        assert_eq!(prepared.frames[3].value("B"), 6.0);
    }
}
