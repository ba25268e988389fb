//! Terminal rendering sink.
//!
//! Bars, labels and the axis stage their tweens as soon as a transition
//! starts. The ticker then redraws the chart at a fixed frame interval
//! until the transition ends, moving every bar from its previous rank and
//! value to its current one. Drawing goes through a ratatui inline
//! viewport, so the chart stays in place below the shell prompt.

use crate::animator::{RenderSink, Transition};
use crate::engine::history::{HistoryTracker, TweenKind};
use crate::error::{RaceError, RaceResult};
use crate::render::format::{entity_rgb, format_date, format_number};
use crate::render::scale::ValueScale;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::collections::HashMap;
use std::io::Stdout;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Display pixels per terminal column.
const PIXELS_PER_COLUMN: f64 = 8.0;
const MAX_LABEL_WIDTH: usize = 24;
const BAR_GLYPH: char = '█';
/// Redraw interval while a transition runs.
const FRAME_INTERVAL: Duration = Duration::from_millis(40);

/// One bar's movement during the current transition.
#[derive(Debug, Clone)]
struct BarTween {
    entity: String,
    kind: TweenKind,
    from_rank: f64,
    to_rank: f64,
    from_value: f64,
    to_value: f64,
}

#[derive(Debug, Default)]
struct Staged {
    capacity: usize,
    bars: Vec<BarTween>,
    /// Value label tweens by entity.
    labels: HashMap<String, (f64, f64)>,
    /// Axis domain maximum, from the previous transition's to this one's.
    domain: Option<(f64, f64)>,
}

/// A bar as drawn at one instant.
#[derive(Debug, Clone)]
struct Row {
    entity: String,
    position: f64,
    columns: usize,
    entering: bool,
    label: Option<f64>,
}

struct Screen<B: Backend> {
    terminal: Terminal<B>,
    cleared: bool,
}

pub struct TerminalSink<B: Backend> {
    scale: ValueScale,
    color: bool,
    staged: Mutex<Staged>,
    screen: Mutex<Screen<B>>,
}

impl TerminalSink<CrosstermBackend<Stdout>> {
    /// Draw to stdout in an inline viewport tall enough for `capacity` bars,
    /// the axis and the ticker.
    pub fn stdout(display_width: u32, capacity: usize, color: bool) -> RaceResult<Self> {
        let height = u16::try_from(capacity + 2).unwrap_or(u16::MAX);
        let terminal = Terminal::with_options(
            CrosstermBackend::new(std::io::stdout()),
            TerminalOptions {
                viewport: Viewport::Inline(height),
            },
        )?;
        Ok(Self::new(terminal, display_width, color))
    }
}

impl<B: Backend> TerminalSink<B> {
    pub fn new(terminal: Terminal<B>, display_width: u32, color: bool) -> Self {
        Self {
            scale: ValueScale::new(f64::from(display_width)),
            color,
            staged: Mutex::new(Staged::default()),
            screen: Mutex::new(Screen {
                terminal,
                cleared: false,
            }),
        }
    }

    fn columns(&self, pixels: f64) -> usize {
        (pixels / PIXELS_PER_COLUMN).round().max(0.0) as usize
    }

    fn staged(&self) -> RaceResult<MutexGuard<'_, Staged>> {
        self.staged
            .lock()
            .map_err(|_| RaceError::render("terminal frame buffer poisoned"))
    }

    fn bar_style(&self, entity: &str) -> Style {
        if !self.color {
            return Style::default();
        }
        let (r, g, b) = entity_rgb(entity);
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Bars on chart at `now`, top row first, and the axis maximum.
    fn rows_at(&self, staged: &Staged, transition: &Transition, now: Instant) -> (Vec<Row>, f64) {
        let finished = transition.progress_at(now) >= 1.0;
        let target = transition.domain.1;
        let (from_domain, to_domain) = staged.domain.unwrap_or((target, target));
        let domain_max = transition.tween_at(from_domain, to_domain, now);
        let max_columns = self.columns(self.scale.width);

        let mut rows: Vec<Row> = staged
            .bars
            .iter()
            .filter(|bar| !(finished && bar.kind == TweenKind::Exiting))
            .map(|bar| {
                let value = transition.tween_at(bar.from_value, bar.to_value, now);
                Row {
                    entity: bar.entity.clone(),
                    position: transition.tween_at(bar.from_rank, bar.to_rank, now),
                    columns: self
                        .columns(self.scale.extent(value, domain_max))
                        .min(max_columns),
                    entering: bar.kind == TweenKind::Entering,
                    label: staged
                        .labels
                        .get(&bar.entity)
                        .map(|(from, to)| transition.tween_at(*from, *to, now)),
                }
            })
            .filter(|row| row.position < staged.capacity as f64)
            .collect();

        rows.sort_by(|a, b| a.position.total_cmp(&b.position));
        rows.truncate(staged.capacity);
        (rows, domain_max)
    }

    /// Lay out the chart at `now` under `date`.
    fn lines_at(
        &self,
        staged: &Staged,
        date: &NaiveDateTime,
        transition: &Transition,
        now: Instant,
    ) -> Vec<Line<'static>> {
        let (rows, domain_max) = self.rows_at(staged, transition, now);
        let label_width = rows
            .iter()
            .map(|row| row.entity.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL_WIDTH);
        let gutter = " ".repeat(label_width + 1);

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(Line::from(format!("{}{}", gutter, self.axis_line(domain_max))));

        for row in &rows {
            let name: String = row.entity.chars().take(label_width).collect();
            let marker = if row.entering { '+' } else { ' ' };
            let bar: String = std::iter::repeat(BAR_GLYPH).take(row.columns).collect();
            let value = row.label.map(format_number).unwrap_or_default();

            lines.push(Line::from(vec![
                Span::raw(format!("{:>width$}{}", name, marker, width = label_width)),
                Span::styled(bar, self.bar_style(&row.entity)),
                Span::raw(format!(" {}", value)),
            ]));
        }

        let total_width = label_width + 1 + self.columns(self.scale.width);
        lines.push(Line::from(format!(
            "{:>width$}",
            format_date(date),
            width = total_width
        )));
        lines
    }

    /// Tick labels placed over their column, the first (zero) one dropped.
    fn axis_line(&self, domain_max: f64) -> String {
        let width = self.columns(self.scale.width);
        let mut line: Vec<char> = vec![' '; width];

        for tick in self.scale.ticks(domain_max).into_iter().skip(1) {
            let label: Vec<char> = format_number(tick).chars().collect();
            let center = self.columns(self.scale.x(tick, domain_max));
            if label.len() > width {
                continue;
            }
            let start = center
                .saturating_sub(label.len() / 2)
                .min(width - label.len());
            line[start..start + label.len()].copy_from_slice(&label);
        }

        line.into_iter().collect::<String>().trim_end().to_string()
    }

    fn draw_at(
        &self,
        date: &NaiveDateTime,
        transition: &Transition,
        now: Instant,
    ) -> RaceResult<()> {
        let lines = {
            let staged = self.staged()?;
            self.lines_at(&staged, date, transition, now)
        };

        let mut screen = self
            .screen
            .lock()
            .map_err(|_| RaceError::render("terminal poisoned"))?;
        if !screen.cleared {
            screen.terminal.clear()?;
            screen.cleared = true;
        }
        screen
            .terminal
            .draw(|frame| frame.render_widget(Paragraph::new(lines), frame.area()))?;
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalSink<B> {
    fn drop(&mut self) {
        let Ok(screen) = self.screen.get_mut() else {
            return;
        };
        // Park the cursor on the chart's last row so later output follows it.
        let bottom = screen.terminal.get_frame().area().bottom().saturating_sub(1);
        let _ = screen.terminal.set_cursor_position((0, bottom));
        let _ = screen.terminal.show_cursor();
    }
}

#[async_trait]
impl<B: Backend + Send> RenderSink for TerminalSink<B> {
    async fn update_bars(
        &self,
        capacity: usize,
        history: &HistoryTracker,
        _transition: &Transition,
    ) -> RaceResult<()> {
        let bars: Vec<BarTween> = history
            .tweens()
            .into_iter()
            .map(|tween| BarTween {
                entity: tween.to.entity.clone(),
                kind: tween.kind,
                from_rank: tween.from.rank as f64,
                to_rank: tween.to.rank as f64,
                from_value: tween.from.value,
                to_value: tween.to.value,
            })
            .collect();

        let mut staged = self.staged()?;
        staged.capacity = capacity;
        staged.bars = bars;
        Ok(())
    }

    async fn update_labels(
        &self,
        _capacity: usize,
        history: &HistoryTracker,
        _transition: &Transition,
    ) -> RaceResult<()> {
        let labels: HashMap<String, (f64, f64)> = history
            .tweens()
            .into_iter()
            .map(|tween| (tween.to.entity.clone(), (tween.from.value, tween.to.value)))
            .collect();

        self.staged()?.labels = labels;
        Ok(())
    }

    async fn update_axis(&self, transition: &Transition) -> RaceResult<()> {
        let target = transition.domain.1;
        let mut staged = self.staged()?;
        let from = staged.domain.map_or(target, |(_, previous)| previous);
        staged.domain = Some((from, target));
        Ok(())
    }

    async fn update_ticker(
        &self,
        date: NaiveDateTime,
        transition: &Transition,
    ) -> RaceResult<()> {
        let deadline = transition.deadline();
        loop {
            let now = Instant::now();
            self.draw_at(&date, transition, now)?;
            if now >= deadline {
                return Ok(());
            }
            tokio::time::sleep_until((now + FRAME_INTERVAL).min(deadline)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bucket;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn frame(values: &[(&str, f64)]) -> Bucket {
        let mut b = Bucket::new(date());
        for (k, v) in values {
            b.values.insert(k.to_string(), *v);
        }
        b
    }

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn test_sink(display_width: u32, cols: u16, rows: u16) -> TerminalSink<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(cols, rows)).unwrap();
        TerminalSink::new(terminal, display_width, false)
    }

    /// Screen rows as text, trailing blanks trimmed.
    fn screen(sink: &TerminalSink<TestBackend>) -> Vec<String> {
        let screen = sink.screen.lock().unwrap();
        let buffer = screen.terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut lines: Vec<String> = buffer
            .content
            .chunks(width)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    }

    fn bar_len(line: &str) -> usize {
        line.chars().filter(|c| *c == BAR_GLYPH).count()
    }

    async fn render_step(
        sink: &TerminalSink<TestBackend>,
        history: &HistoryTracker,
        capacity: usize,
        transition: &Transition,
    ) {
        futures::try_join!(
            sink.update_bars(capacity, history, transition),
            sink.update_labels(capacity, history, transition),
            sink.update_axis(transition),
            sink.update_ticker(transition.date, transition),
        )
        .unwrap();
    }

    fn instant(step: usize, history: &HistoryTracker) -> Transition {
        Transition::new(step, date(), Duration::ZERO, history.domain_max())
    }

    #[tokio::test]
    async fn test_draws_visible_rows_in_rank_order() {
        let frames = vec![frame(&[
            ("Germany", 1200.0),
            ("China", 2400.0),
            ("Egypt", 10.0),
        ])];
        let mut history =
            HistoryTracker::from_frames(entities(&["Germany", "China", "Egypt"]), 2, &frames);
        history.advance(&frames, 0);

        let sink = test_sink(400, 80, 4);
        render_step(&sink, &history, 2, &instant(0, &history)).await;

        let lines = screen(&sink);

        // axis, two bars, ticker
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("2,000"));
        assert!(lines[1].starts_with("  China"));
        assert!(lines[1].ends_with("2,400"));
        assert!(lines[2].starts_with("Germany"));
        assert!(lines[2].ends_with("1,200"));
        assert!(!lines.iter().any(|line| line.contains("Egypt")));
        assert!(lines[3].trim_start().starts_with("2022-03-01"));

        assert_eq!(bar_len(&lines[1]), 49);
        assert_eq!(bar_len(&lines[2]), 25);
    }

    #[tokio::test]
    async fn test_entering_rows_are_marked() {
        let frames = vec![
            frame(&[("A", 5.0), ("B", 1.0)]),
            frame(&[("A", 5.0), ("B", 9.0)]),
        ];
        let mut history = HistoryTracker::from_frames(entities(&["A", "B"]), 1, &frames);
        history.advance(&frames, 0);
        history.advance(&frames, 1);

        let sink = test_sink(160, 40, 3);
        render_step(&sink, &history, 1, &instant(1, &history)).await;

        let lines = screen(&sink);
        assert!(lines[1].starts_with("B+"));
        assert!(!lines.iter().any(|line| line.contains('A')));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redraws_intermediate_states() {
        let frames = vec![
            frame(&[("A", 4.0), ("B", 0.0)]),
            frame(&[("A", 4.0), ("B", 8.0)]),
        ];
        let mut history = HistoryTracker::from_frames(entities(&["A", "B"]), 2, &frames);
        let sink = test_sink(800, 120, 4);

        history.advance(&frames, 0);
        render_step(&sink, &history, 2, &instant(0, &history)).await;
        let before = screen(&sink);
        assert!(before[1].starts_with("A"));
        assert_eq!(bar_len(&before[1]), 99);

        history.advance(&frames, 1);
        let transition =
            Transition::new(1, date(), Duration::from_millis(400), history.domain_max());
        let peek = async {
            tokio::time::sleep(Duration::from_millis(110)).await;
            screen(&sink)
        };
        let ((), mid) = tokio::join!(render_step(&sink, &history, 2, &transition), peek);

        // B climbs from 0 toward 8 while the axis grows from 4 toward 8.
        assert!(mid[1].starts_with("A"));
        assert!(mid[2].starts_with("B"));
        let (a, b) = (bar_len(&mid[1]), bar_len(&mid[2]));
        assert!(a > 50 && a < 99, "A bar at {a} columns");
        assert!(b > 0 && b < 99, "B bar at {b} columns");
        assert!(!mid[2].ends_with(" 8"));

        let after = screen(&sink);
        assert!(after[1].starts_with("B"));
        assert_eq!(bar_len(&after[1]), 99);
        assert_eq!(bar_len(&after[2]), 50);
        assert!(after[1].ends_with(" 8"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exiting_rows_leave_by_the_end() {
        let frames = vec![
            frame(&[("A", 5.0), ("B", 1.0)]),
            frame(&[("A", 5.0), ("B", 9.0)]),
        ];
        let mut history = HistoryTracker::from_frames(entities(&["A", "B"]), 1, &frames);
        history.advance(&frames, 0);
        history.advance(&frames, 1);

        let sink = test_sink(160, 40, 3);
        let transition =
            Transition::new(1, date(), Duration::from_millis(400), history.domain_max());
        let peek = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            screen(&sink)
        };
        let ((), early) = tokio::join!(render_step(&sink, &history, 1, &transition), peek);

        assert!(early[1].starts_with("A"));
        assert!(screen(&sink)[1].starts_with("B+"));
    }

    #[test]
    fn test_bar_style_uses_entity_colour() {
        let terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        let sink = TerminalSink::new(terminal, 160, true);
        assert_eq!(sink.bar_style("a"), Style::default().fg(Color::Rgb(97, 0, 0)));

        assert_eq!(test_sink(160, 10, 3).bar_style("a"), Style::default());
    }

    #[test]
    fn test_axis_drops_zero_tick() {
        let sink = test_sink(640, 80, 3);
        let axis = sink.axis_line(100.0);

        assert!(!axis.trim_start().starts_with('0'));
        assert!(axis.contains("20"));
        assert!(axis.ends_with("100"));
    }
}
