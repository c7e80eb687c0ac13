use crate::anchor::AnchorTable;
use crate::animate::{InputEvent, Scheduler, SmoothScroll};
use crate::error::SyncError;
use crate::render::RenderedBlock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Line → preview position, built from an anchor table and laid out blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionTable {
    entries: Vec<(usize, f64)>,
}

impl PositionTable {
    pub fn new(anchors: &AnchorTable, blocks: &[RenderedBlock]) -> Self {
        let mut entries: Vec<(usize, f64)> = anchors
            .iter()
            .filter_map(|(idx, anchor)| blocks.get(idx).map(|b| (anchor.line, b.center())))
            .collect();
        // Stable sort keeps the first block for a shared line.
        entries.sort_by_key(|(line, _)| *line);
        entries.dedup_by_key(|(line, _)| *line);
        Self { entries }
    }

    pub fn exact(&self, line: usize) -> Result<f64, SyncError> {
        self.entries
            .binary_search_by_key(&line, |(l, _)| *l)
            .map(|idx| self.entries[idx].1)
            .map_err(|_| SyncError::AnchorNotFound { line })
    }

    /// Preview position of `line`: exact anchor, interpolation between the
    /// neighbouring anchors (document bounds stand in for a missing side), or
    /// a proportional guess when nothing is anchored.
    pub fn position_for_line(&self, line: usize, total_lines: usize, viewport: &Viewport) -> f64 {
        if self.entries.is_empty() {
            if total_lines == 0 {
                return 0.0;
            }
            return line as f64 / total_lines as f64 * viewport.content_height;
        }
        if let Ok(pos) = self.exact(line) {
            return pos;
        }
        let split = self.entries.partition_point(|(l, _)| *l < line);
        let prev = split.checked_sub(1).map(|i| self.entries[i]);
        let next = self.entries.get(split).copied();
        let (lo, hi) = match (prev, next) {
            (Some(p), Some(n)) => (p, n),
            (Some(p), None) => {
                if total_lines <= p.0 + 1 {
                    return p.1;
                }
                (p, (total_lines, viewport.content_height.max(p.1)))
            }
            (None, Some(n)) => ((0, 0.0), n),
            (None, None) => return 0.0,
        };
        if hi.0 <= lo.0 {
            return lo.1;
        }
        let t = (line - lo.0) as f64 / (hi.0 - lo.0) as f64;
        lo.1 + (hi.1 - lo.1) * t.min(1.0)
    }

    /// Source line nearest to preview position `pos`. Ties keep the first.
    pub fn line_at(&self, pos: f64, total_lines: usize, viewport: &Viewport) -> Option<usize> {
        if self.entries.is_empty() {
            if total_lines == 0 || viewport.content_height <= 0.0 {
                return None;
            }
            let ratio = (pos / viewport.content_height).clamp(0.0, 1.0);
            let line = (ratio * total_lines as f64).floor() as usize;
            return Some(line.min(total_lines - 1));
        }
        let mut best: Option<(usize, f64)> = None;
        for &(line, entry_pos) in &self.entries {
            let distance = (entry_pos - pos).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((line, distance));
            }
        }
        best.map(|(line, _)| line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn scrollable_height(&self) -> f64 {
        (self.content_height - self.height).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Idle,
    AnimatingToTarget,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    User,
    Programmatic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub throttle: Duration,
    pub suppression: Duration,
    pub echo_window: Duration,
    pub watchdog: Duration,
    pub smoothing: f64,
    pub frame: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(50),
            suppression: Duration::from_millis(500),
            echo_window: Duration::from_millis(500),
            watchdog: Duration::from_millis(3000),
            smoothing: 0.2,
            frame: Duration::from_millis(16),
        }
    }
}

/// Timestamps shared by both sync directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSyncState {
    pub phase: ScrollPhase,
    pub last_outbound: Option<Instant>,
    pub last_inbound: Option<Instant>,
    pub suppressed_until: Option<Instant>,
    pub phase_entered_at: Option<Instant>,
}

impl Default for ScrollSyncState {
    fn default() -> Self {
        Self {
            phase: ScrollPhase::Idle,
            last_outbound: None,
            last_inbound: None,
            suppressed_until: None,
            phase_entered_at: None,
        }
    }
}

impl ScrollSyncState {
    /// An inbound `scrollTo` arriving shortly after our own `revealLine` is
    /// the source echoing us back.
    pub fn admit_inbound(&self, now: Instant, echo_window: Duration) -> bool {
        self.last_outbound
            .is_none_or(|sent| now.saturating_duration_since(sent) >= echo_window)
    }

    pub fn is_outbound_suppressed(&self, now: Instant) -> bool {
        self.phase == ScrollPhase::AnimatingToTarget
            || self.suppressed_until.is_some_and(|until| now < until)
    }

    pub fn note_outbound(&mut self, now: Instant) {
        self.last_outbound = Some(now);
    }

    pub fn enter(&mut self, phase: ScrollPhase, now: Instant) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "scroll sync phase");
        }
        self.phase = phase;
        self.phase_entered_at = match phase {
            ScrollPhase::Idle => None,
            _ => Some(now),
        };
    }

    pub fn check_watchdog(&self, now: Instant, limit: Duration) -> Option<SyncError> {
        let entered = self.phase_entered_at?;
        let elapsed = now.saturating_duration_since(entered);
        (self.phase != ScrollPhase::Idle && elapsed >= limit).then(|| {
            SyncError::AnimationWatchdogTimeout {
                elapsed_ms: elapsed.as_millis(),
            }
        })
    }
}

/// Leading-edge throttle that remembers the latest value offered inside the
/// window and hands it out once the window has passed.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_sent: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
            pending: None,
        }
    }

    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.window_open(now) {
            self.last_sent = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    pub fn flush(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_none() || !self.window_open(now) {
            return None;
        }
        self.last_sent = Some(now);
        self.pending.take()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        self.last_sent.map(|sent| sent + self.interval)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    fn window_open(&self, now: Instant) -> bool {
        self.last_sent
            .is_none_or(|sent| now.saturating_duration_since(sent) >= self.interval)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Poll {
    pub reveal: Option<usize>,
    pub watchdog: Option<SyncError>,
}

/// Scroll sync for one preview view.
pub struct SyncCoordinator {
    state: ScrollSyncState,
    animator: SmoothScroll,
    settings: SyncSettings,
    outbound: Throttle<usize>,
}

impl SyncCoordinator {
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            state: ScrollSyncState::default(),
            animator: SmoothScroll::new(settings.smoothing),
            outbound: Throttle::new(settings.throttle),
            settings,
        }
    }

    pub fn state(&self) -> &ScrollSyncState {
        &self.state
    }

    pub fn offset(&self) -> f64 {
        self.animator.current()
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Handle an inbound `scrollTo`. `Ok(None)` means the message was an echo
    /// of our own `revealLine` and was dropped.
    pub fn on_scroll_to(
        &mut self,
        line: usize,
        total_lines: usize,
        table: &PositionTable,
        viewport: &Viewport,
        now: Instant,
        scheduler: &mut dyn Scheduler,
    ) -> Result<Option<f64>, SyncError> {
        if !self.state.admit_inbound(now, self.settings.echo_window) {
            debug!(line, "dropping scrollTo echo");
            return Ok(None);
        }
        self.state.last_inbound = Some(now);

        let position = table.position_for_line(line, total_lines, viewport);
        let target = position - viewport.height / 2.0;
        if !target.is_finite() {
            return Err(SyncError::InvalidScrollTarget { line, total_lines });
        }
        let target = target.clamp(0.0, viewport.scrollable_height());

        self.animator.animate_to(target, scheduler);
        self.state.enter(ScrollPhase::AnimatingToTarget, now);
        self.state.suppressed_until = Some(now + self.settings.suppression);
        self.outbound.clear();
        debug!(line, total_lines, target, "scrollTo");
        Ok(Some(target))
    }

    /// Handle a scroll of the preview. Returns the line to reveal in the
    /// source, if one should be sent now.
    pub fn on_rendered_scroll(
        &mut self,
        offset: f64,
        origin: ScrollOrigin,
        table: &PositionTable,
        viewport: &Viewport,
        total_lines: usize,
        now: Instant,
    ) -> Option<usize> {
        if origin == ScrollOrigin::Programmatic {
            return None;
        }
        if self.state.is_outbound_suppressed(now) {
            return None;
        }
        self.animator.jump_to(offset);
        let center = offset + viewport.height / 2.0;
        let line = table.line_at(center, total_lines, viewport)?;
        let sent = self.outbound.offer(line, now)?;
        self.state.note_outbound(now);
        debug!(line = sent, "revealLine");
        Some(sent)
    }

    /// Timers: trailing reveals, end of suppression, the watchdog.
    pub fn poll(&mut self, now: Instant, scheduler: &mut dyn Scheduler) -> Poll {
        let mut out = Poll::default();

        if let Some(err) = self.state.check_watchdog(now, self.settings.watchdog) {
            warn!(%err, "scroll sync watchdog fired");
            self.animator.cancel(scheduler);
            self.state.suppressed_until = None;
            self.state.enter(ScrollPhase::Idle, now);
            out.watchdog = Some(err);
        }

        if self.state.suppressed_until.is_some_and(|until| now >= until) {
            self.state.suppressed_until = None;
        }
        if self.state.phase == ScrollPhase::Suppressed && !self.state.is_outbound_suppressed(now) {
            self.state.enter(ScrollPhase::Idle, now);
        }

        if !self.state.is_outbound_suppressed(now) {
            if let Some(line) = self.outbound.flush(now) {
                self.state.note_outbound(now);
                debug!(line, "revealLine (trailing)");
                out.reveal = Some(line);
            }
        }
        out
    }

    /// One animation frame. Returns the new preview offset.
    pub fn tick(&mut self, now: Instant, scheduler: &mut dyn Scheduler) -> Option<f64> {
        let offset = self.animator.tick(scheduler);
        if !self.animator.is_animating() && self.state.phase == ScrollPhase::AnimatingToTarget {
            let next = if self.state.suppressed_until.is_some_and(|until| now < until) {
                ScrollPhase::Suppressed
            } else {
                ScrollPhase::Idle
            };
            debug!(offset = self.animator.target(), "animation settled");
            self.state.enter(next, now);
        }
        offset
    }

    /// Kill switch: any direct user input stops the animation and lifts
    /// suppression.
    pub fn on_user_input(&mut self, event: InputEvent, now: Instant, scheduler: &mut dyn Scheduler) {
        if !event.is_user_initiated() {
            return;
        }
        if self.animator.cancel(scheduler) {
            debug!(kind = ?event.kind, "animation cancelled by user input");
        }
        self.state.suppressed_until = None;
        if self.state.phase != ScrollPhase::Idle {
            self.state.enter(ScrollPhase::Idle, now);
        }
    }

    /// Jump without animating, e.g. after a relayout clamps the offset.
    pub fn set_offset(&mut self, offset: f64) {
        self.animator.jump_to(offset);
    }

    /// Earliest instant at which `poll` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let watchdog = self
            .state
            .phase_entered_at
            .map(|at| at + self.settings.watchdog);
        [self.outbound.next_deadline(), self.state.suppressed_until, watchdog]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn reset(&mut self) {
        self.state = ScrollSyncState::default();
        self.animator.reset();
        self.outbound = Throttle::new(self.settings.throttle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{build_anchors, AnchorSettings};
    use crate::animate::{InputKind, RecordingScheduler};
    use crate::render::{render_markdown, BlockKind};
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    /// Stack blocks top to bottom, `height` rows each with a blank row between.
    fn stacked(blocks: &[RenderedBlock], height: f64) -> Vec<RenderedBlock> {
        blocks
            .iter()
            .enumerate()
            .map(|(i, b)| b.positioned(i as f64 * (height + 1.0), height))
            .collect()
    }

    fn table_for(source: &[String], blocks: &[RenderedBlock]) -> PositionTable {
        let anchors = build_anchors(source, blocks, &AnchorSettings::default());
        PositionTable::new(&anchors, blocks)
    }

    fn ten_paragraphs() -> (Vec<String>, PositionTable) {
        let mut source = Vec::new();
        let mut blocks = Vec::new();
        for i in 0..10 {
            let text = format!("paragraph number {i}");
            source.push(text.clone());
            source.push(String::new());
            blocks.push(RenderedBlock::new(BlockKind::Paragraph, &text));
        }
        let blocks = stacked(&blocks, 9.0);
        let table = table_for(&source, &blocks);
        (source, table)
    }

    #[test]
    fn exact_anchor_uses_block_center() {
        let (_, table) = ten_paragraphs();
        assert_eq!(table.exact(4), Ok(24.5));
        assert_eq!(table.exact(5), Err(SyncError::AnchorNotFound { line: 5 }));
    }

    #[test]
    fn interpolates_between_neighbours() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 20.0,
            content_height: 100.0,
        };
        assert_eq!(table.position_for_line(3, 20, &view), 19.5);
    }

    #[test]
    fn proportional_when_nothing_is_anchored() {
        let table = PositionTable::default();
        let view = Viewport {
            height: 10.0,
            content_height: 200.0,
        };
        assert_eq!(table.position_for_line(25, 100, &view), 50.0);
        assert_eq!(table.line_at(50.0, 100, &view), Some(25));
        assert_eq!(table.line_at(500.0, 100, &view), Some(99));
        assert_eq!(table.line_at(50.0, 0, &view), None);
    }

    #[test]
    fn scroll_target_is_always_clamped() {
        let (_, anchored) = ten_paragraphs();
        let view = Viewport {
            height: 20.0,
            content_height: 100.0,
        };
        let now = Instant::now();
        for table in [&anchored, &PositionTable::default()] {
            for total in [0usize, 1, 7, 20, 1000] {
                for line in [0usize, 1, 5, 19, 20, 50, 10_000] {
                    let mut sched = RecordingScheduler::default();
                    let mut sync = SyncCoordinator::new(SyncSettings::default());
                    let target = sync
                        .on_scroll_to(line, total, table, &view, now, &mut sched)
                        .unwrap()
                        .unwrap();
                    assert!(
                        (0.0..=view.scrollable_height()).contains(&target),
                        "line {line} of {total} gave {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn non_finite_target_is_dropped() {
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let view = Viewport {
            height: 10.0,
            content_height: f64::INFINITY,
        };
        let err = sync
            .on_scroll_to(5, 10, &PositionTable::default(), &view, Instant::now(), &mut sched)
            .unwrap_err();
        assert_eq!(
            err,
            SyncError::InvalidScrollTarget {
                line: 5,
                total_lines: 10
            }
        );
        assert!(!sync.is_animating());
        assert_eq!(sync.state().phase, ScrollPhase::Idle);
        assert_eq!(sched.scheduled, 0);
    }

    #[test]
    fn rapid_scroll_to_keeps_one_animation_on_latest_target() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        let mut last = None;
        for i in 0..10u64 {
            last = sync
                .on_scroll_to(i as usize * 2, 20, &table, &view, start + ms(i * 10), &mut sched)
                .unwrap();
        }
        assert_eq!(sched.scheduled, 1);
        assert_eq!(last, Some(89.5));
        assert_eq!(sync.animator.target(), 89.5);
    }

    #[test]
    fn animation_settles_into_suppressed_then_idle() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        sync.on_scroll_to(8, 20, &table, &view, start, &mut sched).unwrap();

        let mut frame = start;
        while sync.is_animating() {
            frame += ms(16);
            sync.tick(frame, &mut sched);
        }
        assert!(frame < start + ms(500));
        assert_eq!(sync.state().phase, ScrollPhase::Suppressed);

        sync.poll(start + ms(500), &mut sched);
        assert_eq!(sync.state().phase, ScrollPhase::Idle);
        assert_eq!(sync.state().suppressed_until, None);
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn settled_coordinator_has_no_pending_deadline() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        sync.on_scroll_to(12, 20, &table, &view, start, &mut sched).unwrap();

        let mut frame = start;
        while sync.is_animating() {
            frame += ms(16);
            sync.tick(frame, &mut sched);
        }
        sync.poll(start + ms(500), &mut sched);
        sync.poll(start + ms(2000), &mut sched);
        assert_eq!(sync.state().phase, ScrollPhase::Idle);
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn rendered_scroll_is_throttled_with_trailing_send() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        let user = ScrollOrigin::User;

        assert_eq!(sync.on_rendered_scroll(0.0, user, &table, &view, 20, start), Some(0));
        assert_eq!(sync.on_rendered_scroll(10.0, user, &table, &view, 20, start + ms(20)), None);
        assert_eq!(sync.on_rendered_scroll(20.0, user, &table, &view, 20, start + ms(30)), None);
        assert_eq!(sync.next_deadline(), Some(start + ms(50)));
        assert_eq!(sync.poll(start + ms(40), &mut sched).reveal, None);
        assert_eq!(sync.poll(start + ms(50), &mut sched).reveal, Some(4));
        assert_eq!(sync.poll(start + ms(120), &mut sched).reveal, None);
    }

    #[test]
    fn programmatic_scroll_never_arms_the_throttle() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        assert_eq!(
            sync.on_rendered_scroll(30.0, ScrollOrigin::Programmatic, &table, &view, 20, start),
            None
        );
        assert_eq!(
            sync.on_rendered_scroll(30.0, ScrollOrigin::User, &table, &view, 20, start + ms(5)),
            Some(6)
        );
    }

    #[test]
    fn outbound_is_suppressed_until_user_input() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        sync.on_scroll_to(12, 20, &table, &view, start, &mut sched).unwrap();

        let scrolled = start + ms(100);
        assert_eq!(
            sync.on_rendered_scroll(40.0, ScrollOrigin::User, &table, &view, 20, scrolled),
            None
        );

        sync.on_user_input(InputEvent::user(InputKind::Wheel), scrolled, &mut sched);
        assert_eq!(sync.state().phase, ScrollPhase::Idle);
        assert!(!sync.is_animating());
        assert_eq!(sched.cancelled, 1);
        assert_eq!(
            sync.on_rendered_scroll(40.0, ScrollOrigin::User, &table, &view, 20, scrolled),
            Some(8)
        );
    }

    #[test]
    fn inbound_echo_after_reveal_is_dropped() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        let line = sync
            .on_rendered_scroll(50.0, ScrollOrigin::User, &table, &view, 20, start)
            .unwrap();

        let echo = sync.on_scroll_to(line, 20, &table, &view, start + ms(100), &mut sched);
        assert_eq!(echo, Ok(None));
        assert_eq!(sched.scheduled, 0);

        let later = sync.on_scroll_to(2, 20, &table, &view, start + ms(600), &mut sched);
        assert!(matches!(later, Ok(Some(_))));
    }

    #[test]
    fn watchdog_forces_idle() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let start = Instant::now();
        sync.on_scroll_to(18, 20, &table, &view, start, &mut sched).unwrap();

        assert_eq!(sync.poll(start + ms(2999), &mut sched).watchdog, None);
        let fired = sync.poll(start + ms(3000), &mut sched);
        assert_eq!(
            fired.watchdog,
            Some(SyncError::AnimationWatchdogTimeout { elapsed_ms: 3000 })
        );
        assert_eq!(sync.state().phase, ScrollPhase::Idle);
        assert!(!sync.is_animating());
        assert_eq!(sched.cancelled, 1);
        assert_eq!(sync.next_deadline(), None);
    }

    #[test]
    fn reveal_near_highlighted_paragraph_reports_line_two() {
        let source = lines(&["# Title", "", "Some ==highlighted== text."]);
        let rendered = render_markdown(&source.join("\n"));
        assert_eq!(rendered[1].text_content, "Some highlighted text.");
        let blocks = stacked(&rendered, 1.0);
        let table = table_for(&source, &blocks);
        let view = Viewport {
            height: 1.0,
            content_height: 3.0,
        };
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        let line = sync.on_rendered_scroll(2.0, ScrollOrigin::User, &table, &view, 3, Instant::now());
        assert_eq!(line, Some(2));
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let (_, table) = ten_paragraphs();
        let view = Viewport {
            height: 10.0,
            content_height: 100.0,
        };
        let mut sched = RecordingScheduler::default();
        let mut sync = SyncCoordinator::new(SyncSettings::default());
        sync.on_scroll_to(10, 20, &table, &view, Instant::now(), &mut sched).unwrap();
        sync.reset();
        assert_eq!(sync.state(), &ScrollSyncState::default());
        assert_eq!(sync.offset(), 0.0);
        assert!(!sync.is_animating());
    }
}
