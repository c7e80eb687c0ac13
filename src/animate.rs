/// Requests animation frames from the host. `schedule` asks for one more
/// call to `SmoothScroll::tick`; `cancel` withdraws any pending request.
pub trait Scheduler {
    fn schedule(&mut self);
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PointerDown,
    Wheel,
    TouchStart,
    KeyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    User,
    Programmatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub origin: InputOrigin,
}

impl InputEvent {
    pub fn user(kind: InputKind) -> Self {
        Self {
            kind,
            origin: InputOrigin::User,
        }
    }

    pub fn is_user_initiated(&self) -> bool {
        self.origin == InputOrigin::User
    }
}

/// Exponential smoothing toward a target offset, one step per frame.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    current: f64,
    target: f64,
    animating: bool,
    cancelled: bool,
    factor: f64,
}

impl SmoothScroll {
    pub fn new(factor: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            animating: false,
            cancelled: false,
            factor: factor.clamp(0.01, 1.0),
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Retarget the animation. A running animation keeps its frame request,
    /// so repeated calls never queue more than one.
    pub fn animate_to(&mut self, target: f64, scheduler: &mut dyn Scheduler) {
        self.target = target;
        self.cancelled = false;
        if !self.animating {
            self.animating = true;
            scheduler.schedule();
        }
    }

    /// Advance one frame. Returns the new offset, or `None` when there is
    /// nothing to animate.
    pub fn tick(&mut self, scheduler: &mut dyn Scheduler) -> Option<f64> {
        if self.cancelled || !self.animating {
            self.animating = false;
            return None;
        }
        let next = self.current + (self.target - self.current) * self.factor;
        if (self.target - next).abs() < 1.0 {
            self.current = self.target;
            self.animating = false;
        } else {
            self.current = next;
            scheduler.schedule();
        }
        Some(self.current)
    }

    /// Stop where we are. The target collapses onto the current offset so a
    /// later tick cannot drift further.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) -> bool {
        let was_animating = self.animating;
        self.target = self.current;
        self.animating = false;
        self.cancelled = true;
        if was_animating {
            scheduler.cancel();
        }
        was_animating
    }

    /// The user moved the view directly.
    pub fn jump_to(&mut self, offset: f64) {
        self.current = offset;
        self.target = offset;
        self.animating = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.factor);
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    pub scheduled: usize,
    pub cancelled: usize,
}

#[cfg(test)]
impl Scheduler for RecordingScheduler {
    fn schedule(&mut self) {
        self.scheduled += 1;
    }

    fn cancel(&mut self) {
        self.cancelled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(anim: &mut SmoothScroll, sched: &mut RecordingScheduler) -> Vec<f64> {
        let mut frames = Vec::new();
        while let Some(offset) = anim.tick(sched) {
            frames.push(offset);
            assert!(frames.len() < 200, "animation did not settle");
        }
        frames
    }

    #[test]
    fn converges_and_snaps_to_target() {
        let mut sched = RecordingScheduler::default();
        let mut anim = SmoothScroll::new(0.2);
        anim.animate_to(100.0, &mut sched);
        let frames = run_to_end(&mut anim, &mut sched);

        assert_eq!(frames[0], 20.0);
        assert!(frames.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*frames.last().unwrap(), 100.0);
        assert_eq!(anim.current(), 100.0);
        assert!(!anim.is_animating());
        assert_eq!(sched.scheduled, frames.len());
    }

    #[test]
    fn retarget_keeps_single_frame_request() {
        let mut sched = RecordingScheduler::default();
        let mut anim = SmoothScroll::new(0.2);
        for target in 1..=10 {
            anim.animate_to(target as f64 * 10.0, &mut sched);
        }
        assert_eq!(sched.scheduled, 1);
        assert_eq!(anim.target(), 100.0);
    }

    #[test]
    fn cancel_freezes_offset() {
        let mut sched = RecordingScheduler::default();
        let mut anim = SmoothScroll::new(0.5);
        anim.animate_to(100.0, &mut sched);
        anim.tick(&mut sched);
        assert!(anim.cancel(&mut sched));

        assert_eq!(anim.target(), anim.current());
        assert_eq!(anim.tick(&mut sched), None);
        assert_eq!(anim.current(), 50.0);
        assert_eq!(sched.cancelled, 1);
    }

    #[test]
    fn cancel_when_idle_does_not_touch_scheduler() {
        let mut sched = RecordingScheduler::default();
        let mut anim = SmoothScroll::new(0.2);
        assert!(!anim.cancel(&mut sched));
        assert_eq!(sched.cancelled, 0);
    }

    #[test]
    fn small_distance_snaps_immediately() {
        let mut sched = RecordingScheduler::default();
        let mut anim = SmoothScroll::new(0.2);
        anim.jump_to(10.0);
        anim.animate_to(10.5, &mut sched);
        assert_eq!(anim.tick(&mut sched), Some(10.5));
        assert!(!anim.is_animating());
    }

    #[test]
    fn programmatic_events_are_not_user_input() {
        let synthetic = InputEvent {
            kind: InputKind::Wheel,
            origin: InputOrigin::Programmatic,
        };
        assert!(!synthetic.is_user_initiated());
        assert!(InputEvent::user(InputKind::KeyDown).is_user_initiated());
    }
}
