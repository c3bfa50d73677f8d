use std::{cell::RefCell, rc::Rc};

use crate::{
    animation::ease::Ease,
    foundation::{
        core::{Point, Vec2},
        math::jitter_in_disc,
    },
    path::builder::TweenPath,
};

/// Maximum number of interpolated components.
pub const MAX_DIMS: usize = 4;

/// Callback fired by a task; receives the task so it can read values or adjust the range.
pub type TweenCallback = Box<dyn FnMut(&TweenHandle)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TaskKind {
    Value,
    Shake,
    Call,
}

#[derive(Clone, Copy)]
enum Slot {
    Start,
    Update,
    Complete,
}

pub(crate) struct Tweener {
    kind: TaskKind,
    dims: usize,
    start: [f64; MAX_DIMS],
    end: [f64; MAX_DIMS],
    value: [f64; MAX_DIMS],
    delta: [f64; MAX_DIMS],
    duration: f64,
    delay: f64,
    elapsed: f64,
    ease: Ease,
    repeat: i32,
    yoyo: bool,
    time_scale: f64,
    path: Option<Rc<TweenPath>>,
    tag: Option<u64>,
    seed: u64,
    shake_step: u64,
    amplitude: f64,
    started: bool,
    killed: bool,
    on_start: Option<TweenCallback>,
    on_update: Option<TweenCallback>,
    on_complete: Option<TweenCallback>,
}

impl Tweener {
    fn new(kind: TaskKind, duration: f64, seed: u64) -> Self {
        Self {
            kind,
            dims: 0,
            start: [0.0; MAX_DIMS],
            end: [0.0; MAX_DIMS],
            value: [0.0; MAX_DIMS],
            delta: [0.0; MAX_DIMS],
            duration: sanitize(duration),
            delay: 0.0,
            elapsed: 0.0,
            ease: Ease::Linear,
            repeat: 0,
            yoyo: false,
            time_scale: 1.0,
            path: None,
            tag: None,
            seed,
            shake_step: 0,
            amplitude: 0.0,
            started: false,
            killed: false,
            on_start: None,
            on_update: None,
            on_complete: None,
        }
    }

    fn slot(&mut self, slot: Slot) -> &mut Option<TweenCallback> {
        match slot {
            Slot::Start => &mut self.on_start,
            Slot::Update => &mut self.on_update,
            Slot::Complete => &mut self.on_complete,
        }
    }

    /// Linear progress through the current cycle and whether the task has run out.
    fn progress(&self) -> (f64, bool) {
        let t = (self.elapsed - self.delay).max(0.0);
        if self.duration <= 0.0 {
            return (1.0, true);
        }
        if self.repeat == 0 {
            return ((t / self.duration).min(1.0), t >= self.duration);
        }

        let cycles = if self.repeat > 0 {
            Some(f64::from(self.repeat) + 1.0)
        } else {
            None
        };
        if let Some(cycles) = cycles
            && t >= self.duration * cycles
        {
            let reversed = self.yoyo && self.repeat % 2 == 1;
            return (if reversed { 0.0 } else { 1.0 }, true);
        }

        let cycle = (t / self.duration).floor();
        let local = (t - cycle * self.duration) / self.duration;
        let reversed = self.yoyo && cycle % 2.0 == 1.0;
        (if reversed { 1.0 - local } else { local }, false)
    }

    /// Recompute `value` and `delta` for linear cycle progress `linear`.
    fn apply_ratio(&mut self, linear: f64, ended: bool) {
        let previous = self.value;
        match self.kind {
            TaskKind::Value => {
                let eased = self.ease.apply(linear);
                if let Some(path) = &self.path {
                    let p = path.point_at(eased);
                    self.value[0] = p.x;
                    self.value[1] = p.y;
                } else {
                    for i in 0..self.dims {
                        self.value[i] = self.start[i] + (self.end[i] - self.start[i]) * eased;
                    }
                }
            }
            TaskKind::Shake => {
                let offset = if ended {
                    Vec2::ZERO
                } else {
                    self.shake_step += 1;
                    let radius = self.amplitude * (1.0 - linear);
                    jitter_in_disc(self.seed, self.shake_step, radius)
                };
                self.value[0] = offset.x;
                self.value[1] = offset.y;
            }
            TaskKind::Call => {}
        }
        for i in 0..MAX_DIMS {
            self.delta[i] = self.value[i] - previous[i];
        }
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Shared handle to one scheduled task.
///
/// Handles are cheap clones of the same task. The manager keeps one; callers keep theirs to
/// adjust or kill the task later. Builder methods consume and return the handle so a task can
/// be configured in one expression.
#[derive(Clone)]
pub struct TweenHandle(Rc<RefCell<Tweener>>);

impl std::fmt::Debug for TweenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(t) => f
                .debug_struct("TweenHandle")
                .field("kind", &t.kind)
                .field("elapsed", &t.elapsed)
                .field("killed", &t.killed)
                .finish(),
            Err(_) => f.write_str("TweenHandle(<busy>)"),
        }
    }
}

impl TweenHandle {
    pub(crate) fn value_task(start: &[f64], end: &[f64], duration: f64, seed: u64) -> Self {
        let mut t = Tweener::new(TaskKind::Value, duration, seed);
        t.dims = start.len().min(end.len()).min(MAX_DIMS);
        t.start[..t.dims].copy_from_slice(&start[..t.dims]);
        t.end[..t.dims].copy_from_slice(&end[..t.dims]);
        t.value = t.start;
        Self(Rc::new(RefCell::new(t)))
    }

    pub(crate) fn shake_task(amplitude: f64, duration: f64, seed: u64) -> Self {
        let mut t = Tweener::new(TaskKind::Shake, duration, seed);
        t.dims = 2;
        t.amplitude = if amplitude.is_finite() { amplitude } else { 0.0 };
        Self(Rc::new(RefCell::new(t)))
    }

    pub(crate) fn call_task(delay: f64, seed: u64) -> Self {
        let mut t = Tweener::new(TaskKind::Call, 0.0, seed);
        t.delay = sanitize(delay);
        Self(Rc::new(RefCell::new(t)))
    }

    /// Wait `seconds` before starting.
    pub fn delay(self, seconds: f64) -> Self {
        self.0.borrow_mut().delay = sanitize(seconds);
        self
    }

    /// Curve applied to each cycle.
    pub fn ease(self, ease: Ease) -> Self {
        self.0.borrow_mut().ease = ease;
        self
    }

    /// Extra cycles after the first (`-1` forever); `yoyo` reverses every other cycle.
    pub fn repeat(self, count: i32, yoyo: bool) -> Self {
        {
            let mut t = self.0.borrow_mut();
            t.repeat = count.max(-1);
            t.yoyo = yoyo;
        }
        self
    }

    /// Interpolate along `path` instead of the start/end range; the value becomes the
    /// path-local point.
    pub fn path(self, path: Rc<TweenPath>) -> Self {
        {
            let mut t = self.0.borrow_mut();
            t.dims = 2;
            let first = path.point_at(0.0);
            t.value[0] = first.x;
            t.value[1] = first.y;
            t.path = Some(path);
        }
        self
    }

    /// Group key for [`crate::TweenManager::kill_tagged`].
    pub fn tag(self, tag: u64) -> Self {
        self.0.borrow_mut().tag = Some(tag);
        self
    }

    /// Builder form of [`Self::set_time_scale`].
    pub fn with_time_scale(self, scale: f64) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Runs once when the delay has elapsed.
    pub fn on_start(self, f: impl FnMut(&TweenHandle) + 'static) -> Self {
        self.0.borrow_mut().on_start = Some(Box::new(f));
        self
    }

    /// Runs after every value change.
    pub fn on_update(self, f: impl FnMut(&TweenHandle) + 'static) -> Self {
        self.0.borrow_mut().on_update = Some(Box::new(f));
        self
    }

    /// Runs once when the task ends or is killed with `complete`.
    pub fn on_complete(self, f: impl FnMut(&TweenHandle) + 'static) -> Self {
        self.0.borrow_mut().on_complete = Some(Box::new(f));
        self
    }

    /// Current value of component `i` (0 when out of range).
    pub fn value(&self, i: usize) -> f64 {
        self.0.borrow().value.get(i).copied().unwrap_or_default()
    }

    /// All components; unused ones are 0.
    pub fn values(&self) -> [f64; MAX_DIMS] {
        self.0.borrow().value
    }

    /// First two components as a point; for path tweens, the path-local position.
    pub fn point(&self) -> Point {
        let v = self.0.borrow().value;
        Point::new(v[0], v[1])
    }

    /// Value at progress 0.
    pub fn start_value(&self) -> [f64; MAX_DIMS] {
        self.0.borrow().start
    }

    /// Value at progress 1.
    pub fn end_value(&self) -> [f64; MAX_DIMS] {
        self.0.borrow().end
    }

    /// Change since the previous update.
    pub fn delta_value(&self) -> [f64; MAX_DIMS] {
        self.0.borrow().delta
    }

    /// Replace both endpoints; typically called from `on_start` once the live value is known.
    pub fn set_range(&self, start: &[f64], end: &[f64]) {
        let mut t = self.0.borrow_mut();
        let n = t.dims.min(start.len()).min(end.len());
        t.start[..n].copy_from_slice(&start[..n]);
        t.end[..n].copy_from_slice(&end[..n]);
        if t.path.is_none() {
            t.value = t.start;
        }
    }

    /// Negative or non-finite scales clamp to 0, which freezes the task.
    pub fn set_time_scale(&self, scale: f64) {
        self.0.borrow_mut().time_scale = sanitize(scale);
    }

    /// Speed multiplier.
    pub fn time_scale(&self) -> f64 {
        self.0.borrow().time_scale
    }

    /// `true` for tweens moving along a [`TweenPath`].
    pub fn has_path(&self) -> bool {
        self.0.borrow().path.is_some()
    }

    /// Seconds per cycle.
    pub fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    pub(crate) fn has_tag(&self, tag: u64) -> bool {
        self.0.borrow().tag == Some(tag)
    }

    /// `true` once the start delay has elapsed and `on_start` ran.
    pub fn is_started(&self) -> bool {
        self.0.borrow().started
    }

    /// `false` once the task ended or was killed.
    pub fn is_alive(&self) -> bool {
        !self.0.borrow().killed
    }

    /// Finite tasks end on their own; infinite repeats only end through [`Self::kill`].
    pub fn is_infinite(&self) -> bool {
        let t = self.0.borrow();
        t.repeat < 0 && t.duration > 0.0
    }

    pub(crate) fn same_task(&self, other: &TweenHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Stop the task. With `complete`, it first jumps to its final value and fires its
    /// remaining callbacks.
    pub fn kill(&self, complete: bool) {
        if !self.is_alive() {
            return;
        }
        if !complete {
            self.0.borrow_mut().killed = true;
            return;
        }

        let needs_start = {
            let mut t = self.0.borrow_mut();
            let needs = !t.started;
            t.started = true;
            // Jump to the end of the last finite cycle.
            let cycles = if t.repeat > 0 {
                f64::from(t.repeat) + 1.0
            } else {
                1.0
            };
            t.elapsed = t.delay + t.duration * cycles;
            needs
        };
        if needs_start {
            self.fire(Slot::Start);
        }
        if !self.is_alive() {
            return;
        }
        self.finish();
    }

    fn finish(&self) {
        {
            let mut t = self.0.borrow_mut();
            let reversed = t.yoyo && t.repeat > 0 && t.repeat % 2 == 1;
            t.apply_ratio(if reversed { 0.0 } else { 1.0 }, true);
        }
        self.fire(Slot::Update);
        if !self.is_alive() {
            return;
        }
        self.0.borrow_mut().killed = true;
        self.fire(Slot::Complete);
    }

    /// Advance by `dt` unscaled seconds.
    pub(crate) fn step(&self, dt: f64) {
        let first_start = {
            let mut t = self.0.borrow_mut();
            if t.killed {
                return;
            }
            t.elapsed += dt * t.time_scale;
            if t.elapsed < t.delay {
                return;
            }
            let first = !t.started;
            t.started = true;
            first
        };

        if first_start {
            self.fire(Slot::Start);
            if !self.is_alive() {
                return;
            }
        }

        let (linear, ended) = self.0.borrow().progress();
        if ended {
            self.finish();
            return;
        }
        self.0.borrow_mut().apply_ratio(linear, false);
        self.fire(Slot::Update);
    }

    /// Run a callback without holding the borrow, then put it back unless it was replaced or
    /// the task died meanwhile.
    fn fire(&self, slot: Slot) {
        let Some(mut callback) = self.0.borrow_mut().slot(slot).take() else {
            return;
        };
        callback(self);
        let mut t = self.0.borrow_mut();
        if t.killed {
            return;
        }
        let target = t.slot(slot);
        if target.is_none() {
            *target = Some(callback);
        }
    }

    /// Drop callbacks of a dead task so captured state is released.
    pub(crate) fn release(&self) {
        let mut t = self.0.borrow_mut();
        t.on_start = None;
        t.on_update = None;
        t.on_complete = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tween/tweener.rs"]
mod tests;
