use std::{cell::RefCell, rc::Rc};

use crate::tween::tweener::TweenHandle;

#[derive(Default)]
struct ManagerState {
    tasks: Vec<TweenHandle>,
    next_seed: u64,
}

/// Owner of every scheduled task, advanced once per frame by the host.
///
/// Cloning yields another handle to the same schedule.
#[derive(Clone, Default)]
pub struct TweenManager {
    state: Rc<RefCell<ManagerState>>,
}

impl std::fmt::Debug for TweenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenManager")
            .field("live", &self.live_count())
            .finish()
    }
}

impl TweenManager {
    /// Empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, make: impl FnOnce(u64) -> TweenHandle) -> TweenHandle {
        let mut state = self.state.borrow_mut();
        let seed = state.next_seed;
        state.next_seed += 1;
        let handle = make(seed);
        state.tasks.push(handle.clone());
        handle
    }

    /// Interpolate `start` to `end` (1, 2 or 4 components) over `duration` seconds.
    pub fn to(&self, start: &[f64], end: &[f64], duration: f64) -> TweenHandle {
        self.register(|seed| TweenHandle::value_task(start, end, duration, seed))
    }

    /// Decaying random offset within `amplitude`, reset to zero when the shake ends.
    ///
    /// The jitter sequence is derived from the task's creation order, so identical schedules
    /// shake identically.
    pub fn shake(&self, amplitude: f64, duration: f64) -> TweenHandle {
        self.register(|seed| TweenHandle::shake_task(amplitude, duration, seed))
    }

    /// Task that only fires `on_complete` after `seconds`.
    pub fn delayed_call(&self, seconds: f64) -> TweenHandle {
        self.register(|seed| TweenHandle::call_task(seconds, seed))
    }

    /// Advance every live task by `dt` seconds.
    ///
    /// Tasks created by callbacks during this call first run on the next advance. Killed tasks
    /// are dropped afterwards.
    pub fn advance(&self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let snapshot = self.state.borrow().tasks.clone();
        for task in &snapshot {
            task.step(dt);
        }

        let mut dead = Vec::new();
        self.state.borrow_mut().tasks.retain(|task| {
            let alive = task.is_alive();
            if !alive {
                dead.push(task.clone());
            }
            alive
        });
        for task in dead {
            task.release();
        }
    }

    /// Tasks that have not finished or been killed.
    pub fn live_count(&self) -> usize {
        self.state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.is_alive())
            .count()
    }

    /// Kill every live task carrying `tag`.
    pub fn kill_tagged(&self, tag: u64, complete: bool) {
        let tagged: Vec<TweenHandle> = self
            .state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.is_alive() && t.has_tag(tag))
            .cloned()
            .collect();
        for task in tagged {
            task.kill(complete);
        }
    }

    /// `true` when `task` is scheduled here and still alive.
    pub fn contains(&self, task: &TweenHandle) -> bool {
        self.state
            .borrow()
            .tasks
            .iter()
            .any(|t| t.same_task(task) && t.is_alive())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tween/manager.rs"]
mod tests;
