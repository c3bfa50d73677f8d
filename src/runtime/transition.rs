use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
    sync::Arc,
};

use smallvec::SmallVec;

use crate::{
    foundation::{
        core::{Argb, Point, Vec2, deg_to_rad},
        error::TransitionError,
    },
    path::builder::TweenPath,
    runtime::{
        opts::TransitionOpts,
        set::SetLink,
        target::{SoundPlayer, TransitionOwner, TransitionTarget},
    },
    timeline::model::{ActionKind, TransitionInfo, TransitionItem, TransitionValue},
    tween::{
        manager::TweenManager,
        tweener::{MAX_DIMS, TweenHandle},
    },
};

/// Fired once when a run ends, either naturally or through [`Transition::stop`].
pub type CompleteCallback = Box<dyn FnOnce()>;

/// Fired when a labelled item applies or a tween reaches its end label.
pub type LabelHook = Rc<dyn Fn()>;

/// Side effects that may call back into transitions; run after the state borrow is released.
enum Deferred {
    Sound {
        player: Rc<dyn SoundPlayer>,
        name: String,
        volume: f64,
    },
    PlayNested {
        name: String,
        play_times: i32,
    },
    StopNested {
        transition: Transition,
        complete: bool,
    },
    Hook(LabelHook),
    Complete(CompleteCallback),
}

type Effects = SmallVec<[Deferred; 4]>;

struct TransitionState {
    info: Arc<TransitionInfo>,
    owner: Weak<dyn TransitionOwner>,
    siblings: Option<SetLink>,
    tweens: TweenManager,
    opts: TransitionOpts,
    playing: bool,
    time_scale: f64,
    /// Bumped whenever a run starts or ends; stale completions compare against it.
    generation: u64,
    tasks: Vec<TweenHandle>,
    targets: HashMap<String, Weak<dyn TransitionTarget>>,
    shaking: Vec<(usize, Weak<dyn TransitionTarget>)>,
    path_origins: HashMap<usize, Point>,
    nested: Vec<Transition>,
    on_complete: Option<CompleteCallback>,
    hooks: HashMap<String, LabelHook>,
}

/// Playback runtime for one [`TransitionInfo`] bound to an owner component.
///
/// A `Transition` is either idle or playing. Playing schedules one task per item on the shared
/// [`TweenManager`]; the host drives time through [`TweenManager::advance`]. Clones share the
/// same runtime.
///
/// State lives behind `Rc<RefCell<..>>`, so a `Transition` is neither `Send` nor `Sync`:
/// inspect it (`is_playing`, `time_scale`) from the thread that advances the tweens.
#[derive(Clone)]
pub struct Transition {
    state: Rc<RefCell<TransitionState>>,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_borrow() {
            Ok(st) => f
                .debug_struct("Transition")
                .field("name", &st.info.name())
                .field("playing", &st.playing)
                .field("time_scale", &st.time_scale)
                .field("tasks", &st.tasks.len())
                .finish(),
            Err(_) => f.write_str("Transition(<busy>)"),
        }
    }
}

impl Transition {
    /// Standalone runtime; nested transition items cannot find siblings and are skipped.
    pub fn new(
        info: impl Into<Arc<TransitionInfo>>,
        owner: Weak<dyn TransitionOwner>,
        tweens: TweenManager,
        opts: TransitionOpts,
    ) -> Self {
        Self::with_link(info.into(), owner, tweens, opts, None)
    }

    pub(crate) fn with_link(
        info: Arc<TransitionInfo>,
        owner: Weak<dyn TransitionOwner>,
        tweens: TweenManager,
        opts: TransitionOpts,
        siblings: Option<SetLink>,
    ) -> Self {
        let state = TransitionState {
            info,
            owner,
            siblings,
            tweens,
            opts,
            playing: false,
            time_scale: 1.0,
            generation: 0,
            tasks: Vec::new(),
            targets: HashMap::new(),
            shaking: Vec::new(),
            path_origins: HashMap::new(),
            nested: Vec::new(),
            on_complete: None,
            hooks: HashMap::new(),
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    fn upgrade(weak: &Weak<RefCell<TransitionState>>) -> Option<Self> {
        weak.upgrade().map(|state| Self { state })
    }

    pub(crate) fn same(&self, other: &Transition) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Name of the timeline being played.
    pub fn name(&self) -> String {
        self.state
            .try_borrow()
            .map(|st| st.info.name().to_owned())
            .unwrap_or_default()
    }

    /// The timeline being played.
    pub fn info(&self) -> Arc<TransitionInfo> {
        self.state.borrow().info.clone()
    }

    /// `true` from `play` until the run completes or is stopped.
    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    /// Speed multiplier for this and later runs.
    pub fn time_scale(&self) -> f64 {
        self.state.borrow().time_scale
    }

    /// Start time of the labelled item (or end time of a tween's end label).
    pub fn label_time(&self, label: &str) -> Option<f64> {
        self.state.borrow().info.label_time(label)
    }

    /// Tasks of the current run that have neither finished nor been killed.
    pub fn live_task_count(&self) -> usize {
        self.state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.is_alive())
            .count()
    }

    /// Call `hook` whenever the item labelled `label` applies, or a tween reaches it as its end
    /// label.
    pub fn set_hook(&self, label: impl Into<String>, hook: impl Fn() + 'static) {
        self.state
            .borrow_mut()
            .hooks
            .insert(label.into(), Rc::new(hook));
    }

    /// Remove every label hook.
    pub fn clear_hooks(&self) {
        self.state.borrow_mut().hooks.clear();
    }

    /// Abandon the current run without applying values or firing callbacks.
    pub(crate) fn cancel(&self) {
        match self.state.try_borrow_mut() {
            Ok(mut st) => st.cancel(),
            Err(_) => tracing::warn!("cancel while the transition is dispatching; ignored"),
        }
    }

    /// Swap in a new timeline. Any run in progress is cancelled without callbacks.
    pub fn reset(&self, info: impl Into<Arc<TransitionInfo>>) {
        let Ok(mut st) = self.state.try_borrow_mut() else {
            tracing::warn!("reset while the transition is dispatching; ignored");
            return;
        };
        st.cancel();
        st.info = info.into();
        st.targets.clear();
        st.nested.clear();
    }

    /// Play from the start. `times == 0` uses the stored auto-play count, a negative `delay` the
    /// stored auto-play delay. A run already in progress is cancelled without callbacks.
    #[tracing::instrument(skip(self), fields(transition = %self.name()))]
    pub fn play(&self, times: i32, delay: f64) {
        self.begin(times, delay, None);
    }

    /// [`Transition::play`] with a callback fired when this run completes or is stopped.
    #[tracing::instrument(skip(self, on_complete), fields(transition = %self.name()))]
    pub fn play_with(&self, times: i32, delay: f64, on_complete: impl FnOnce() + 'static) {
        self.begin(times, delay, Some(Box::new(on_complete)));
    }

    fn begin(&self, times: i32, delay: f64, on_complete: Option<CompleteCallback>) {
        let weak = Rc::downgrade(&self.state);
        let Ok(mut st) = self.state.try_borrow_mut() else {
            tracing::warn!("play while the transition is dispatching; ignored");
            return;
        };
        st.cancel();

        let times = if times == 0 {
            st.info.auto_play_times()
        } else {
            times
        };
        if times != 1 {
            let err = TransitionError::unsupported(format!("playing a transition {times} times"));
            tracing::warn!(%err, "playing once");
        }
        let delay = if delay < 0.0 {
            st.info.auto_play_delay()
        } else {
            delay
        };
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };

        st.playing = true;
        st.on_complete = on_complete;

        let info = st.info.clone();
        let tag = owner_tag(&st.owner);
        let mut tasks = Vec::with_capacity(info.items().len() + 1);
        for (index, item) in info.items().iter().enumerate() {
            tasks.push(schedule_item(&st.tweens, &weak, index, item, delay).tag(tag));
        }
        let generation = st.generation;
        let done = weak.clone();
        tasks.push(
            st.tweens
                .delayed_call(delay + info.total_duration())
                .tag(tag)
                .on_complete(move |_| {
                    if let Some(t) = Transition::upgrade(&done) {
                        t.finish_run(generation);
                    }
                }),
        );
        for task in &tasks {
            task.set_time_scale(st.time_scale);
        }
        tracing::debug!(items = info.items().len(), delay, "transition scheduled");
        st.tasks = tasks;
    }

    /// End the run now. With `complete`, every item's final value is applied first. The pending
    /// completion callback fires either way.
    #[tracing::instrument(skip(self), fields(transition = %self.name()))]
    pub fn stop(&self, complete: bool) {
        let mut fx = Effects::new();
        {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                tracing::warn!("stop while the transition is dispatching; skipped");
                return;
            };
            if !st.playing {
                return;
            }
            st.end_run();
            for transition in std::mem::take(&mut st.nested) {
                push_stop(&mut fx, transition, complete);
            }
            if complete {
                st.apply_end_values(&mut fx);
            }
            st.path_origins.clear();
            if let Some(cb) = st.on_complete.take() {
                fx.push(Deferred::Complete(cb));
            }
        }
        self.run_effects(fx);
    }

    /// Scale playback speed of this run and of nested transitions it launched. Negative values
    /// clamp to 0, which freezes progress.
    pub fn set_time_scale(&self, scale: f64) {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        let nested = {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                tracing::warn!("time scale change while the transition is dispatching; skipped");
                return;
            };
            if st.time_scale == scale {
                return;
            }
            st.time_scale = scale;
            if !st.playing {
                return;
            }
            for task in st.tasks.iter().filter(|t| t.is_alive()) {
                task.set_time_scale(scale);
            }
            let info = st.info.clone();
            for item in info.items() {
                if item.kind != ActionKind::Animation {
                    continue;
                }
                if let Some(target) = st.resolve(&item.target_id)
                    && let Some(anim) = target.as_animatable()
                {
                    anim.set_time_scale(scale);
                }
            }
            st.nested.clone()
        };
        for transition in nested {
            if transition.is_playing() {
                transition.set_time_scale(scale);
            }
        }
    }

    /// Trailing task of a run: snap what is still moving, then go idle.
    fn finish_run(&self, generation: u64) {
        let pending: Vec<TweenHandle> = {
            let Ok(st) = self.state.try_borrow() else {
                return;
            };
            st.tasks
                .iter()
                .filter(|t| t.is_alive() && !t.is_infinite())
                .cloned()
                .collect()
        };
        for task in pending {
            task.kill(true);
        }

        let mut fx = Effects::new();
        {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                return;
            };
            // A callback above may have restarted or stopped the run.
            if st.generation != generation || !st.playing {
                return;
            }
            st.end_run();
            st.nested.clear();
            st.path_origins.clear();
            if let Some(cb) = st.on_complete.take() {
                fx.push(Deferred::Complete(cb));
            }
        }
        tracing::debug!(transition = %self.name(), "transition complete");
        self.run_effects(fx);
    }

    fn run_effects(&self, fx: Effects) {
        for effect in fx {
            match effect {
                Deferred::Sound {
                    player,
                    name,
                    volume,
                } => player.play_sound(&name, volume),
                Deferred::PlayNested { name, play_times } => self.play_nested(&name, play_times),
                Deferred::StopNested {
                    transition,
                    complete,
                } => transition.stop(complete),
                Deferred::Hook(hook) => hook(),
                Deferred::Complete(cb) => cb(),
            }
        }
    }

    fn play_nested(&self, name: &str, play_times: i32) {
        let (siblings, scale) = {
            let Ok(st) = self.state.try_borrow() else {
                return;
            };
            if !st.playing {
                return;
            }
            (st.siblings.clone(), st.time_scale)
        };
        let Some(nested) = siblings.and_then(|link| link.find(name)) else {
            tracing::debug!(name, "nested transition not found");
            return;
        };
        if nested.same(self) {
            tracing::warn!(name, "transition nests itself; ignored");
            return;
        }
        nested.set_time_scale(scale);
        nested.play(play_times, 0.0);
        if let Ok(mut st) = self.state.try_borrow_mut()
            && !st.nested.iter().any(|n| n.same(&nested))
        {
            st.nested.push(nested);
        }
    }

    fn apply_item(&self, index: usize) {
        let mut fx = Effects::new();
        {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                return;
            };
            let info = st.info.clone();
            let Some(item) = info.items().get(index) else {
                return;
            };
            st.queue_hook(item.label.as_deref(), &mut fx);
            match (item.kind, item.end_value()) {
                (
                    ActionKind::Sound,
                    TransitionValue::Sound {
                        name: Some(name),
                        volume,
                    },
                ) => {
                    if let Some(player) = &st.opts.sound_player {
                        fx.push(Deferred::Sound {
                            player: player.clone(),
                            name: name.clone(),
                            volume: *volume * st.opts.sound_volume,
                        });
                    }
                }
                (ActionKind::Sound, _) => {}
                (
                    ActionKind::Transition,
                    TransitionValue::Transition {
                        name: Some(name),
                        play_times,
                    },
                ) => fx.push(Deferred::PlayNested {
                    name: name.clone(),
                    play_times: *play_times,
                }),
                (ActionKind::Transition, _) => {}
                (ActionKind::Unknown(tag), _) => {
                    tracing::debug!(tag, "unknown action ignored");
                }
                (kind, value) => {
                    let target = st.resolve(&item.target_id);
                    match target {
                        Some(target) => st.apply_value(kind, value, &*target),
                        None => tracing::trace!(target_id = %item.target_id, "target not found"),
                    }
                }
            }
        }
        self.run_effects(fx);
    }

    fn tween_started(&self, index: usize, task: &TweenHandle) {
        let mut fx = Effects::new();
        {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                return;
            };
            let info = st.info.clone();
            let Some(item) = info.items().get(index) else {
                return;
            };
            st.queue_hook(item.label.as_deref(), &mut fx);
            let Some(tween) = &item.tween else {
                return;
            };
            let target = st.resolve(&item.target_id);
            match target {
                Some(target) if task.has_path() => {
                    let origin = st.path_origin(&tween.start, &*target);
                    st.path_origins.insert(index, origin);
                }
                Some(target) => {
                    if let Some((start, end)) =
                        st.tween_range(item.kind, &tween.start, &tween.end, &*target)
                    {
                        task.set_range(&start, &end);
                    }
                }
                None => tracing::trace!(target_id = %item.target_id, "target not found"),
            }
        }
        self.run_effects(fx);
    }

    fn tween_updated(&self, index: usize, task: &TweenHandle) {
        let Ok(mut st) = self.state.try_borrow_mut() else {
            return;
        };
        let info = st.info.clone();
        let Some(item) = info.items().get(index) else {
            return;
        };
        let Some(target) = st.resolve(&item.target_id) else {
            return;
        };
        let v = task.values();
        match item.kind {
            ActionKind::XY if task.has_path() => {
                let origin = match st.path_origins.get(&index) {
                    Some(origin) => *origin,
                    None => item
                        .tween
                        .as_ref()
                        .map_or(Point::new(target.x(), target.y()), |t| {
                            st.path_origin(&t.start, &*target)
                        }),
                };
                let p = origin + task.point().to_vec2();
                target.set_position(p.x, p.y);
            }
            ActionKind::XY | ActionKind::Size => {
                let percent = item
                    .tween
                    .as_ref()
                    .is_some_and(|t| vector_parts(&t.end).2);
                let (sx, sy) = if percent {
                    st.owner_size()
                } else {
                    (1.0, 1.0)
                };
                if item.kind == ActionKind::XY {
                    target.set_position(v[0] * sx, v[1] * sy);
                } else {
                    target.set_size(v[0] * sx, v[1] * sy);
                }
            }
            ActionKind::Scale => target.set_scale(v[0], v[1]),
            ActionKind::Skew => target.set_skew(v[0], v[1]),
            ActionKind::Alpha => target.set_alpha(v[0]),
            ActionKind::Rotation => target.set_rotation(deg_to_rad(v[0])),
            ActionKind::Color => {
                if let Some(c) = target.as_color() {
                    c.set_color(Argb::from_channels(v).0);
                }
            }
            ActionKind::ColorFilter => {
                if let Some(c) = target.as_color_filter() {
                    c.set_color_filter(v);
                }
            }
            _ => {}
        }
    }

    fn tween_finished(&self, index: usize) {
        let mut fx = Effects::new();
        {
            let Ok(st) = self.state.try_borrow() else {
                return;
            };
            let end_label = st
                .info
                .items()
                .get(index)
                .and_then(|item| item.tween.as_ref())
                .and_then(|t| t.end_label.clone());
            st.queue_hook(end_label.as_deref(), &mut fx);
        }
        self.run_effects(fx);
    }

    fn shake_started(&self, index: usize) {
        let mut fx = Effects::new();
        {
            let Ok(mut st) = self.state.try_borrow_mut() else {
                return;
            };
            let info = st.info.clone();
            let Some(item) = info.items().get(index) else {
                return;
            };
            st.queue_hook(item.label.as_deref(), &mut fx);
            if let Some(target) = st.resolve(&item.target_id)
                && target.as_shake().is_some()
            {
                st.shaking.push((index, Rc::downgrade(&target)));
            }
        }
        self.run_effects(fx);
    }

    fn shake_updated(&self, index: usize, task: &TweenHandle) {
        let Ok(st) = self.state.try_borrow() else {
            return;
        };
        let offset = task.point().to_vec2();
        for (_, target) in st.shaking.iter().filter(|(i, _)| *i == index) {
            if let Some(target) = target.upgrade()
                && let Some(shake) = target.as_shake()
            {
                shake.set_shake_offset(offset);
            }
        }
    }

    fn shake_finished(&self, index: usize) {
        let Ok(mut st) = self.state.try_borrow_mut() else {
            return;
        };
        st.shaking.retain(|(i, target)| {
            if *i != index {
                return true;
            }
            if let Some(target) = target.upgrade()
                && let Some(shake) = target.as_shake()
            {
                shake.set_shake_offset(Vec2::ZERO);
            }
            false
        });
    }
}

fn push_stop(fx: &mut Effects, transition: Transition, complete: bool) {
    let seen = fx.iter().any(|e| match e {
        Deferred::StopNested { transition: t, .. } => t.same(&transition),
        _ => false,
    });
    if !seen {
        fx.push(Deferred::StopNested {
            transition,
            complete,
        });
    }
}

/// Adapt a runtime method into a task callback that holds the runtime weakly.
fn callback(
    weak: &Weak<RefCell<TransitionState>>,
    f: impl Fn(&Transition, &TweenHandle) + 'static,
) -> impl FnMut(&TweenHandle) + 'static {
    let weak = weak.clone();
    move |task: &TweenHandle| {
        if let Some(t) = Transition::upgrade(&weak) {
            f(&t, task);
        }
    }
}

/// Tag shared by every task scheduled on behalf of `owner`, for [`TweenManager::kill_tagged`].
pub(crate) fn owner_tag(owner: &Weak<dyn TransitionOwner>) -> u64 {
    owner.as_ptr().cast::<()>().addr() as u64
}

fn schedule_item(
    tweens: &TweenManager,
    weak: &Weak<RefCell<TransitionState>>,
    index: usize,
    item: &TransitionItem,
    delay: f64,
) -> TweenHandle {
    let at = delay + item.time;

    if item.kind == ActionKind::Shake {
        let (amplitude, duration) = match item.end_value() {
            TransitionValue::Shake {
                amplitude,
                duration,
            } => (*amplitude, *duration),
            _ => (0.0, 0.0),
        };
        return tweens
            .shake(amplitude, duration)
            .delay(at)
            .on_start(callback(weak, move |t, _| t.shake_started(index)))
            .on_update(callback(weak, move |t, task| t.shake_updated(index, task)))
            .on_complete(callback(weak, move |t, _| t.shake_finished(index)));
    }

    if let Some(tween) = &item.tween
        && tween.duration > 0.0
        && item.kind.is_tweenable()
    {
        let zeros = [0.0; MAX_DIMS];
        let dims = item.kind.tween_dims();
        let mut task = tweens
            .to(&zeros[..dims], &zeros[..dims], tween.duration)
            .delay(at)
            .ease(tween.ease)
            .repeat(tween.repeat, tween.yoyo);
        if item.kind == ActionKind::XY
            && let Some(path) = TweenPath::new(&tween.path)
        {
            task = task.path(Rc::new(path));
        }
        return task
            .on_start(callback(weak, move |t, task| t.tween_started(index, task)))
            .on_update(callback(weak, move |t, task| t.tween_updated(index, task)))
            .on_complete(callback(weak, move |t, _| t.tween_finished(index)));
    }

    tweens
        .delayed_call(at)
        .on_complete(callback(weak, move |t, _| t.apply_item(index)))
}

fn vector_parts(value: &TransitionValue) -> (Option<f64>, Option<f64>, bool) {
    match value {
        TransitionValue::Vector { x, y, percent } => (*x, *y, *percent),
        _ => (None, None, false),
    }
}

fn ratio(v: f64, of: f64) -> f64 {
    if of == 0.0 { 0.0 } else { v / of }
}

impl TransitionState {
    fn cancel(&mut self) {
        self.end_run();
        self.on_complete = None;
        self.path_origins.clear();
    }

    /// Kill every task, clear shake offsets and go idle.
    fn end_run(&mut self) {
        self.generation += 1;
        self.playing = false;
        for task in self.tasks.drain(..) {
            task.kill(false);
        }
        for (_, target) in self.shaking.drain(..) {
            if let Some(target) = target.upgrade()
                && let Some(shake) = target.as_shake()
            {
                shake.set_shake_offset(Vec2::ZERO);
            }
        }
    }

    fn queue_hook(&self, label: Option<&str>, fx: &mut Effects) {
        if let Some(hook) = label.and_then(|l| self.hooks.get(l)) {
            fx.push(Deferred::Hook(hook.clone()));
        }
    }

    fn owner_size(&self) -> (f64, f64) {
        self.owner
            .upgrade()
            .map_or((0.0, 0.0), |o| (o.width(), o.height()))
    }

    /// Absolute point a path is laid out from: the tween's start value, with unset components
    /// taken from the target's current position.
    fn path_origin(&self, start: &TransitionValue, target: &dyn TransitionTarget) -> Point {
        let (x, y, percent) = vector_parts(start);
        let (sx, sy) = if percent {
            self.owner_size()
        } else {
            (1.0, 1.0)
        };
        Point::new(
            x.map_or_else(|| target.x(), |v| v * sx),
            y.map_or_else(|| target.y(), |v| v * sy),
        )
    }

    /// Empty id is the owner; otherwise the first child matching by resource id, name or
    /// runtime id. Hits are cached for the lifetime of the timeline.
    fn resolve(&mut self, id: &str) -> Option<Rc<dyn TransitionTarget>> {
        let owner = self.owner.upgrade()?;
        if id.is_empty() {
            let target: Rc<dyn TransitionTarget> = owner;
            return Some(target);
        }
        if let Some(target) = self.targets.get(id).and_then(Weak::upgrade) {
            return Some(target);
        }
        let found = (0..owner.child_count())
            .filter_map(|i| owner.child_at(i))
            .find(|c| c.resource_id() == id || c.name() == id || c.id() == id)?;
        self.targets.insert(id.to_owned(), Rc::downgrade(&found));
        Some(found)
    }

    /// Concrete endpoints for a value tween, filling unset components from the target.
    fn tween_range(
        &self,
        kind: ActionKind,
        start: &TransitionValue,
        end: &TransitionValue,
        target: &dyn TransitionTarget,
    ) -> Option<([f64; MAX_DIMS], [f64; MAX_DIMS])> {
        let mut s = [0.0; MAX_DIMS];
        let mut e = [0.0; MAX_DIMS];
        match kind {
            ActionKind::XY | ActionKind::Size | ActionKind::Skew => {
                let current = match kind {
                    ActionKind::XY => (target.x(), target.y()),
                    ActionKind::Size => (target.width(), target.height()),
                    _ => (target.skew_x(), target.skew_y()),
                };
                let (sx, sy, s_percent) = vector_parts(start);
                let (ex, ey, e_percent) = vector_parts(end);
                let (ow, oh) = self.owner_size();
                // Interpolate in the end value's units.
                let unit = |v: f64, percent: bool, dim: f64| match (percent, e_percent) {
                    (true, false) => v * dim,
                    (false, true) => ratio(v, dim),
                    _ => v,
                };
                s[0] = sx.map_or_else(|| unit(current.0, false, ow), |v| unit(v, s_percent, ow));
                s[1] = sy.map_or_else(|| unit(current.1, false, oh), |v| unit(v, s_percent, oh));
                e[0] = ex.unwrap_or_else(|| unit(current.0, false, ow));
                e[1] = ey.unwrap_or_else(|| unit(current.1, false, oh));
            }
            ActionKind::Scale => {
                let (TransitionValue::Scale { x: sx, y: sy }, TransitionValue::Scale { x: ex, y: ey }) =
                    (start, end)
                else {
                    return None;
                };
                s[..2].copy_from_slice(&[*sx, *sy]);
                e[..2].copy_from_slice(&[*ex, *ey]);
            }
            ActionKind::Alpha | ActionKind::Rotation => {
                let (TransitionValue::Scalar(a), TransitionValue::Scalar(b)) = (start, end) else {
                    return None;
                };
                s[0] = *a;
                e[0] = *b;
            }
            ActionKind::Color => {
                let (TransitionValue::Color(a), TransitionValue::Color(b)) = (start, end) else {
                    return None;
                };
                s = Argb(*a).to_channels();
                e = Argb(*b).to_channels();
            }
            ActionKind::ColorFilter => {
                let (TransitionValue::ColorFilter(a), TransitionValue::ColorFilter(b)) =
                    (start, end)
                else {
                    return None;
                };
                s = *a;
                e = *b;
            }
            _ => return None,
        }
        Some((s, e))
    }

    fn apply_value(&self, kind: ActionKind, value: &TransitionValue, target: &dyn TransitionTarget) {
        match (kind, value) {
            (ActionKind::XY, TransitionValue::Vector { x, y, percent }) => {
                let (sx, sy) = if *percent {
                    self.owner_size()
                } else {
                    (1.0, 1.0)
                };
                target.set_position(
                    x.map_or_else(|| target.x(), |v| v * sx),
                    y.map_or_else(|| target.y(), |v| v * sy),
                );
            }
            (ActionKind::Size, TransitionValue::Vector { x, y, percent }) => {
                let (sx, sy) = if *percent {
                    self.owner_size()
                } else {
                    (1.0, 1.0)
                };
                target.set_size(
                    x.map_or_else(|| target.width(), |v| v * sx),
                    y.map_or_else(|| target.height(), |v| v * sy),
                );
            }
            (ActionKind::Pivot, TransitionValue::Vector { x, y, .. }) => {
                target.set_pivot(x.unwrap_or(target.pivot_x()), y.unwrap_or(target.pivot_y()));
            }
            (ActionKind::Skew, TransitionValue::Vector { x, y, .. }) => {
                target.set_skew(x.unwrap_or(target.skew_x()), y.unwrap_or(target.skew_y()));
            }
            (ActionKind::Scale, TransitionValue::Scale { x, y }) => target.set_scale(*x, *y),
            (ActionKind::Alpha, TransitionValue::Scalar(a)) => target.set_alpha(*a),
            (ActionKind::Rotation, TransitionValue::Scalar(deg)) => {
                target.set_rotation(deg_to_rad(*deg));
            }
            (ActionKind::Color, TransitionValue::Color(c)) => {
                if let Some(t) = target.as_color() {
                    t.set_color(*c);
                }
            }
            (ActionKind::Animation, TransitionValue::Animation { playing, frame }) => {
                if let Some(anim) = target.as_animatable() {
                    if *frame >= 0 {
                        anim.set_frame(*frame);
                    }
                    anim.set_playing(*playing);
                    anim.set_time_scale(self.time_scale);
                }
            }
            (ActionKind::Visible, TransitionValue::Visible(v)) => target.set_visible(*v),
            (ActionKind::ColorFilter, TransitionValue::ColorFilter(f)) => {
                if let Some(t) = target.as_color_filter() {
                    t.set_color_filter(*f);
                }
            }
            (ActionKind::Text, TransitionValue::Text(s)) => {
                if let Some(t) = target.as_text() {
                    t.set_text(s.as_deref().unwrap_or_default());
                }
            }
            (ActionKind::Icon, TransitionValue::Text(s)) => {
                if let Some(t) = target.as_icon() {
                    t.set_icon(s.as_deref().unwrap_or_default());
                }
            }
            (kind, _) => tracing::debug!(?kind, "value does not fit action; ignored"),
        }
    }

    /// Jump every item to its final state, as if the run had played out.
    fn apply_end_values(&mut self, fx: &mut Effects) {
        let info = self.info.clone();
        for (index, item) in info.items().iter().enumerate() {
            match item.kind {
                ActionKind::Sound | ActionKind::Shake | ActionKind::Unknown(_) => {}
                ActionKind::Transition => {
                    if let TransitionValue::Transition {
                        name: Some(name), ..
                    } = item.end_value()
                        && let Some(nested) =
                            self.siblings.as_ref().and_then(|link| link.peek(name))
                    {
                        push_stop(fx, nested, true);
                    }
                }
                kind => {
                    let Some(target) = self.resolve(&item.target_id) else {
                        continue;
                    };
                    let path_end = item
                        .tween
                        .as_ref()
                        .filter(|_| kind == ActionKind::XY)
                        .and_then(|t| Some((t, TweenPath::new(&t.path)?.point_at(1.0))));
                    match path_end {
                        Some((tween, last)) => {
                            let origin = match self.path_origins.get(&index) {
                                Some(origin) => *origin,
                                None => self.path_origin(&tween.start, &*target),
                            };
                            let p = origin + last.to_vec2();
                            target.set_position(p.x, p.y);
                        }
                        None => self.apply_value(kind, item.end_value(), &*target),
                    }
                }
            }
        }

        for (target_id, ms) in animation_play_time(&info) {
            if ms <= 0.0 {
                continue;
            }
            if let Some(target) = self.resolve(&target_id)
                && let Some(anim) = target.as_animatable()
            {
                anim.set_delta_time(anim.delta_time() + ms);
            }
        }
    }
}

/// Milliseconds each animation target spent playing, from its immediate Animation items in
/// time order; an interval still open at the end closes at the total duration.
fn animation_play_time(info: &TransitionInfo) -> Vec<(String, f64)> {
    let mut items: Vec<&TransitionItem> = info
        .items()
        .iter()
        .filter(|i| i.kind == ActionKind::Animation && i.tween.is_none())
        .collect();
    items.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut acc: Vec<(String, Option<f64>, f64)> = Vec::new();
    for item in items {
        let TransitionValue::Animation { playing, .. } = item.value else {
            continue;
        };
        let slot = match acc.iter().position(|(id, ..)| *id == item.target_id) {
            Some(i) => i,
            None => {
                acc.push((item.target_id.clone(), None, 0.0));
                acc.len() - 1
            }
        };
        let (_, open, ms) = &mut acc[slot];
        if playing {
            open.get_or_insert(item.time);
        } else if let Some(since) = open.take() {
            *ms += (item.time - since) * 1000.0;
        }
    }

    let total = info.total_duration();
    acc.into_iter()
        .map(|(id, open, ms)| {
            let tail = open.map_or(0.0, |since| (total - since).max(0.0) * 1000.0);
            (id, ms + tail)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/transition.rs"]
mod tests;
