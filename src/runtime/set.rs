use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    sync::Arc,
};

use crate::{
    foundation::error::{TransitionError, TransitionResult},
    runtime::{
        opts::TransitionOpts,
        target::TransitionOwner,
        transition::{Transition, owner_tag},
    },
    timeline::model::{TransitionInfo, TransitionOptions},
    tween::manager::TweenManager,
};

struct SetEntry {
    info: Arc<TransitionInfo>,
    runtime: Option<Transition>,
}

struct SetState {
    owner: Weak<dyn TransitionOwner>,
    tweens: TweenManager,
    opts: TransitionOpts,
    entries: Vec<SetEntry>,
}

/// Weak back-reference from a runtime to the set that created it, used to find siblings.
#[derive(Clone)]
pub(crate) struct SetLink(Weak<RefCell<SetState>>);

impl SetLink {
    /// Sibling by name, instantiated on first use.
    pub(crate) fn find(&self, name: &str) -> Option<Transition> {
        let shared = self.0.upgrade()?;
        TransitionSet { shared }.get(name)
    }

    /// Sibling by name, only if it was already instantiated.
    pub(crate) fn peek(&self, name: &str) -> Option<Transition> {
        let shared = self.0.upgrade()?;
        let st = shared.try_borrow().ok()?;
        st.entries
            .iter()
            .find(|e| e.info.name() == name)
            .and_then(|e| e.runtime.clone())
    }
}

/// The transitions of one owner component.
///
/// Runtimes are created lazily on first access and reused across plays. Nested transition
/// items find their target transition here by name.
#[derive(Clone)]
pub struct TransitionSet {
    shared: Rc<RefCell<SetState>>,
}

impl std::fmt::Debug for TransitionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSet")
            .field("names", &self.names())
            .finish()
    }
}

impl TransitionSet {
    /// Set over `infos`; no runtime exists until a name is first used.
    pub fn new(
        owner: Weak<dyn TransitionOwner>,
        infos: impl IntoIterator<Item = TransitionInfo>,
        tweens: TweenManager,
        opts: TransitionOpts,
    ) -> Self {
        let entries = infos
            .into_iter()
            .map(|info| SetEntry {
                info: Arc::new(info),
                runtime: None,
            })
            .collect();
        Self {
            shared: Rc::new(RefCell::new(SetState {
                owner,
                tweens,
                opts,
                entries,
            })),
        }
    }

    /// Timeline names in authored order.
    pub fn names(&self) -> Vec<String> {
        self.shared
            .try_borrow()
            .map(|st| st.entries.iter().map(|e| e.info.name().to_owned()).collect())
            .unwrap_or_default()
    }

    /// Runtime for `name`, created on first access.
    pub fn get(&self, name: &str) -> Option<Transition> {
        let link = SetLink(Rc::downgrade(&self.shared));
        let mut st = self.shared.try_borrow_mut().ok()?;
        let SetState {
            owner,
            tweens,
            opts,
            entries,
        } = &mut *st;
        let entry = entries.iter_mut().find(|e| e.info.name() == name)?;
        let runtime = entry.runtime.get_or_insert_with(|| {
            Transition::with_link(
                entry.info.clone(),
                owner.clone(),
                tweens.clone(),
                opts.clone(),
                Some(link),
            )
        });
        Some(runtime.clone())
    }

    /// Play `name`; unknown names are a caller error.
    pub fn play(&self, name: &str, times: i32, delay: f64) -> TransitionResult<()> {
        let runtime = self
            .get(name)
            .ok_or_else(|| TransitionError::validation(format!("no transition named `{name}`")))?;
        runtime.play(times, delay);
        Ok(())
    }

    /// Stop `name` if it has a runtime.
    pub fn stop(&self, name: &str, complete: bool) {
        if let Some(runtime) = self.instantiated().into_iter().find(|t| t.name() == name) {
            runtime.stop(complete);
        }
    }

    /// Stop every instantiated runtime.
    pub fn stop_all(&self, complete: bool) {
        for runtime in self.instantiated() {
            runtime.stop(complete);
        }
    }

    fn instantiated(&self) -> Vec<Transition> {
        self.shared
            .try_borrow()
            .map(|st| st.entries.iter().filter_map(|e| e.runtime.clone()).collect())
            .unwrap_or_default()
    }

    /// Swap in a new set of timelines. Existing runtimes with a matching name are reset and
    /// kept; runtimes whose name disappeared are cancelled and dropped.
    pub fn replace(&self, infos: impl IntoIterator<Item = TransitionInfo>) {
        let (kept, dropped) = {
            let Ok(mut st) = self.shared.try_borrow_mut() else {
                tracing::warn!("transition set replaced while in use; ignored");
                return;
            };
            let mut old = std::mem::take(&mut st.entries);
            let mut kept = Vec::new();
            for info in infos {
                let info = Arc::new(info);
                let runtime = old
                    .iter()
                    .position(|e| e.info.name() == info.name())
                    .and_then(|i| old.remove(i).runtime);
                if let Some(runtime) = &runtime {
                    kept.push((runtime.clone(), info.clone()));
                }
                st.entries.push(SetEntry { info, runtime });
            }
            let dropped: Vec<Transition> = old.into_iter().filter_map(|e| e.runtime).collect();
            (kept, dropped)
        };
        for (runtime, info) in kept {
            runtime.reset(info);
        }
        for runtime in dropped {
            runtime.cancel();
        }
    }

    /// The owner is being destroyed: cancel every runtime without callbacks and kill whatever
    /// the owner still has scheduled. Tasks of a runtime that is mid-dispatch are caught by the
    /// owner tag.
    pub fn dispose(&self) {
        for runtime in self.instantiated() {
            runtime.cancel();
        }
        let Ok(st) = self.shared.try_borrow() else {
            return;
        };
        st.tweens.kill_tagged(owner_tag(&st.owner), false);
    }

    /// The owner entered the display tree: start auto-play transitions that are idle.
    pub fn on_added(&self) {
        let auto: Vec<(String, i32, f64)> = self
            .shared
            .try_borrow()
            .map(|st| {
                st.entries
                    .iter()
                    .filter(|e| e.info.auto_play())
                    .map(|e| {
                        let info = &e.info;
                        (
                            info.name().to_owned(),
                            info.auto_play_times(),
                            info.auto_play_delay(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        for (name, times, delay) in auto {
            if let Some(runtime) = self.get(&name)
                && !runtime.is_playing()
            {
                runtime.play(times, delay);
            }
        }
    }

    /// The owner left the display tree: stop what is playing unless its options say otherwise.
    pub fn on_removed(&self) {
        for runtime in self.instantiated() {
            if !runtime.is_playing() {
                continue;
            }
            let options = runtime.info().options();
            if options.contains(TransitionOptions::AUTO_STOP_DISABLED) {
                continue;
            }
            runtime.stop(options.contains(TransitionOptions::AUTO_STOP_AT_END));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/set.rs"]
mod tests;
