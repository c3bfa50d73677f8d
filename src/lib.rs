//! Timeline transitions for UI components.
//!
//! A transition is an authored timeline of items, each acting on one child of an owner
//! component (or the owner itself): move, resize, fade, tint, shake, play a sound, start a
//! nested transition, and so on. This crate covers the three stages between authoring and
//! pixels:
//!
//! 1. **Decode**: a binary package block becomes an immutable [`TransitionInfo`]
//!    ([`decode_transition`]). Decoding never fails; damaged items fall back to defaults.
//! 2. **Path**: tweened moves may follow a [`TweenPath`] built from [`PathPoint`]s mixing
//!    straight lines, quadratic and cubic Bezier curves and Catmull-Rom splines.
//! 3. **Play**: a [`Transition`] schedules one task per item on a shared [`TweenManager`] and
//!    drives host objects through the [`TransitionTarget`] trait family.
//!
//! The host owns time: it calls [`TweenManager::advance`] once per frame. Everything runs on
//! that one thread; handles are `Rc`-based and not `Send`.
//!
//! # Getting started
//!
//! ```no_run
//! use std::rc::Rc;
//! use ui_transition::{TransitionOpts, TransitionOwner, TransitionSet, TweenManager};
//!
//! fn play(owner: Rc<dyn TransitionOwner>, infos: Vec<ui_transition::TransitionInfo>) {
//!     let tweens = TweenManager::new();
//!     let set = TransitionSet::new(Rc::downgrade(&owner), infos, tweens.clone(), TransitionOpts::default());
//!     set.play("intro", 1, 0.0).ok();
//!     for _ in 0..60 {
//!         tweens.advance(1.0 / 60.0);
//!     }
//! }
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation {
    pub(crate) mod buffer;
    pub(crate) mod core;
    pub(crate) mod error;
    pub(crate) mod math;
}

mod animation {
    pub(crate) mod ease;
}

mod timeline {
    pub(crate) mod decode;
    pub(crate) mod model;
}

mod path {
    pub(crate) mod builder;
}

mod tween {
    pub(crate) mod manager;
    pub(crate) mod tweener;
}

mod runtime {
    pub(crate) mod opts;
    pub(crate) mod set;
    pub(crate) mod target;
    pub(crate) mod transition;
}

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;

pub use animation::ease::Ease;
pub use foundation::buffer::{ByteBuffer, ByteWriter, NULL_STRING_LEN};
pub use foundation::core::{Argb, Point, Vec2, deg_to_rad, rad_to_deg};
pub use foundation::error::{TransitionError, TransitionResult};
pub use path::builder::{CurveType, PathPoint, TweenPath};
pub use runtime::opts::TransitionOpts;
pub use runtime::set::TransitionSet;
pub use runtime::target::{
    AnimatableTarget, ColorFilterTarget, ColorTarget, IconTarget, ShakeTarget, SoundPlayer,
    TextTarget, TransitionOwner, TransitionTarget,
};
pub use runtime::transition::{CompleteCallback, LabelHook, Transition};
pub use timeline::decode::{ChildLookup, decode_transition, decode_transition_list, encode_transition};
pub use timeline::model::{
    ActionKind, TransitionInfo, TransitionItem, TransitionOptions, TransitionTween,
    TransitionValue,
};
pub use tween::manager::TweenManager;
pub use tween::tweener::{MAX_DIMS, TweenCallback, TweenHandle};
