use std::cell::Cell;

use super::*;
use crate::{
    path::builder::PathPoint,
    test_support::{Node, approx, owner_of},
    timeline::model::TransitionTween,
};

fn setup(items: Vec<TransitionItem>) -> (Rc<Node>, Rc<Node>, TweenManager, Transition) {
    let owner = Node::new("owner");
    let child = owner.add(Node::at("a", 5.0, 5.0));
    let tweens = TweenManager::new();
    let t = Transition::new(
        TransitionInfo::new("t", items),
        owner_of(&owner),
        tweens.clone(),
        TransitionOpts::default(),
    );
    (owner, child, tweens, t)
}

fn alpha_tween(time: f64, duration: f64) -> TransitionItem {
    TransitionItem::tweened(
        time,
        ActionKind::Alpha,
        TransitionTween::new(duration, TransitionValue::Scalar(0.0), TransitionValue::Scalar(1.0)),
    )
    .with_target("a")
}

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    (hits, move || h.set(h.get() + 1))
}

#[test]
fn path_move_is_relative_to_start_and_snaps_to_end() {
    let path = vec![
        PathPoint::straight((0.0, 0.0)),
        PathPoint::straight((20.0, 10.0)),
    ];
    let item = TransitionItem::tweened(
        0.0,
        ActionKind::XY,
        TransitionTween::new(1.0, TransitionValue::current(), TransitionValue::current())
            .with_path(path),
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);

    t.play(1, 0.0);
    tweens.advance(0.5);
    let (x, y) = child.pos.get();
    assert!((x - 15.0).abs() < 1e-3 && (y - 10.0).abs() < 1e-3, "{x},{y}");
    assert!(t.is_playing());

    tweens.advance(0.6);
    assert!(!t.is_playing());
    assert_eq!(child.pos.get(), (25.0, 15.0));
}

#[test]
fn stop_complete_settles_animation_targets() {
    let items = vec![
        TransitionItem::new(
            0.0,
            ActionKind::Animation,
            TransitionValue::Animation {
                playing: true,
                frame: 0,
            },
        )
        .with_target("a"),
        TransitionItem::new(
            0.3,
            ActionKind::Animation,
            TransitionValue::Animation {
                playing: false,
                frame: 6,
            },
        )
        .with_target("a"),
    ];
    let (_owner, child, _tweens, t) = setup(items);
    child.delta_ms.set(40.0);

    t.play(1, 0.0);
    t.stop(true);
    assert!(!child.playing.get());
    assert_eq!(child.frame.get(), 6);
    assert!(approx(child.delta_ms.get(), 340.0));
}

#[test]
fn open_animation_interval_closes_at_total_duration() {
    let items = vec![
        TransitionItem::new(
            0.5,
            ActionKind::Animation,
            TransitionValue::Animation {
                playing: true,
                frame: -1,
            },
        )
        .with_target("a"),
        alpha_tween(0.0, 2.0),
    ];
    let info = TransitionInfo::new("t", items);
    let times = animation_play_time(&info);
    assert_eq!(times.len(), 1);
    assert_eq!(times[0].0, "a");
    assert!(approx(times[0].1, 1500.0));
}

#[test]
fn time_scale_reaches_tasks_and_animations_immediately() {
    let items = vec![
        TransitionItem::new(
            0.0,
            ActionKind::Animation,
            TransitionValue::Animation {
                playing: true,
                frame: -1,
            },
        )
        .with_target("a"),
        alpha_tween(0.0, 1.0),
    ];
    let (_owner, child, tweens, t) = setup(items);
    t.play(1, 0.0);
    t.set_time_scale(0.5);

    assert_eq!(t.time_scale(), 0.5);
    assert_eq!(child.anim_scale.get(), 0.5);
    let st = t.state.borrow();
    assert!(!st.tasks.is_empty());
    assert!(st.tasks.iter().all(|task| task.time_scale() == 0.5));
    drop(st);

    tweens.advance(1.0);
    assert!(approx(child.alpha.get(), 0.5));
    assert!(t.is_playing());
}

#[test]
fn negative_time_scale_freezes() {
    let (_owner, child, tweens, t) = setup(vec![alpha_tween(0.0, 1.0)]);
    t.play(1, 0.0);
    tweens.advance(0.25);
    t.set_time_scale(-2.0);
    assert_eq!(t.time_scale(), 0.0);
    tweens.advance(5.0);
    assert!(approx(child.alpha.get(), 0.25));
    assert!(t.is_playing());
}

#[test]
fn shake_leaves_position_untouched() {
    let item = TransitionItem::new(
        0.0,
        ActionKind::Shake,
        TransitionValue::Shake {
            amplitude: 4.0,
            duration: 0.5,
        },
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);

    t.play(1, 0.0);
    tweens.advance(0.1);
    assert_ne!(child.shake.get(), Vec2::ZERO);
    assert_eq!(child.pos.get(), (5.0, 5.0));

    tweens.advance(0.5);
    assert_eq!(child.shake.get(), Vec2::ZERO);
    assert_eq!(child.pos.get(), (5.0, 5.0));
    assert!(!t.is_playing());
}

#[test]
fn stop_mid_shake_resets_offset() {
    let item = TransitionItem::new(
        0.0,
        ActionKind::Shake,
        TransitionValue::Shake {
            amplitude: 4.0,
            duration: 2.0,
        },
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);

    t.play(1, 0.0);
    tweens.advance(0.3);
    assert_ne!(child.shake.get(), Vec2::ZERO);
    t.stop(false);
    assert_eq!(child.shake.get(), Vec2::ZERO);
    assert_eq!(tweens.live_count(), 0);
}

#[test]
fn playing_spans_delay_plus_total_duration() {
    let (_owner, _child, tweens, t) = setup(vec![alpha_tween(0.5, 0.5)]);
    assert!(!t.is_playing());
    t.play(1, 0.25);
    assert!(t.is_playing());
    tweens.advance(1.0);
    assert!(t.is_playing());
    tweens.advance(0.3);
    assert!(!t.is_playing());
    assert_eq!(t.live_task_count(), 0);
}

#[test]
fn negative_delay_uses_auto_play_delay() {
    let owner = Node::new("owner");
    owner.add(Node::at("a", 0.0, 0.0));
    let tweens = TweenManager::new();
    let info = TransitionInfo::new("t", vec![alpha_tween(0.0, 0.5)]).with_auto_play(1, 1.0);
    let t = Transition::new(info, owner_of(&owner), tweens.clone(), TransitionOpts::default());
    t.play(1, -1.0);
    tweens.advance(1.25);
    assert!(t.is_playing());
    tweens.advance(0.5);
    assert!(!t.is_playing());
}

#[test]
fn stop_kills_every_task_and_fires_completion() {
    let (_owner, child, tweens, t) = setup(vec![alpha_tween(0.0, 1.0), alpha_tween(2.0, 1.0)]);
    let (done, on_done) = counter();
    t.play_with(1, 0.0, on_done);
    tweens.advance(0.5);
    t.stop(false);
    assert!(!t.is_playing());
    assert_eq!(tweens.live_count(), 0);
    assert_eq!(done.get(), 1);
    assert!(approx(child.alpha.get(), 0.5));

    t.stop(true);
    assert_eq!(done.get(), 1);
}

#[test]
fn stop_complete_applies_final_values() {
    let items = vec![
        alpha_tween(0.0, 1.0),
        TransitionItem::new(0.5, ActionKind::Rotation, TransitionValue::Scalar(90.0)).with_target("a"),
        TransitionItem::new(0.5, ActionKind::Visible, TransitionValue::Visible(false)).with_target("a"),
        TransitionItem::new(0.6, ActionKind::Text, TransitionValue::Text(None)).with_target("a"),
    ];
    let (_owner, child, _tweens, t) = setup(items);
    t.play(1, 0.0);
    t.stop(true);
    assert_eq!(child.alpha.get(), 1.0);
    assert!(approx(child.rotation.get(), std::f64::consts::FRAC_PI_2));
    assert!(!child.visible.get());
    assert_eq!(child.text.borrow().as_deref(), Some(""));
}

#[test]
fn replay_cancels_without_callbacks() {
    let (_owner, _child, tweens, t) = setup(vec![alpha_tween(0.0, 1.0)]);
    let (first, on_first) = counter();
    let (second, on_second) = counter();
    t.play_with(1, 0.0, on_first);
    tweens.advance(0.5);
    t.play_with(1, 0.0, on_second);
    tweens.advance(0.75);
    assert!(t.is_playing());
    tweens.advance(0.5);
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn unset_components_come_from_the_target() {
    let item = TransitionItem::tweened(
        0.0,
        ActionKind::XY,
        TransitionTween::new(
            1.0,
            TransitionValue::current(),
            TransitionValue::Vector {
                x: Some(45.0),
                y: None,
                percent: false,
            },
        ),
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);
    t.play(1, 0.0);
    tweens.advance(0.5);
    assert!(approx(child.pos.get().0, 25.0));
    assert!(approx(child.pos.get().1, 5.0));
}

#[test]
fn percent_position_scales_by_owner_size() {
    let item = TransitionItem::new(
        0.0,
        ActionKind::XY,
        TransitionValue::Vector {
            x: Some(0.5),
            y: None,
            percent: true,
        },
    )
    .with_target("a");
    let (owner, child, tweens, t) = setup(vec![item]);
    owner.size.set((200.0, 80.0));
    t.play(1, 0.0);
    tweens.advance(0.0);
    assert_eq!(child.pos.get(), (100.0, 5.0));
}

#[test]
fn path_is_laid_out_from_the_start_value() {
    let path = vec![
        PathPoint::straight((0.0, 0.0)),
        PathPoint::straight((20.0, 10.0)),
    ];
    let item = TransitionItem::tweened(
        0.0,
        ActionKind::XY,
        TransitionTween::new(1.0, TransitionValue::xy(100.0, 100.0), TransitionValue::xy(100.0, 100.0))
            .with_path(path),
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);

    t.play(1, 0.0);
    tweens.advance(0.5);
    let (x, y) = child.pos.get();
    assert!(approx(x, 110.0) && approx(y, 105.0), "{x},{y}");

    t.stop(true);
    assert_eq!(child.pos.get(), (120.0, 110.0));
}

#[test]
fn stop_complete_before_a_path_starts_uses_the_start_value() {
    let item = TransitionItem::tweened(
        1.0,
        ActionKind::XY,
        TransitionTween::new(
            1.0,
            TransitionValue::Vector {
                x: Some(40.0),
                y: None,
                percent: false,
            },
            TransitionValue::current(),
        )
        .with_path(vec![
            PathPoint::straight((0.0, 0.0)),
            PathPoint::straight((-10.0, 30.0)),
        ]),
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);

    t.play(1, 0.0);
    tweens.advance(0.2);
    t.stop(true);
    assert_eq!(child.pos.get(), (30.0, 35.0));
}

#[test]
fn percent_tween_follows_owner_resize() {
    let item = TransitionItem::tweened(
        0.0,
        ActionKind::XY,
        TransitionTween::new(
            1.0,
            TransitionValue::Vector {
                x: Some(0.0),
                y: Some(0.0),
                percent: true,
            },
            TransitionValue::Vector {
                x: Some(1.0),
                y: Some(0.5),
                percent: true,
            },
        ),
    )
    .with_target("a");
    let (owner, child, tweens, t) = setup(vec![item]);
    owner.size.set((200.0, 100.0));

    t.play(1, 0.0);
    tweens.advance(0.5);
    let (x, y) = child.pos.get();
    assert!(approx(x, 100.0) && approx(y, 25.0), "{x},{y}");

    owner.size.set((400.0, 100.0));
    tweens.advance(0.25);
    let (x, y) = child.pos.get();
    assert!(approx(x, 300.0) && approx(y, 37.5), "{x},{y}");
}

#[test]
fn color_tween_ends_on_target_color() {
    let item = TransitionItem::tweened(
        0.0,
        ActionKind::Color,
        TransitionTween::new(
            0.5,
            TransitionValue::Color(0xFF00_0000),
            TransitionValue::Color(0x80FF_4010),
        ),
    )
    .with_target("a");
    let (_owner, child, tweens, t) = setup(vec![item]);
    t.play(1, 0.0);
    tweens.advance(0.25);
    assert_ne!(child.color.get(), 0x80FF_4010);
    tweens.advance(0.5);
    assert_eq!(child.color.get(), 0x80FF_4010);
}

#[test]
fn empty_target_id_acts_on_owner() {
    let item = TransitionItem::new(0.0, ActionKind::Alpha, TransitionValue::Scalar(0.2));
    let (owner, child, tweens, t) = setup(vec![item]);
    t.play(1, 0.0);
    tweens.advance(0.0);
    assert_eq!(owner.alpha.get(), 0.2);
    assert_eq!(child.alpha.get(), 1.0);
}

#[test]
fn unresolved_target_is_skipped() {
    let items = vec![
        TransitionItem::new(0.0, ActionKind::Alpha, TransitionValue::Scalar(0.2)).with_target("gone"),
        TransitionItem::new(0.0, ActionKind::Alpha, TransitionValue::Scalar(0.3)).with_target("a"),
    ];
    let (_owner, child, tweens, t) = setup(items);
    t.play(1, 0.0);
    tweens.advance(0.1);
    assert_eq!(child.alpha.get(), 0.3);
}

#[test]
fn sound_plays_once_through_the_injected_player() {
    let owner = Node::new("owner");
    let tweens = TweenManager::new();
    let played = Rc::new(RefCell::new(Vec::new()));
    let log = played.clone();
    let opts = TransitionOpts::default()
        .with_sound_volume(0.5)
        .with_sound_player(move |name: &str, volume: f64| {
            log.borrow_mut().push((name.to_owned(), volume));
        });
    let items = vec![
        TransitionItem::new(
            0.1,
            ActionKind::Sound,
            TransitionValue::Sound {
                name: Some("click".into()),
                volume: 0.5,
            },
        ),
        TransitionItem::new(
            0.1,
            ActionKind::Sound,
            TransitionValue::Sound {
                name: None,
                volume: 1.0,
            },
        ),
        TransitionItem::new(1.0, ActionKind::Visible, TransitionValue::Visible(true)),
    ];
    let t = Transition::new(TransitionInfo::new("t", items), owner_of(&owner), tweens.clone(), opts);

    t.play(1, 0.0);
    tweens.advance(0.2);
    tweens.advance(0.2);
    t.stop(true);
    assert_eq!(*played.borrow(), [("click".to_owned(), 0.25)]);
}

#[test]
fn hooks_fire_for_labels_and_end_labels() {
    let items = vec![
        TransitionItem::new(0.2, ActionKind::Visible, TransitionValue::Visible(false))
            .with_target("a")
            .with_label("hide"),
        TransitionItem::tweened(
            0.0,
            ActionKind::Alpha,
            TransitionTween::new(0.5, TransitionValue::Scalar(1.0), TransitionValue::Scalar(0.0))
                .with_end_label("faded"),
        )
        .with_target("a"),
    ];
    let (_owner, _child, tweens, t) = setup(items);
    let (hidden, on_hidden) = counter();
    let (faded, on_faded) = counter();
    t.set_hook("hide", on_hidden);
    t.set_hook("faded", on_faded);
    assert_eq!(t.label_time("faded"), Some(0.5));

    t.play(1, 0.0);
    tweens.advance(0.3);
    assert_eq!((hidden.get(), faded.get()), (1, 0));
    tweens.advance(0.3);
    assert_eq!((hidden.get(), faded.get()), (1, 1));

    t.clear_hooks();
    t.play(1, 0.0);
    tweens.advance(1.0);
    assert_eq!((hidden.get(), faded.get()), (1, 1));
}

#[test]
fn hook_may_stop_its_own_transition() {
    let items = vec![
        TransitionItem::new(0.1, ActionKind::Visible, TransitionValue::Visible(false))
            .with_target("a")
            .with_label("cut"),
        alpha_tween(0.0, 1.0),
    ];
    let (_owner, child, tweens, t) = setup(items);
    let handle = t.clone();
    t.set_hook("cut", move || handle.stop(false));

    t.play(1, 0.0);
    tweens.advance(0.2);
    assert!(!t.is_playing());
    assert_eq!(tweens.live_count(), 0);
    assert!(!child.visible.get());
    t.clear_hooks();
}

#[test]
fn completion_callback_may_replay() {
    let (_owner, _child, tweens, t) = setup(vec![alpha_tween(0.0, 0.5)]);
    let runs = Rc::new(Cell::new(0));
    let (r, handle) = (runs.clone(), t.clone());
    t.play_with(1, 0.0, move || {
        r.set(r.get() + 1);
        handle.play(1, 0.0);
    });
    tweens.advance(0.6);
    assert_eq!(runs.get(), 1);
    assert!(t.is_playing());
    tweens.advance(0.6);
    assert!(!t.is_playing());
}

#[test]
fn repeat_count_falls_back_to_single_play() {
    let (_owner, _child, tweens, t) = setup(vec![alpha_tween(0.0, 0.5)]);
    t.play(3, 0.0);
    tweens.advance(0.6);
    assert!(!t.is_playing());
}

#[test]
fn reset_swaps_timeline_and_goes_idle() {
    let (_owner, child, tweens, t) = setup(vec![alpha_tween(0.0, 1.0)]);
    t.play(1, 0.0);
    tweens.advance(0.5);
    t.reset(TransitionInfo::new(
        "t2",
        vec![TransitionItem::new(0.0, ActionKind::Alpha, TransitionValue::Scalar(0.9)).with_target("a")],
    ));
    assert!(!t.is_playing());
    assert_eq!(t.name(), "t2");
    t.play(1, 0.0);
    tweens.advance(0.0);
    assert_eq!(child.alpha.get(), 0.9);
}

#[test]
fn nested_items_without_a_set_are_ignored() {
    let item = TransitionItem::new(
        0.0,
        ActionKind::Transition,
        TransitionValue::Transition {
            name: Some("other".into()),
            play_times: 1,
        },
    );
    let (_owner, _child, tweens, t) = setup(vec![item, alpha_tween(0.0, 0.5)]);
    t.play(1, 0.0);
    tweens.advance(0.1);
    assert!(t.is_playing());
}

#[test]
fn scheduled_tasks_carry_the_owner_tag() {
    let (owner, _child, tweens, t) = setup(vec![alpha_tween(0.0, 1.0), alpha_tween(0.5, 1.0)]);
    let other = tweens.delayed_call(3.0);
    t.play(1, 0.0);
    assert_eq!(tweens.live_count(), 4);

    tweens.kill_tagged(owner_tag(&owner_of(&owner)), false);
    assert_eq!(tweens.live_count(), 1);
    assert!(other.is_alive());
}
