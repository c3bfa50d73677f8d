use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use anyhow::Context as _;
use ui_transition::{
    ActionKind, Ease, PathPoint, ShakeTarget, TransitionInfo, TransitionItem, TransitionOpts,
    TransitionOwner, TransitionSet, TransitionTarget, TransitionTween, TransitionValue,
    TweenManager, Vec2,
};

/// Minimal display object: position, alpha and a shake offset.
struct Sprite {
    id: String,
    pos: Cell<(f64, f64)>,
    size: Cell<(f64, f64)>,
    alpha: Cell<f64>,
    visible: Cell<bool>,
    shake: Cell<Vec2>,
    children: RefCell<Vec<Rc<Sprite>>>,
}

impl Sprite {
    fn new(id: &str, x: f64, y: f64) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_owned(),
            pos: Cell::new((x, y)),
            size: Cell::new((320.0, 180.0)),
            alpha: Cell::new(1.0),
            visible: Cell::new(true),
            shake: Cell::new(Vec2::ZERO),
            children: RefCell::new(Vec::new()),
        })
    }
}

impl TransitionTarget for Sprite {
    fn id(&self) -> &str {
        &self.id
    }
    fn x(&self) -> f64 {
        self.pos.get().0
    }
    fn y(&self) -> f64 {
        self.pos.get().1
    }
    fn set_position(&self, x: f64, y: f64) {
        self.pos.set((x, y));
    }
    fn width(&self) -> f64 {
        self.size.get().0
    }
    fn height(&self) -> f64 {
        self.size.get().1
    }
    fn set_size(&self, width: f64, height: f64) {
        self.size.set((width, height));
    }
    fn scale_x(&self) -> f64 {
        1.0
    }
    fn scale_y(&self) -> f64 {
        1.0
    }
    fn set_scale(&self, _x: f64, _y: f64) {}
    fn skew_x(&self) -> f64 {
        0.0
    }
    fn skew_y(&self) -> f64 {
        0.0
    }
    fn set_skew(&self, _x: f64, _y: f64) {}
    fn rotation(&self) -> f64 {
        0.0
    }
    fn set_rotation(&self, _radians: f64) {}
    fn alpha(&self) -> f64 {
        self.alpha.get()
    }
    fn set_alpha(&self, alpha: f64) {
        self.alpha.set(alpha);
    }
    fn visible(&self) -> bool {
        self.visible.get()
    }
    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
    fn pivot_x(&self) -> f64 {
        0.0
    }
    fn pivot_y(&self) -> f64 {
        0.0
    }
    fn set_pivot(&self, _x: f64, _y: f64) {}
    fn as_shake(&self) -> Option<&dyn ShakeTarget> {
        Some(self)
    }
}

impl ShakeTarget for Sprite {
    fn shake_offset(&self) -> Vec2 {
        self.shake.get()
    }
    fn set_shake_offset(&self, offset: Vec2) {
        self.shake.set(offset);
    }
}

impl TransitionOwner for Sprite {
    fn child_count(&self) -> usize {
        self.children.borrow().len()
    }
    fn child_at(&self, index: usize) -> Option<Rc<dyn TransitionTarget>> {
        let child: Rc<dyn TransitionTarget> = self.children.borrow().get(index)?.clone();
        Some(child)
    }
}

fn intro() -> TransitionInfo {
    let arc = vec![
        PathPoint::straight((0.0, 0.0)),
        PathPoint::spline((60.0, -40.0)),
        PathPoint::spline((120.0, -10.0)),
        PathPoint::spline((160.0, 0.0)),
    ];
    TransitionInfo::new(
        "intro",
        vec![
            TransitionItem::tweened(
                0.0,
                ActionKind::Alpha,
                TransitionTween::new(0.4, TransitionValue::Scalar(0.0), TransitionValue::Scalar(1.0))
                    .with_ease(Ease::OutQuad),
            )
            .with_target("logo"),
            TransitionItem::tweened(
                0.2,
                ActionKind::XY,
                TransitionTween::new(1.0, TransitionValue::current(), TransitionValue::current())
                    .with_ease(Ease::InOutSine)
                    .with_path(arc),
            )
            .with_target("logo"),
            TransitionItem::new(
                1.2,
                ActionKind::Sound,
                TransitionValue::Sound {
                    name: Some("thud".into()),
                    volume: 0.8,
                },
            ),
            TransitionItem::new(
                1.2,
                ActionKind::Shake,
                TransitionValue::Shake {
                    amplitude: 4.0,
                    duration: 0.3,
                },
            )
            .with_target("logo")
            .with_label("impact"),
        ],
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let stage = Sprite::new("stage", 0.0, 0.0);
    let logo = Sprite::new("logo", 40.0, 120.0);
    stage.children.borrow_mut().push(logo.clone());
    let owner: Rc<dyn TransitionOwner> = stage.clone();

    let tweens = TweenManager::new();
    let opts = TransitionOpts::default()
        .with_sound_volume(0.5)
        .with_sound_player(|name: &str, volume: f64| println!("sound {name} @ {volume:.2}"));
    let set = TransitionSet::new(Rc::downgrade(&owner), [intro()], tweens.clone(), opts);

    let transition = set.get("intro").context("transition 'intro' not found")?;
    transition.set_hook("impact", || println!("impact!"));
    transition.play_with(1, 0.0, || println!("intro complete"));

    let dt = 1.0 / 30.0;
    let mut frame = 0u32;
    while transition.is_playing() {
        tweens.advance(dt);
        frame += 1;
        if frame % 3 == 0 {
            let (x, y) = logo.pos.get();
            let shake = logo.shake.get();
            println!(
                "t={:.2}s pos=({x:7.2}, {y:7.2}) alpha={:.2} shake=({:5.2}, {:5.2})",
                f64::from(frame) * dt,
                logo.alpha.get(),
                shake.x,
                shake.y,
            );
        }
    }
    Ok(())
}
