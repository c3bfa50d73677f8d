use crate::{animation::ease::Ease, path::builder::PathPoint};

/// What an item does to its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ActionKind {
    /// Position.
    XY,
    /// Width and height.
    Size,
    /// Scale factors.
    Scale,
    /// Pivot point.
    Pivot,
    /// Opacity.
    Alpha,
    /// Rotation in degrees.
    Rotation,
    /// Tint color.
    Color,
    /// Play state and frame of a frame animation.
    Animation,
    /// Visibility.
    Visible,
    /// Play a sound; no target.
    Sound,
    /// Play a sibling transition.
    Transition,
    /// Transient random offset.
    Shake,
    /// Brightness, contrast, saturation and hue.
    ColorFilter,
    /// Skew angles.
    Skew,
    /// Text content.
    Text,
    /// Icon URL.
    Icon,
    /// Tag from a newer format; decoded, kept, ignored at playback.
    Unknown(u8),
}

impl ActionKind {
    /// Decode a stored tag; unknown tags are kept as [`ActionKind::Unknown`].
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::XY,
            1 => Self::Size,
            2 => Self::Scale,
            3 => Self::Pivot,
            4 => Self::Alpha,
            5 => Self::Rotation,
            6 => Self::Color,
            7 => Self::Animation,
            8 => Self::Visible,
            9 => Self::Sound,
            10 => Self::Transition,
            11 => Self::Shake,
            12 => Self::ColorFilter,
            13 => Self::Skew,
            14 => Self::Text,
            15 => Self::Icon,
            other => Self::Unknown(other),
        }
    }

    /// Stored tag, the inverse of [`ActionKind::from_tag`].
    pub fn tag(self) -> u8 {
        match self {
            Self::XY => 0,
            Self::Size => 1,
            Self::Scale => 2,
            Self::Pivot => 3,
            Self::Alpha => 4,
            Self::Rotation => 5,
            Self::Color => 6,
            Self::Animation => 7,
            Self::Visible => 8,
            Self::Sound => 9,
            Self::Transition => 10,
            Self::Shake => 11,
            Self::ColorFilter => 12,
            Self::Skew => 13,
            Self::Text => 14,
            Self::Icon => 15,
            Self::Unknown(tag) => tag,
        }
    }

    /// Kinds whose values interpolate through a numeric tween.
    pub fn is_tweenable(self) -> bool {
        matches!(
            self,
            Self::XY
                | Self::Size
                | Self::Scale
                | Self::Skew
                | Self::Alpha
                | Self::Rotation
                | Self::Color
                | Self::ColorFilter
        )
    }

    /// Number of tweened components for tweenable kinds, 0 otherwise.
    pub(crate) fn tween_dims(self) -> usize {
        match self {
            Self::Alpha | Self::Rotation => 1,
            Self::XY | Self::Size | Self::Scale | Self::Skew => 2,
            Self::Color | Self::ColorFilter => 4,
            _ => 0,
        }
    }

    /// The empty value of this kind's layout.
    pub fn default_value(self) -> TransitionValue {
        match self {
            Self::XY | Self::Size | Self::Pivot | Self::Skew => TransitionValue::Vector {
                x: None,
                y: None,
                percent: false,
            },
            Self::Alpha | Self::Rotation => TransitionValue::Scalar(0.0),
            Self::Scale => TransitionValue::Scale { x: 0.0, y: 0.0 },
            Self::Color => TransitionValue::Color(0),
            Self::Animation => TransitionValue::Animation {
                playing: false,
                frame: 0,
            },
            Self::Visible => TransitionValue::Visible(false),
            Self::Sound => TransitionValue::Sound {
                name: None,
                volume: 0.0,
            },
            Self::Transition => TransitionValue::Transition {
                name: None,
                play_times: 0,
            },
            Self::Shake => TransitionValue::Shake {
                amplitude: 0.0,
                duration: 0.0,
            },
            Self::ColorFilter => TransitionValue::ColorFilter([0.0; 4]),
            Self::Text | Self::Icon => TransitionValue::Text(None),
            Self::Unknown(_) => TransitionValue::None,
        }
    }
}

/// Partial update carried by an item.
///
/// `None` numeric fields mean "leave the target's current value alone", which is how a
/// timeline animates only X of an XY pair.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TransitionValue {
    /// XY, Size, Pivot, Skew. `percent` makes XY/Size fractions of the owner's size.
    Vector {
        /// First component; `None` keeps the target's value.
        x: Option<f64>,
        /// Second component; `None` keeps the target's value.
        y: Option<f64>,
        /// Components are fractions of the owner's size.
        percent: bool,
    },
    /// Alpha, or Rotation in degrees.
    Scalar(f64),
    /// Scale factors.
    Scale {
        /// Horizontal factor.
        x: f64,
        /// Vertical factor.
        y: f64,
    },
    /// `0xAARRGGBB`.
    Color(u32),
    /// `frame == -1` leaves the frame unchanged.
    Animation {
        /// Whether the animation runs after the item applies.
        playing: bool,
        /// Frame to jump to.
        frame: i32,
    },
    /// Shown or hidden.
    Visible(bool),
    /// Sound to start.
    Sound {
        /// Sound resource; `None` plays nothing.
        name: Option<String>,
        /// Volume before the global multiplier.
        volume: f64,
    },
    /// Sibling transition to start.
    Transition {
        /// Sibling name; `None` does nothing.
        name: Option<String>,
        /// Play count passed to the sibling.
        play_times: i32,
    },
    /// Decaying random offset.
    Shake {
        /// Largest offset, in pixels.
        amplitude: f64,
        /// Seconds until the offset settles to zero.
        duration: f64,
    },
    /// Brightness, contrast, saturation, hue.
    ColorFilter([f64; 4]),
    /// Text or icon URL.
    Text(Option<String>),
    /// Nothing to apply.
    None,
}

impl TransitionValue {
    /// Absolute position with both components set.
    pub fn xy(x: f64, y: f64) -> Self {
        Self::Vector {
            x: Some(x),
            y: Some(y),
            percent: false,
        }
    }

    /// Vector with no authoritative component: resolves entirely from the target.
    pub fn current() -> Self {
        Self::Vector {
            x: None,
            y: None,
            percent: false,
        }
    }
}

/// Interpolation settings and endpoints of a tweened item.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionTween {
    /// Seconds per cycle.
    pub duration: f64,
    /// Curve applied to each cycle.
    pub ease: Ease,
    /// Extra cycles after the first; `-1` repeats forever.
    pub repeat: i32,
    /// Alternate direction on every repeat.
    pub yoyo: bool,
    /// Label whose hook fires when the tween ends.
    pub end_label: Option<String>,
    /// Path-local control points; empty when the item moves in a straight line.
    pub path: Vec<PathPoint>,
    /// Value at progress 0. Unset components come from the target when the tween starts.
    pub start: TransitionValue,
    /// Value at progress 1.
    pub end: TransitionValue,
}

impl TransitionTween {
    /// Linear, single-cycle tween from `start` to `end`.
    pub fn new(duration: f64, start: TransitionValue, end: TransitionValue) -> Self {
        Self {
            duration,
            ease: Ease::Linear,
            repeat: 0,
            yoyo: false,
            end_label: None,
            path: Vec::new(),
            start,
            end,
        }
    }

    /// Replace the easing curve.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Extra cycles after the first; `-1` for forever.
    pub fn with_repeat(mut self, repeat: i32, yoyo: bool) -> Self {
        self.repeat = repeat;
        self.yoyo = yoyo;
        self
    }

    /// Move along `path` instead of interpolating `start` to `end`; XY items only.
    pub fn with_path(mut self, path: Vec<PathPoint>) -> Self {
        self.path = path;
        self
    }

    /// Label reached when the tween ends.
    pub fn with_end_label(mut self, label: impl Into<String>) -> Self {
        self.end_label = Some(label.into());
        self
    }

    /// Time covered by all finite cycles; an infinite repeat counts one cycle.
    pub fn span(&self) -> f64 {
        let duration = self.duration.max(0.0);
        if self.repeat > 0 {
            duration * f64::from(self.repeat + 1)
        } else {
            duration
        }
    }
}

/// One timed action or tween.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionItem {
    /// Offset from transition start, seconds.
    pub time: f64,
    /// Stable child id; empty targets the owner.
    pub target_id: String,
    /// What the item does.
    pub kind: ActionKind,
    /// Label whose hook fires when the item applies or its tween starts.
    pub label: Option<String>,
    /// Interpolation, for tweened items.
    pub tween: Option<TransitionTween>,
    /// Immediate value; ignored when `tween` is set.
    pub value: TransitionValue,
}

impl TransitionItem {
    /// Immediate item acting on the owner.
    pub fn new(time: f64, kind: ActionKind, value: TransitionValue) -> Self {
        Self {
            time,
            target_id: String::new(),
            kind,
            label: None,
            tween: None,
            value,
        }
    }

    /// Tweened item acting on the owner.
    pub fn tweened(time: f64, kind: ActionKind, tween: TransitionTween) -> Self {
        Self {
            time,
            target_id: String::new(),
            kind,
            label: None,
            tween: Some(tween),
            value: kind.default_value(),
        }
    }

    /// Address the child with this id.
    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = target_id.into();
        self
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Final value the item leaves on its target.
    pub fn end_value(&self) -> &TransitionValue {
        match &self.tween {
            Some(tween) => &tween.end,
            None => &self.value,
        }
    }

    /// Time the item occupies after its start offset.
    pub fn span(&self) -> f64 {
        if let TransitionValue::Shake { duration, .. } = self.end_value() {
            return duration.max(0.0);
        }
        self.tween.as_ref().map_or(0.0, TransitionTween::span)
    }
}

/// Option bits stored with a transition.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TransitionOptions(pub u32);

impl TransitionOptions {
    /// Play regardless of the owner's display controller state.
    pub const IGNORE_DISPLAY_CONTROLLER: Self = Self(1);
    /// Keep playing when the owner leaves the display tree.
    pub const AUTO_STOP_DISABLED: Self = Self(2);
    /// When stopped by the owner leaving, jump to the final values.
    pub const AUTO_STOP_AT_END: Self = Self(4);

    /// `true` when every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for TransitionOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A decoded, immutable timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionInfo {
    name: String,
    options: TransitionOptions,
    auto_play: bool,
    auto_play_times: i32,
    auto_play_delay: f64,
    items: Vec<TransitionItem>,
    total_duration: f64,
}

impl TransitionInfo {
    /// Timeline with default options and no auto-play.
    pub fn new(name: impl Into<String>, items: Vec<TransitionItem>) -> Self {
        let total_duration = items
            .iter()
            .map(|item| item.time + item.span())
            .fold(0.0, f64::max);
        Self {
            name: name.into(),
            options: TransitionOptions::default(),
            auto_play: false,
            auto_play_times: 1,
            auto_play_delay: 0.0,
            items,
            total_duration,
        }
    }

    /// Replace the option bits.
    pub fn with_options(mut self, options: TransitionOptions) -> Self {
        self.options = options;
        self
    }

    /// Play `times` times after `delay` seconds when the owner is added to the stage.
    pub fn with_auto_play(self, times: i32, delay: f64) -> Self {
        self.with_auto_play_settings(true, times, delay)
    }

    /// Set the stored auto-play header as-is. The count and delay also stand in for
    /// `play(0, _)` and negative delays when `auto_play` is off.
    pub fn with_auto_play_settings(mut self, auto_play: bool, times: i32, delay: f64) -> Self {
        self.auto_play = auto_play;
        self.auto_play_times = times;
        self.auto_play_delay = delay;
        self
    }

    /// Name the owner's set looks the timeline up by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored option bits.
    pub fn options(&self) -> TransitionOptions {
        self.options
    }

    /// Starts by itself when the owner is added.
    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    /// Play count used for auto-play and for `play(0, _)`.
    pub fn auto_play_times(&self) -> i32 {
        self.auto_play_times
    }

    /// Delay used for auto-play and for negative play delays.
    pub fn auto_play_delay(&self) -> f64 {
        self.auto_play_delay
    }

    /// Items in authored order.
    pub fn items(&self) -> &[TransitionItem] {
        &self.items
    }

    /// Max over items of `time + span`; never negative.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Start time of the item labelled `label`, or the end time of the tween whose end label
    /// matches.
    pub fn label_time(&self, label: &str) -> Option<f64> {
        self.items.iter().find_map(|item| {
            if item.label.as_deref() == Some(label) {
                return Some(item.time);
            }
            let tween = item.tween.as_ref()?;
            (tween.end_label.as_deref() == Some(label)).then(|| item.time + tween.duration)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
