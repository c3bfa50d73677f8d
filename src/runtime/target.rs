use std::rc::Rc;

use crate::{foundation::core::Vec2, timeline::decode::ChildLookup};

/// An object a transition item can act on.
///
/// Mutators take `&self`: hosts keep their display objects behind shared handles and mutate
/// through interior mutability. Optional abilities are exposed through the `as_*` queries, which
/// default to `None`.
pub trait TransitionTarget {
    /// Package resource id; empty when the object was not created from a resource.
    fn resource_id(&self) -> &str {
        ""
    }

    /// Authoring name; may be empty.
    fn name(&self) -> &str {
        ""
    }

    /// Runtime id, unique within the owner.
    fn id(&self) -> &str;

    /// Position in the owner's coordinate space.
    fn x(&self) -> f64;
    /// See [`TransitionTarget::x`].
    fn y(&self) -> f64;
    /// Move the object.
    fn set_position(&self, x: f64, y: f64);

    /// Current width.
    fn width(&self) -> f64;
    /// Current height.
    fn height(&self) -> f64;
    /// Resize the object.
    fn set_size(&self, width: f64, height: f64);

    /// Horizontal scale factor.
    fn scale_x(&self) -> f64;
    /// Vertical scale factor.
    fn scale_y(&self) -> f64;
    /// Set both scale factors.
    fn set_scale(&self, x: f64, y: f64);

    /// Skew angles as authored.
    fn skew_x(&self) -> f64;
    /// See [`TransitionTarget::skew_x`].
    fn skew_y(&self) -> f64;
    /// Set both skew angles.
    fn set_skew(&self, x: f64, y: f64);

    /// Radians.
    fn rotation(&self) -> f64;
    /// Rotate to `radians`.
    fn set_rotation(&self, radians: f64);

    /// Opacity in `[0, 1]`.
    fn alpha(&self) -> f64;
    /// Set the opacity.
    fn set_alpha(&self, alpha: f64);

    /// Whether the object is shown.
    fn visible(&self) -> bool;
    /// Show or hide the object.
    fn set_visible(&self, visible: bool);

    /// Pivot as a fraction of the object's size.
    fn pivot_x(&self) -> f64;
    /// See [`TransitionTarget::pivot_x`].
    fn pivot_y(&self) -> f64;
    /// Move the pivot.
    fn set_pivot(&self, x: f64, y: f64);

    /// Color tint, when the object has one.
    fn as_color(&self) -> Option<&dyn ColorTarget> {
        None
    }

    /// Color filter, when the object has one.
    fn as_color_filter(&self) -> Option<&dyn ColorFilterTarget> {
        None
    }

    /// Frame animation control.
    fn as_animatable(&self) -> Option<&dyn AnimatableTarget> {
        None
    }

    /// Text content.
    fn as_text(&self) -> Option<&dyn TextTarget> {
        None
    }

    /// Icon URL.
    fn as_icon(&self) -> Option<&dyn IconTarget> {
        None
    }

    /// Shake offset.
    fn as_shake(&self) -> Option<&dyn ShakeTarget> {
        None
    }
}

/// Tinted objects; colors are `0xAARRGGBB`.
pub trait ColorTarget {
    /// Current tint.
    fn color(&self) -> u32;
    /// Replace the tint.
    fn set_color(&self, argb: u32);
}

/// Objects with a brightness/contrast/saturation/hue filter.
pub trait ColorFilterTarget {
    /// Current `[brightness, contrast, saturation, hue]`.
    fn color_filter(&self) -> [f64; 4];
    /// Replace the filter.
    fn set_color_filter(&self, filter: [f64; 4]);
}

/// Frame-based animations (movie clips, skeletal players).
pub trait AnimatableTarget {
    /// Whether the animation advances on its own.
    fn playing(&self) -> bool;
    /// Start or pause the animation.
    fn set_playing(&self, playing: bool);
    /// Current frame index.
    fn frame(&self) -> i32;
    /// Jump to `frame`.
    fn set_frame(&self, frame: i32);
    /// Playback speed multiplier.
    fn time_scale(&self) -> f64;
    /// Set the playback speed multiplier.
    fn set_time_scale(&self, scale: f64);
    /// Milliseconds of playback owed to the animation, consumed by its own clock.
    fn delta_time(&self) -> f64;
    /// Replace the owed playback time.
    fn set_delta_time(&self, ms: f64);
}

/// Objects showing a string.
pub trait TextTarget {
    /// Replace the displayed text.
    fn set_text(&self, text: &str);
}

/// Objects showing an icon loaded by URL.
pub trait IconTarget {
    /// Replace the icon.
    fn set_icon(&self, url: &str);
}

/// Objects that render with a transient offset on top of their position.
pub trait ShakeTarget {
    /// Offset currently applied.
    fn shake_offset(&self) -> Vec2;
    /// Replace the offset; zero means at rest.
    fn set_shake_offset(&self, offset: Vec2);
}

/// The component that owns transitions and the children they address.
pub trait TransitionOwner: TransitionTarget {
    /// Number of direct children.
    fn child_count(&self) -> usize;
    /// Child at `index` in display order.
    fn child_at(&self, index: usize) -> Option<Rc<dyn TransitionTarget>>;
}

/// Stored child indices resolve to the most stable identity the child has: resource id, then
/// name, then runtime id.
impl ChildLookup for dyn TransitionOwner + '_ {
    fn child_id(&self, index: usize) -> Option<String> {
        let child = self.child_at(index)?;
        let id = [child.resource_id(), child.name(), child.id()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Some(id.to_owned())
    }
}

/// Plays named sounds at a volume in `[0, 1]`.
pub trait SoundPlayer {
    /// Start `name` once.
    fn play_sound(&self, name: &str, volume: f64);
}

impl<F> SoundPlayer for F
where
    F: Fn(&str, f64),
{
    fn play_sound(&self, name: &str, volume: f64) {
        self(name, volume)
    }
}
