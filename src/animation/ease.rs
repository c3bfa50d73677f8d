use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Easing curves addressable by the one-byte tag stored in timeline data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Constant velocity.
    #[default]
    Linear,
    /// Sine, accelerating from zero velocity.
    InSine,
    /// Sine, decelerating to zero velocity.
    OutSine,
    /// Sine, accelerating then decelerating.
    InOutSine,
    /// Quadratic, accelerating from zero velocity.
    InQuad,
    /// Quadratic, decelerating to zero velocity.
    OutQuad,
    /// Quadratic, accelerating then decelerating.
    InOutQuad,
    /// Cubic, accelerating from zero velocity.
    InCubic,
    /// Cubic, decelerating to zero velocity.
    OutCubic,
    /// Cubic, accelerating then decelerating.
    InOutCubic,
    /// Quartic, accelerating from zero velocity.
    InQuart,
    /// Quartic, decelerating to zero velocity.
    OutQuart,
    /// Quartic, accelerating then decelerating.
    InOutQuart,
    /// Quintic, accelerating from zero velocity.
    InQuint,
    /// Quintic, decelerating to zero velocity.
    OutQuint,
    /// Quintic, accelerating then decelerating.
    InOutQuint,
    /// Exponential, accelerating from zero velocity.
    InExpo,
    /// Exponential, decelerating to zero velocity.
    OutExpo,
    /// Exponential, accelerating then decelerating.
    InOutExpo,
    /// Circular, accelerating from zero velocity.
    InCirc,
    /// Circular, decelerating to zero velocity.
    OutCirc,
    /// Circular, accelerating then decelerating.
    InOutCirc,
    /// Elastic, accelerating from zero velocity.
    InElastic,
    /// Elastic, decelerating to zero velocity.
    OutElastic,
    /// Elastic, accelerating then decelerating.
    InOutElastic,
    /// Overshooting, accelerating from zero velocity.
    InBack,
    /// Overshooting, decelerating to zero velocity.
    OutBack,
    /// Overshooting, accelerating then decelerating.
    InOutBack,
    /// Bouncing, accelerating from zero velocity.
    InBounce,
    /// Bouncing, decelerating to zero velocity.
    OutBounce,
    /// Bouncing, accelerating then decelerating.
    InOutBounce,
}

const BACK_OVERSHOOT: f64 = 1.70158;
const ELASTIC_PERIOD: f64 = 0.3;

impl Ease {
    const ALL: [Ease; 31] = [
        Self::Linear,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InQuart,
        Self::OutQuart,
        Self::InOutQuart,
        Self::InQuint,
        Self::OutQuint,
        Self::InOutQuint,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
        Self::InCirc,
        Self::OutCirc,
        Self::InOutCirc,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
        Self::InBack,
        Self::OutBack,
        Self::InOutBack,
        Self::InBounce,
        Self::OutBounce,
        Self::InOutBounce,
    ];

    /// Decode a stored tag. Tag 31 (custom curve) and unknown tags fall back to `Linear`.
    pub fn from_tag(tag: u8) -> Self {
        Self::ALL
            .get(usize::from(tag))
            .copied()
            .unwrap_or(Self::Linear)
    }

    /// Stored tag, the inverse of [`Ease::from_tag`].
    pub fn tag(self) -> u8 {
        Self::ALL.iter().position(|e| *e == self).unwrap_or(0) as u8
    }

    /// Map linear progress to eased progress. Input is clamped; endpoints are exact.
    pub fn apply(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::InSine => 1.0 - (t * FRAC_PI_2).cos(),
            Self::OutSine => (t * FRAC_PI_2).sin(),
            Self::InOutSine => -0.5 * ((PI * t).cos() - 1.0),
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(5) / 2.0)
                }
            }
            Self::InExpo => 2f64.powf(10.0 * (t - 1.0)),
            Self::OutExpo => 1.0 - 2f64.powf(-10.0 * t),
            Self::InOutExpo => {
                if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::InElastic => {
                let s = ELASTIC_PERIOD / 4.0;
                let u = t - 1.0;
                -(2f64.powf(10.0 * u) * ((u - s) * TAU / ELASTIC_PERIOD).sin())
            }
            Self::OutElastic => {
                let s = ELASTIC_PERIOD / 4.0;
                2f64.powf(-10.0 * t) * ((t - s) * TAU / ELASTIC_PERIOD).sin() + 1.0
            }
            Self::InOutElastic => {
                let p = ELASTIC_PERIOD * 1.5;
                let s = p / 4.0;
                let u = 2.0 * t - 1.0;
                if u < 0.0 {
                    -0.5 * 2f64.powf(10.0 * u) * ((u - s) * TAU / p).sin()
                } else {
                    0.5 * 2f64.powf(-10.0 * u) * ((u - s) * TAU / p).sin() + 1.0
                }
            }
            Self::InBack => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Self::OutBack => {
                let u = t - 1.0;
                u * u * ((BACK_OVERSHOOT + 1.0) * u + BACK_OVERSHOOT) + 1.0
            }
            Self::InOutBack => {
                let s = BACK_OVERSHOOT * 1.525;
                if t < 0.5 {
                    let u = 2.0 * t;
                    0.5 * (u * u * ((s + 1.0) * u - s))
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * (u * u * ((s + 1.0) * u + s) + 2.0)
                }
            }
            Self::InBounce => 1.0 - bounce_out(1.0 - t),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let u = t - 1.5 / D;
        N * u * u + 0.75
    } else if t < 2.5 / D {
        let u = t - 2.25 / D;
        N * u * u + 0.9375
    } else {
        let u = t - 2.625 / D;
        N * u * u + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
