//! Scalar response curves.
//!
//! A [`Curve`] maps a raster sample to an influence value. Curves are supplied by the
//! caller for every influence channel (moisture compositing and per-species placement
//! response). No monotonicity is assumed.
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capability to evaluate a scalar response function.
pub trait Curve: Send + Sync {
    fn evaluate(&self, x: f32) -> f32;
}

/// Shared handle to a curve.
pub type CurveRef = Arc<dyn Curve>;

impl<F> Curve for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    #[inline]
    fn evaluate(&self, x: f32) -> f32 {
        self(x)
    }
}

impl fmt::Debug for dyn Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Curve")
    }
}

/// Curve returning the same value everywhere.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantCurve {
    pub value: f32,
}

impl ConstantCurve {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Curve for ConstantCurve {
    #[inline]
    fn evaluate(&self, _x: f32) -> f32 {
        self.value
    }
}

/// Curve `slope * x + intercept`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearCurve {
    pub slope: f32,
    pub intercept: f32,
}

impl LinearCurve {
    pub fn new(slope: f32, intercept: f32) -> Self {
        Self { slope, intercept }
    }

    /// The identity curve `y = x`.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Curve for LinearCurve {
    #[inline]
    fn evaluate(&self, x: f32) -> f32 {
        self.slope * x + self.intercept
    }
}

/// A single control point of a [`KeyframeCurve`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve through a set of keyframes.
///
/// Inputs before the first or after the last keyframe evaluate to the value of that
/// end keyframe. A curve without keyframes evaluates to `0.0`, and a NaN input
/// evaluates to NaN.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    /// Builds a curve from keyframes in any order; they are sorted by time.
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Convenience constructor from `(time, value)` pairs.
    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self::new(pairs.iter().map(|&(t, v)| Keyframe::new(t, v)).collect())
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }
}

impl Curve for KeyframeCurve {
    fn evaluate(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if x.is_nan() {
            return f32::NAN;
        }
        if x <= first.time {
            return first.value;
        }
        if x >= last.time {
            return last.value;
        }

        // First key strictly after x; x > first.time guarantees idx >= 1.
        let idx = self.keys.partition_point(|k| k.time <= x);
        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let t = (x - a.time) / span;
        a.value + (b.value - a.value) * t
    }
}

/// Wraps a curve in a shared handle.
pub fn shared<C: Curve + 'static>(curve: C) -> CurveRef {
    Arc::new(curve)
}
