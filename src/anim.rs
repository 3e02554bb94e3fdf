use crate::{
    anim_ease::Ease,
    core::Vec2,
    error::{ScrollyteError, ScrollyteResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// One control point of a [`Channel`].
///
/// `ease` shapes the segment from this key toward the next one.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Key<T> {
    /// Position in the unit progress interval. Must be in `[0, 1]`.
    pub t: f64,
    pub value: T,
    pub ease: Ease,
}

impl<T> Key<T> {
    pub fn new(t: f64, value: T, ease: Ease) -> Self {
        Self { t, value, ease }
    }
}

/// An animated quantity: an ordered set of keys, strictly increasing in `t`.
///
/// Every channel in the engine goes through [`Channel::sample`]; there is no
/// per-channel interpolation code anywhere else. Queries outside the key
/// domain clamp to the boundary key values.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Channel<T> {
    keys: Vec<Key<T>>,
}

impl<T> Channel<T>
where
    T: Lerp + Clone,
{
    /// Build a validated channel. Malformed key lists (empty, out of the unit
    /// interval, or not strictly increasing in `t`) are construction-time
    /// errors, never a runtime sampling concern.
    pub fn new(keys: Vec<Key<T>>) -> ScrollyteResult<Self> {
        if keys.is_empty() {
            return Err(ScrollyteError::animation(
                "Channel must have at least one key",
            ));
        }
        if keys.iter().any(|k| !(0.0..=1.0).contains(&k.t)) {
            return Err(ScrollyteError::animation(
                "Channel key positions must be within [0, 1]",
            ));
        }
        if !keys.windows(2).all(|w| w[0].t < w[1].t) {
            return Err(ScrollyteError::animation(
                "Channel keys must be strictly increasing in t",
            ));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Key<T>] {
        &self.keys
    }

    /// Evaluate the channel at `t`.
    ///
    /// Locates the bracketing segment, applies the left key's easing to the
    /// local fraction and blends the endpoint values. Out-of-domain queries
    /// return the first/last key value exactly.
    pub fn sample(&self, t: f64) -> T {
        let idx = self.keys.partition_point(|k| k.t <= t);

        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.t - a.t;
        if denom <= 0.0 {
            return a.value.clone();
        }

        let local = (t - a.t) / denom;
        let eased = a.ease.apply(local);
        T::lerp(&a.value, &b.value, eased)
    }
}
