use crate::animation::values::catmull_rom;
use crate::utils::time::AnimTime;

/// How values are produced between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolator {
    /// Hold the left keyframe's value until the next keyframe.
    Step,
    #[default]
    Linear,
    /// Catmull-Rom through the neighbouring keyframes.
    Cubic,
}

impl Interpolator {
    /// Interpolates inside the segment `[v1, v2]`; `v0` and `v3` are the
    /// outer neighbours, only consulted by [`Interpolator::Cubic`].
    #[inline]
    #[must_use]
    pub fn apply(self, v0: f32, v1: f32, v2: f32, v3: f32, t: f32) -> f32 {
        match self {
            Interpolator::Step => v1,
            Interpolator::Linear => v1 + (v2 - v1) * t,
            Interpolator::Cubic => catmull_rom(v0, v1, v2, v3, t),
        }
    }
}

/// How a time outside the keyframe domain is mapped back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Extrapolator {
    /// Currently loops exactly like [`Extrapolator::Repeat`].
    Extend,
    /// Hold the first/last keyframe.
    #[default]
    Clamp,
    /// Loop the keyframe domain.
    Repeat,
    /// Loop the keyframe domain, every other period played backwards.
    Pingpong,
}

impl Extrapolator {
    /// Maps `time` into `[start, end]`.
    ///
    /// A degenerate domain (`start == end`) always maps to `start`.
    #[must_use]
    pub fn remap(self, time: AnimTime, start: AnimTime, end: AnimTime) -> AnimTime {
        match self {
            Extrapolator::Extend | Extrapolator::Repeat => remap_repeat(time, start, end),
            Extrapolator::Clamp => remap_clamp(time, start, end),
            Extrapolator::Pingpong => remap_pingpong(time, start, end),
        }
    }
}

fn remap_clamp(time: AnimTime, start: AnimTime, end: AnimTime) -> AnimTime {
    if start == end {
        return start;
    }
    time.clamp(start, end)
}

fn remap_repeat(time: AnimTime, start: AnimTime, end: AnimTime) -> AnimTime {
    let (time, start, end) = (i128::from(time), i128::from(start), i128::from(end));
    let interval = end - start;
    if interval == 0 {
        return narrow(start);
    }
    narrow((time - start).rem_euclid(interval) + start)
}

fn remap_pingpong(time: AnimTime, start: AnimTime, end: AnimTime) -> AnimTime {
    let (time, start, end) = (i128::from(time), i128::from(start), i128::from(end));
    let interval = end - start;
    if interval == 0 {
        return narrow(start);
    }
    let x = (time - start).rem_euclid(2 * interval);
    let folded = if x > interval { 2 * interval - x } else { x };
    narrow(start + folded)
}

/// Remapped times lie in `[start, end]`; anything wider saturates.
fn narrow(time: i128) -> AnimTime {
    AnimTime::try_from(time).unwrap_or(if time < 0 { AnimTime::MIN } else { AnimTime::MAX })
}

/// `(time - from) / (to - from)` without overflowing on wide key spans.
pub(crate) fn fraction(time: AnimTime, from: AnimTime, to: AnimTime) -> f32 {
    let span = i128::from(to) - i128::from(from);
    if span == 0 {
        return 0.0;
    }
    ((i128::from(time) - i128::from(from)) as f64 / span as f64) as f32
}

/// A single `(time, value)` sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: AnimTime,
    pub value: f32,
}

impl Keyframe {
    #[must_use]
    pub const fn new(time: AnimTime, value: f32) -> Self {
        Self { time, value }
    }
}

/// Where a (remapped) time falls inside a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeySpan {
    /// Exactly on, or past, the keyframe at this index; no interpolation.
    Hold(usize),
    /// Between keyframes `index` and `index + 1`, at local parameter `t` in `[0, 1)`.
    Between { index: usize, t: f32 },
}

/// A keyframed scalar channel.
///
/// Keys are kept sorted by strictly increasing time. Setting a value at an
/// existing key time overwrites that key.
#[derive(Debug, Clone, Default)]
pub struct Track {
    name: Option<String>,
    keys: Vec<Keyframe>,
    default_value: f32,
    interpolator: Interpolator,
    extrapolator: Extrapolator,
}

impl Track {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty track that evaluates to `value` until keyed.
    #[must_use]
    pub fn with_default(value: f32) -> Self {
        Self {
            default_value: value,
            ..Self::default()
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[must_use]
    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn set_default(&mut self, value: f32) {
        self.default_value = value;
    }

    #[must_use]
    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    pub fn set_interpolator(&mut self, interpolator: Interpolator) {
        self.interpolator = interpolator;
    }

    #[must_use]
    pub fn extrapolator(&self) -> Extrapolator {
        self.extrapolator
    }

    pub fn set_extrapolator(&mut self, extrapolator: Extrapolator) {
        self.extrapolator = extrapolator;
    }

    // ========================================================================
    // Keyframes
    // ========================================================================

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[must_use]
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Time of the first keyframe, if any.
    #[must_use]
    pub fn start_time(&self) -> Option<AnimTime> {
        self.keys.first().map(|k| k.time)
    }

    /// Time of the last keyframe, if any.
    #[must_use]
    pub fn end_time(&self) -> Option<AnimTime> {
        self.keys.last().map(|k| k.time)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Inserts a keyframe, or updates the value of the key already at `time`.
    pub fn set_value(&mut self, time: AnimTime, value: f32) {
        match self.keys.binary_search_by_key(&time, |k| k.time) {
            Ok(index) => self.keys[index].value = value,
            Err(index) => self.keys.insert(index, Keyframe { time, value }),
        }
    }

    pub fn set_keyframe(&mut self, key: Keyframe) {
        self.set_value(key.time, key.value);
    }

    /// Index of the keyframe interval containing `time`.
    ///
    /// - `None` if the track is empty or `time` precedes the first key.
    /// - The last index if `time` is at or after the last key.
    /// - Otherwise `i` such that `keys[i].time <= time < keys[i + 1].time`;
    ///   a time exactly on key `i` returns `i`.
    #[must_use]
    pub fn key_interval(&self, time: AnimTime) -> Option<usize> {
        let first = self.keys.first()?;
        if time < first.time {
            return None;
        }
        // keys[0].time <= time, so the partition point is at least 1
        Some(self.keys.partition_point(|k| k.time <= time) - 1)
    }

    /// Remaps `time` through the extrapolator and locates it among the keys.
    ///
    /// Returns `None` for an empty track.
    #[must_use]
    pub fn span(&self, time: AnimTime) -> Option<KeySpan> {
        let first = self.keys.first()?;
        let last_index = self.keys.len() - 1;
        let last = self.keys[last_index];

        if first.time == last.time {
            return Some(KeySpan::Hold(0));
        }

        let time = self.extrapolator.remap(time, first.time, last.time);
        let index = self.key_interval(time).unwrap_or(0);
        if index == last_index {
            return Some(KeySpan::Hold(last_index));
        }

        let k0 = self.keys[index];
        let k1 = self.keys[index + 1];
        let t = fraction(time, k0.time, k1.time);
        Some(KeySpan::Between { index, t })
    }

    /// Evaluates the track at `time`.
    #[must_use]
    pub fn value(&self, time: AnimTime) -> f32 {
        match self.span(time) {
            None => self.default_value,
            Some(KeySpan::Hold(index)) => self.keys[index].value,
            Some(KeySpan::Between { index, t }) => {
                let v1 = self.keys[index].value;
                let v2 = self.keys[index + 1].value;
                // neighbours for the cubic form, clamped at the ends
                let v0 = if index > 0 { self.keys[index - 1].value } else { v1 };
                let v3 = self.keys.get(index + 2).map_or(v2, |k| k.value);

                self.interpolator.apply(v0, v1, v2, v3, t)
            }
        }
    }

    /// True when `other` has keyframes at exactly the same times.
    #[must_use]
    pub fn shares_key_times(&self, other: &Track) -> bool {
        self.keys.len() == other.keys.len()
            && self.keys.iter().zip(&other.keys).all(|(a, b)| a.time == b.time)
    }
}
