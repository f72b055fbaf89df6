use log::{debug, info};
use thiserror::Error;

pub const DEFAULT_DURATION: f32 = 3.;
pub const MIN_DURATION: f32 = 0.25;
pub const MAX_DURATION: f32 = 10.;
pub const DURATION_STEP: f32 = 0.25;

/// Slack when deciding whether a blend has reached its end time.
const TIME_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MorphError {
    #[error("morph target {target} is out of range, there are {count} shapes")]
    TargetOutOfRange { target: usize, count: usize },
}

pub type Easing = fn(f32) -> f32;

pub fn linear(t: f32) -> f32 {
    t
}

/// Animates a scalar between two values over a time span.
#[derive(Debug, Copy, Clone)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub start: f64,
    pub duration: f64,
    pub ease: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, start: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            ease: linear,
        }
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now - self.start >= self.duration - TIME_EPSILON
    }

    pub fn value_at(&self, now: f64) -> f32 {
        if self.is_finished(now) {
            return self.to;
        }
        let t = ((now - self.start) / self.duration).clamp(0., 1.) as f32;
        self.from + (self.to - self.from) * (self.ease)(t)
    }
}

/// The two sets bound to the shader while blending.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MorphPair {
    pub current: usize,
    pub target: usize,
}

/// Drives `uProgress` and decides which point sets feed the blend.
///
/// Starting a morph while another one is running replaces it. The replaced
/// blend never completes, so only a blend that reaches its end moves the
/// active shape.
#[derive(Debug, Clone)]
pub struct MorphController {
    set_count: usize,
    active: usize,
    pair: MorphPair,
    duration: f32,
    progress: f32,
    tween: Option<Tween>,
}

impl MorphController {
    pub fn new(set_count: usize, initial_target: usize, duration: f32) -> Self {
        Self {
            set_count,
            active: 0,
            pair: MorphPair {
                current: 0,
                target: initial_target.min(set_count.saturating_sub(1)),
            },
            duration: snap_duration(duration),
            progress: 0.,
            tween: None,
        }
    }

    pub fn pair(&self) -> MorphPair {
        self.pair
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Starts blending from the active shape to `target` at time `now`.
    pub fn morph_to(&mut self, target: usize, now: f64) -> Result<MorphPair, MorphError> {
        if target >= self.set_count {
            return Err(MorphError::TargetOutOfRange {
                target,
                count: self.set_count,
            });
        }

        if let Some(tween) = self.tween {
            debug!(
                "Replacing morph to {} at progress {:.2}",
                self.pair.target,
                tween.value_at(now)
            );
        }

        self.pair = MorphPair {
            current: self.active,
            target,
        };
        self.progress = 0.;
        self.tween = Some(Tween::new(0., 1., now, self.duration as f64));
        info!(
            "Morphing from shape {} to shape {} over {}s",
            self.pair.current, target, self.duration
        );

        Ok(self.pair)
    }

    /// Advances the running blend. Returns the new active index when it completes.
    pub fn update(&mut self, now: f64) -> Option<usize> {
        let tween = self.tween?;
        self.progress = tween.value_at(now);

        if tween.is_finished(now) {
            self.progress = 1.;
            self.active = self.pair.target;
            self.tween = None;
            info!("Morph to shape {} finished", self.active);
            return Some(self.active);
        }
        None
    }

    /// Applies a new duration, snapped to the slider grid. Any running blend is
    /// dropped and progress goes back to zero.
    pub fn set_duration(&mut self, duration: f32) -> f32 {
        self.duration = snap_duration(duration);
        self.tween = None;
        self.progress = 0.;
        info!("Morph duration set to {}s", self.duration);
        self.duration
    }

    pub fn nudge_duration(&mut self, steps: i32) -> f32 {
        self.set_duration(self.duration + steps as f32 * DURATION_STEP)
    }
}

#[cfg(test)]
impl MorphController {
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }
}

pub fn snap_duration(duration: f32) -> f32 {
    if !duration.is_finite() {
        return DEFAULT_DURATION;
    }
    let snapped = (duration / DURATION_STEP).round() * DURATION_STEP;
    snapped.clamp(MIN_DURATION, MAX_DURATION)
}
