//! Animation driver: turns target poses into per-frame sampled poses.
//!
//! The editor never interpolates on its own. Whenever a group's target pose
//! changes it calls `retarget`; the host pumps `tick` once per frame and the
//! compositor reads `sample` for each layer.
//!
//! `SpringDriver` runs a damped spring per transform field and a linear fade
//! per opacity. Retargeting mid-flight keeps the current position and
//! velocity, so reversing a hover never snaps.

use ca_core::compositor::LayerPose;
use ca_core::config::{Fade, Spring, TransitionProfile};
use ca_core::id::GroupId;
use ca_core::model::{StateKind, TransformField, TransformState};
use std::collections::HashMap;

/// Capability the sessions animate through. Injected so hosts and tests can
/// swap in their own timing.
pub trait AnimationDriver {
    /// Start moving `id` toward `target`. The first call for an id places it
    /// there immediately.
    fn retarget(&mut self, id: GroupId, target: LayerPose, profile: &TransitionProfile);

    /// Advance every track by `dt_ms` milliseconds.
    fn tick(&mut self, dt_ms: f64);

    /// Current pose of `id`, or `None` if it was never targeted.
    fn sample(&self, id: GroupId) -> Option<LayerPose>;

    /// True when nothing is moving.
    fn is_settled(&self) -> bool;

    /// Forget every track.
    fn clear(&mut self);
}

// ─── Scalar tracks ───────────────────────────────────────────────────────

/// Largest integration step.
const MAX_STEP_MS: f64 = 4.0;

/// Position and speed below which a spring counts as at rest.
const REST_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpringTrack {
    position: f64,
    velocity: f64,
    target: f64,
}

impl SpringTrack {
    fn at(value: f64) -> Self {
        Self {
            position: value,
            velocity: 0.0,
            target: value,
        }
    }

    fn is_resting(&self) -> bool {
        self.position.total_cmp(&self.target).is_eq() && self.velocity == 0.0
    }

    /// Returns whether the target moved. Non-finite values cannot be
    /// integrated, so either end being non-finite jumps straight there.
    fn retarget(&mut self, target: f64) -> bool {
        if self.target.total_cmp(&target).is_eq() {
            return false;
        }
        self.target = target;
        if !target.is_finite() || !self.position.is_finite() || !self.velocity.is_finite() {
            self.position = target;
            self.velocity = 0.0;
        }
        true
    }

    /// Semi-implicit Euler step of `dt` seconds.
    fn step(&mut self, spring: &Spring, dt: f64) {
        if self.is_resting() {
            return;
        }
        let mass = if spring.mass > 0.0 { spring.mass } else { 1.0 };
        let displacement = self.position - self.target;
        let accel = (-spring.stiffness * displacement - spring.damping * self.velocity) / mass;
        self.velocity += accel * dt;
        self.position += self.velocity * dt;

        if (self.position - self.target).abs() < REST_TOLERANCE && self.velocity.abs() < REST_TOLERANCE {
            self.position = self.target;
            self.velocity = 0.0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FadeTrack {
    value: f64,
    from: f64,
    target: f64,
    elapsed_ms: f64,
    fade: Fade,
}

impl FadeTrack {
    fn at(value: f64) -> Self {
        Self {
            value,
            from: value,
            target: value,
            elapsed_ms: 0.0,
            fade: Fade::new(0, 0),
        }
    }

    fn retarget(&mut self, target: f64, fade: Fade) {
        if target == self.target {
            return;
        }
        self.from = self.value;
        self.target = target;
        self.elapsed_ms = 0.0;
        self.fade = fade;
    }

    fn advance(&mut self, dt_ms: f64) {
        if self.is_done() {
            return;
        }
        self.elapsed_ms += dt_ms;
        let active = self.elapsed_ms - f64::from(self.fade.delay_ms);
        if active <= 0.0 {
            return;
        }
        let duration = f64::from(self.fade.duration_ms);
        let progress = if duration > 0.0 {
            (active / duration).min(1.0)
        } else {
            1.0
        };
        self.value = if progress >= 1.0 {
            self.target
        } else {
            self.from + (self.target - self.from) * progress
        };
    }

    fn is_done(&self) -> bool {
        self.value == self.target
    }
}

// ─── Per-group track ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Track {
    transform: [SpringTrack; 4],
    collapsed_opacity: FadeTrack,
    expanded_opacity: FadeTrack,
    spring: Spring,
    delay_remaining_ms: f64,
}

impl Track {
    fn snapped(pose: LayerPose, profile: &TransitionProfile) -> Self {
        Self {
            transform: TransformField::ALL.map(|f| SpringTrack::at(pose.transform.get(f))),
            collapsed_opacity: FadeTrack::at(pose.collapsed_opacity),
            expanded_opacity: FadeTrack::at(pose.expanded_opacity),
            spring: profile.spring,
            delay_remaining_ms: 0.0,
        }
    }

    fn retarget(&mut self, pose: LayerPose, profile: &TransitionProfile) {
        let mut moved = false;
        for (track, field) in self.transform.iter_mut().zip(TransformField::ALL) {
            moved |= track.retarget(pose.transform.get(field));
        }
        if moved {
            self.spring = profile.spring;
            self.delay_remaining_ms = f64::from(profile.delay_ms);
        }

        for state in StateKind::ALL {
            let target = pose.opacity(state);
            let track = self.opacity_mut(state);
            let fade = if target > track.value {
                profile.fade_in
            } else {
                profile.fade_out
            };
            track.retarget(target, fade);
        }
    }

    fn opacity_mut(&mut self, state: StateKind) -> &mut FadeTrack {
        match state {
            StateKind::Collapsed => &mut self.collapsed_opacity,
            StateKind::Expanded => &mut self.expanded_opacity,
        }
    }

    fn advance(&mut self, dt_ms: f64) {
        self.collapsed_opacity.advance(dt_ms);
        self.expanded_opacity.advance(dt_ms);

        let mut remaining = dt_ms;
        if self.delay_remaining_ms > 0.0 {
            let waited = remaining.min(self.delay_remaining_ms);
            self.delay_remaining_ms -= waited;
            remaining -= waited;
        }
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP_MS);
            for track in &mut self.transform {
                track.step(&self.spring, step / 1000.0);
            }
            remaining -= step;
        }
    }

    fn pose(&self) -> LayerPose {
        let [x, y, rotate, scale] = self.transform.map(|t| t.position);
        LayerPose {
            transform: TransformState::new(x, y, rotate, scale),
            collapsed_opacity: self.collapsed_opacity.value,
            expanded_opacity: self.expanded_opacity.value,
        }
    }

    fn is_settled(&self) -> bool {
        self.transform.iter().all(SpringTrack::is_resting)
            && self.collapsed_opacity.is_done()
            && self.expanded_opacity.is_done()
    }
}

// ─── SpringDriver ────────────────────────────────────────────────────────

/// Default driver: damped springs for transforms, linear fades for opacity.
#[derive(Debug, Clone, Default)]
pub struct SpringDriver {
    tracks: HashMap<GroupId, Track>,
}

impl SpringDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups being tracked.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl AnimationDriver for SpringDriver {
    fn retarget(&mut self, id: GroupId, target: LayerPose, profile: &TransitionProfile) {
        log::trace!("retarget #{id} -> {target:?}");
        match self.tracks.get_mut(&id) {
            Some(track) => track.retarget(target, profile),
            None => {
                self.tracks.insert(id, Track::snapped(target, profile));
            }
        }
    }

    fn tick(&mut self, dt_ms: f64) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        for track in self.tracks.values_mut() {
            track.advance(dt_ms);
        }
    }

    fn sample(&self, id: GroupId) -> Option<LayerPose> {
        self.tracks.get(&id).map(Track::pose)
    }

    fn is_settled(&self) -> bool {
        self.tracks.values().all(Track::is_settled)
    }

    fn clear(&mut self) {
        self.tracks.clear();
    }
}
