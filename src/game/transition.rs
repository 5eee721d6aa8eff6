//! Timed, cancellable transitions advanced once per decision tick.
//!
//! Geometry transitions (scale toggle, crouch, uncrouch) share a single
//! [`TransitionSlot`]: installing a new one cancels whatever was running
//! first, so two transitions never write the same geometry fields. A
//! cancelled transition is dropped where it stands; geometry keeps the last
//! interpolated value.

use serde::Serialize;
use tracing::debug;

use super::body::BodyGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Scale,
    Crouch,
    Uncrouch,
}

/// Opaque reference to an installed transition. Stale once the slot has been
/// cancelled or reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle {
    generation: u64,
    kind: TransitionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Running,
    Completed,
}

/// Linear interpolation from `start` to `target` over `duration` seconds.
#[derive(Debug, Clone)]
pub struct GeometryTransition {
    pub kind: TransitionKind,
    pub elapsed: f32,
    pub duration: f32,
    pub start: BodyGeometry,
    pub target: BodyGeometry,
}

impl GeometryTransition {
    pub fn new(
        kind: TransitionKind,
        duration: f32,
        start: BodyGeometry,
        target: BodyGeometry,
    ) -> Self {
        Self {
            kind,
            elapsed: 0.0,
            duration,
            start,
            target,
        }
    }

    /// Moves the transition forward by `dt` and returns the geometry to write.
    /// Snaps exactly to the target once the duration has elapsed.
    pub fn advance(&mut self, dt: f32) -> (BodyGeometry, TransitionStatus) {
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            return (self.target, TransitionStatus::Completed);
        }
        let t = (self.elapsed / self.duration).min(1.0);
        (self.start.lerp(&self.target, t), TransitionStatus::Running)
    }

    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        }
    }
}

/// Holds at most one live geometry transition.
#[derive(Debug, Default)]
pub struct TransitionSlot {
    active: Option<(TransitionHandle, GeometryTransition)>,
    generation: u64,
}

impl TransitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the running transition, if any, then installs `transition`.
    pub fn install(&mut self, transition: GeometryTransition) -> TransitionHandle {
        self.cancel();
        self.generation += 1;
        let handle = TransitionHandle {
            generation: self.generation,
            kind: transition.kind,
        };
        debug!(
            kind = ?transition.kind,
            generation = handle.generation,
            duration = transition.duration,
            "transition started"
        );
        self.active = Some((handle, transition));
        handle
    }

    /// Abandons the running transition without rewinding geometry.
    pub fn cancel(&mut self) -> Option<TransitionKind> {
        let (handle, transition) = self.active.take()?;
        debug!(
            kind = ?handle.kind,
            generation = handle.generation,
            progress = transition.progress(),
            "transition cancelled"
        );
        Some(handle.kind)
    }

    pub fn is_live(&self, handle: TransitionHandle) -> bool {
        matches!(&self.active, Some((live, _)) if *live == handle)
    }

    pub fn active_kind(&self) -> Option<TransitionKind> {
        self.active.as_ref().map(|(handle, _)| handle.kind)
    }

    pub fn active(&self) -> Option<&GeometryTransition> {
        self.active.as_ref().map(|(_, transition)| transition)
    }

    /// Resumes the live transition for one tick, writing into `geometry`.
    /// Returns the kind of a transition that completed on this tick.
    pub fn advance(&mut self, dt: f32, geometry: &mut BodyGeometry) -> Option<TransitionKind> {
        let (handle, transition) = self.active.as_mut()?;
        let (next, status) = transition.advance(dt);
        *geometry = next;
        match status {
            TransitionStatus::Running => None,
            TransitionStatus::Completed => {
                let kind = handle.kind;
                debug!(kind = ?kind, generation = handle.generation, "transition completed");
                self.active = None;
                Some(kind)
            }
        }
    }
}

/// A plain countdown resumed once per decision tick. Used for the slide
/// window and the jump cooldown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedTask {
    pub elapsed: f32,
    pub duration: f32,
}

impl TimedTask {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn advance(&mut self, dt: f32) -> TransitionStatus {
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            TransitionStatus::Completed
        } else {
            TransitionStatus::Running
        }
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}
