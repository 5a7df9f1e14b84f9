use glam::Vec2;
use serde::Serialize;

use crate::api::game::{MenorahConfig, MenorahLayout};
use crate::core::time::DelayedTask;

/// Where the igniter is in its light → tilt → drag → return cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgniterPhase {
    Unlit,
    LitUpright,
    LitTilted,
    /// `tilted` records the phase the drag started from; only a tilted
    /// igniter can light candles.
    Dragging { tilted: bool },
}

/// Position of a dragged igniter. Exists only while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGrip {
    pub center: Vec2,
    /// Pointer position minus igniter centre at drag start.
    pub offset: Vec2,
}

/// State machine for the igniter.
///
/// ```text
/// unlit --lit--> upright --delay--> tilted
/// upright|tilted --down--> dragging --up--> upright
/// any --reset--> unlit
/// ```
#[derive(Debug)]
pub struct IgniterLifecycle {
    phase: IgniterPhase,
    tilt_timer: Option<DelayedTask>,
    grip: Option<DragGrip>,
    tilt_delay: f32,
    tilt_angle: f32,
}

impl IgniterLifecycle {
    pub fn new(tilt_delay: f32, tilt_angle: f32) -> Self {
        Self {
            phase: IgniterPhase::Unlit,
            tilt_timer: None,
            grip: None,
            tilt_delay,
            tilt_angle,
        }
    }

    pub fn from_config(config: &MenorahConfig) -> Self {
        Self::new(config.tilt_delay, config.tilt_angle)
    }

    pub fn phase(&self) -> IgniterPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, IgniterPhase::Dragging { .. })
    }

    pub fn is_tilted(&self) -> bool {
        matches!(
            self.phase,
            IgniterPhase::LitTilted | IgniterPhase::Dragging { tilted: true }
        )
    }

    pub fn tilt_pending(&self) -> bool {
        self.tilt_timer.is_some()
    }

    pub fn grip(&self) -> Option<DragGrip> {
        self.grip
    }

    /// Current rotation in radians.
    pub fn rotation(&self) -> f32 {
        if self.is_tilted() {
            self.tilt_angle
        } else {
            0.0
        }
    }

    /// The igniter caught fire. Starts the tilt countdown.
    pub fn on_lit(&mut self) -> bool {
        if self.phase != IgniterPhase::Unlit {
            return false;
        }
        self.rest_upright();
        true
    }

    /// Advance the tilt countdown. Returns true when the igniter tilts.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.phase != IgniterPhase::LitUpright {
            return false;
        }
        let Some(timer) = self.tilt_timer.as_mut() else {
            return false;
        };
        if !timer.advance(dt) {
            return false;
        }
        self.tilt_timer = None;
        self.phase = IgniterPhase::LitTilted;
        log::debug!("igniter tilted");
        true
    }

    /// Centre of the igniter: the drag position, or home at rest.
    pub fn center(&self, layout: &MenorahLayout) -> Vec2 {
        self.grip.map_or(layout.igniter_home, |g| g.center)
    }

    /// Whether `pos` falls inside the (possibly rotated) igniter.
    pub fn hit_test(&self, pos: Vec2, layout: &MenorahLayout) -> bool {
        let local = Vec2::from_angle(-self.rotation()).rotate(pos - self.center(layout));
        let half = layout.igniter_size * 0.5;
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    /// Flame centre, following the current tilt.
    pub fn flame_point(&self, layout: &MenorahLayout) -> Vec2 {
        self.center(layout) + Vec2::from_angle(self.rotation()).rotate(layout.flame_offset)
    }

    /// Start a drag if lit, at rest and grabbed on the igniter itself.
    /// Cancels a pending tilt.
    pub fn pointer_down(&mut self, pos: Vec2, layout: &MenorahLayout) -> bool {
        let tilted = match self.phase {
            IgniterPhase::LitUpright => false,
            IgniterPhase::LitTilted => true,
            _ => return false,
        };
        if !self.hit_test(pos, layout) {
            return false;
        }
        self.tilt_timer = None;
        let center = layout.igniter_home;
        self.grip = Some(DragGrip {
            center,
            offset: pos - center,
        });
        self.phase = IgniterPhase::Dragging { tilted };
        true
    }

    /// Follow the pointer. Returns the new centre and whether proximity
    /// checks apply (the drag started tilted).
    pub fn pointer_move(&mut self, pos: Vec2) -> Option<(Vec2, bool)> {
        let IgniterPhase::Dragging { tilted } = self.phase else {
            return None;
        };
        let grip = self.grip.as_mut()?;
        grip.center = pos - grip.offset;
        Some((grip.center, tilted))
    }

    /// End the drag: back home, upright, tilt countdown re-armed.
    pub fn pointer_up(&mut self) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.grip = None;
        self.rest_upright();
        true
    }

    /// Back to unlit: no timer, no grip, no rotation.
    pub fn reset(&mut self) {
        self.phase = IgniterPhase::Unlit;
        self.tilt_timer = None;
        self.grip = None;
    }

    fn rest_upright(&mut self) {
        self.phase = IgniterPhase::LitUpright;
        self.tilt_timer = Some(DelayedTask::new(self.tilt_delay));
    }
}
