//! Flame-to-wick proximity decisions while the igniter is dragged.
//!
//! Pure decision logic: the engine reports which candles changed their
//! "ready" feedback and which should light, the caller applies it.

use glam::Vec2;

use crate::api::game::{MenorahConfig, MenorahLayout};
use crate::api::types::CandleId;
use crate::calendar::FestivalDay;
use crate::candles::{can_light, CandleState, CANDLE_COUNT};

/// Result of one proximity pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityOutcome {
    /// Candles whose ready mark flipped, with the new value.
    pub ready_changes: Vec<(u8, bool)>,
    /// Candles the flame touched, ascending.
    pub to_light: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DragProximityEngine {
    near: f32,
    ready: f32,
    marks: [bool; CANDLE_COUNT as usize],
}

impl DragProximityEngine {
    pub fn new(near: f32, ready: f32) -> Self {
        Self {
            near,
            ready,
            marks: [false; CANDLE_COUNT as usize],
        }
    }

    pub fn from_config(config: &MenorahConfig) -> Self {
        Self::new(config.near_threshold, config.ready_threshold())
    }

    pub fn is_ready(&self, index: u8) -> bool {
        slot(index).is_some_and(|s| self.marks[s])
    }

    /// Evaluate every unlit, lightable candle in ascending order.
    /// Overlapping candles all light in the same pass.
    pub fn evaluate(
        &mut self,
        flame: Vec2,
        layout: &MenorahLayout,
        state: &CandleState,
        day: Option<FestivalDay>,
    ) -> ProximityOutcome {
        let mut outcome = ProximityOutcome::default();
        for index in 1..=CANDLE_COUNT {
            if state.is_lit(CandleId::Candle(index)) || !can_light(day, index) {
                continue;
            }
            let Some(wick) = layout.wick(index) else {
                continue;
            };
            let distance = flame.distance(wick);

            let ready = distance < self.ready;
            let mark = &mut self.marks[index as usize - 1];
            if *mark != ready {
                *mark = ready;
                outcome.ready_changes.push((index, ready));
            }
            if distance < self.near {
                outcome.to_light.push(index);
            }
        }
        outcome
    }

    /// Drop the ready mark of a candle that just lit.
    /// Returns true if it was marked.
    pub fn unmark(&mut self, index: u8) -> bool {
        slot(index).is_some_and(|s| std::mem::take(&mut self.marks[s]))
    }

    /// Drop every ready mark, returning the candles that had one.
    pub fn clear_ready(&mut self) -> Vec<u8> {
        (1..=CANDLE_COUNT)
            .filter(|&i| std::mem::take(&mut self.marks[i as usize - 1]))
            .collect()
    }
}

fn slot(index: u8) -> Option<usize> {
    (1..=CANDLE_COUNT).contains(&index).then(|| index as usize - 1)
}
