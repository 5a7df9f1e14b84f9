use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{DisplayEvent, MediaCommand};
use crate::calendar::DateTable;
use crate::error::ConfigError;
use crate::media::MediaManifest;

/// Screen geometry measured by the page, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenorahLayout {
    /// Wick centres, candle 1 first.
    pub wicks: [Vec2; 8],
    /// Centre of the igniter at rest.
    pub igniter_home: Vec2,
    /// Unrotated igniter bounds used for hit testing.
    pub igniter_size: Vec2,
    /// Flame centre relative to the igniter centre, upright.
    pub flame_offset: Vec2,
}

impl Default for MenorahLayout {
    fn default() -> Self {
        let x = [130.0, 190.0, 250.0, 310.0, 490.0, 550.0, 610.0, 670.0];
        Self {
            wicks: x.map(|x| Vec2::new(x, 300.0)),
            igniter_home: Vec2::new(400.0, 290.0),
            igniter_size: Vec2::new(30.0, 140.0),
            flame_offset: Vec2::new(0.0, -85.0),
        }
    }
}

impl MenorahLayout {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Wick centre of candle `index` (1..=8).
    pub fn wick(&self, index: u8) -> Option<Vec2> {
        let slot = usize::from(index).checked_sub(1)?;
        self.wicks.get(slot).copied()
    }
}

/// Engine configuration, provided by the page as JSON.
/// Every field is optional; omitted ones keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenorahConfig {
    /// Seconds the lit igniter stays upright before tilting.
    pub tilt_delay: f32,
    /// Tilt rotation in radians (negative leans left).
    pub tilt_angle: f32,
    /// Flame-to-wick distance that lights a candle.
    pub near_threshold: f32,
    /// Extra distance beyond `near_threshold` that shows ready feedback.
    pub ready_margin: f32,
    pub slow_motion_rate: f32,
    /// Local storage key holding the candle map.
    pub storage_key: String,
    /// Maximum number of packed events per frame.
    pub max_events: usize,
    pub layout: MenorahLayout,
    /// `null` disables the calendar; only the override can select a day.
    pub calendar: Option<DateTable>,
    pub media: MediaManifest,
}

impl Default for MenorahConfig {
    fn default() -> Self {
        Self {
            tilt_delay: 3.0,
            tilt_angle: -std::f32::consts::FRAC_PI_4,
            near_threshold: 25.0,
            ready_margin: 40.0,
            slow_motion_rate: 0.5,
            storage_key: "hanukkahMenorah".into(),
            max_events: 64,
            layout: MenorahLayout::default(),
            calendar: Some(DateTable::hanukkah_2025()),
            media: MediaManifest::default(),
        }
    }
}

impl MenorahConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Distance under which a candle shows ready feedback.
    pub fn ready_threshold(&self) -> f32 {
        self.near_threshold + self.ready_margin
    }
}

/// Per-frame output of the engine: notifications for the renderer and
/// requests for the media layer, in emission order.
pub struct EngineContext {
    pub events: Vec<DisplayEvent>,
    pub media: Vec<MediaCommand>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
            media: Vec::with_capacity(8),
        }
    }

    /// Emit a display event to be forwarded to TypeScript.
    /// Only the latest igniter position of a frame is kept.
    pub fn emit_event(&mut self, event: DisplayEvent) {
        if matches!(event, DisplayEvent::IgniterMoved { .. }) {
            self.events
                .retain(|e| !matches!(e, DisplayEvent::IgniterMoved { .. }));
        }
        self.events.push(event);
    }

    /// Emit a media request to be forwarded to TypeScript.
    pub fn emit_media(&mut self, command: MediaCommand) {
        self.media.push(command);
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
        self.media.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
