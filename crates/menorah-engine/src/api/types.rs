use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::calendar::FestivalDay;

/// Identity of a candle on the menorah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleId {
    /// The shamash, the draggable lighting candle.
    Igniter,
    /// A regular candle, index 1..=8 from left to right.
    Candle(u8),
}

/// A visual-state notification for the rendering layer.
/// The core decides; JS only applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayEvent {
    CandleLit { index: u8 },
    CandleExtinguished { index: u8 },
    /// Flame is close enough for pre-light feedback (or no longer is).
    CandleReady { index: u8, ready: bool },
    /// One-shot celebration pulse after a candle catches.
    CandleCelebrate { index: u8 },
    /// Whether the candle body is shown for the current day.
    CandleAvailable { index: u8, available: bool },
    IgniterLit,
    IgniterExtinguished,
    /// Rotation (radians) applied to the resting igniter; 0 means upright.
    IgniterRotated { angle: f32 },
    /// New igniter centre while dragging.
    IgniterMoved { pos: Vec2 },
    /// Drag ended; igniter is back at its home position, upright.
    IgniterReturned,
    /// Festival panels (menorah, blessings, info) shown or hidden.
    SectionsVisible { visible: bool },
    DayChanged { day: Option<FestivalDay> },
    DeveloperMode { enabled: bool },
}

/// How a background video should be fitted to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFit {
    /// Portrait footage: fit height, centre horizontally.
    Contain,
    /// Landscape footage: fill the screen.
    Cover,
}

/// A request for the media layer. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaCommand {
    /// Show a still background; `None` selects the off-season image.
    ShowImage { day: Option<FestivalDay> },
    /// Show the day's video. Load failures must be reported with `token`.
    ShowVideo { day: FestivalDay, token: u32, fit: VideoFit },
    StartAudio,
    StopAudio,
    /// Resume video and audio.
    Play,
    /// Pause video and audio.
    Pause,
    /// Video playback rate.
    SetRate { rate: f32 },
}

/// A game event communicated from Rust to TypeScript via a flat buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}
