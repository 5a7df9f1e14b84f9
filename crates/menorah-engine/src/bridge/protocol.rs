/// Flat event buffer shared with the page.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 4 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Each event is `kind, a, b, c`. Display notifications use kinds below
/// 100, media requests 100 and up. Media requests are packed first.

use crate::api::game::{EngineContext, MenorahConfig};
use crate::api::types::{DisplayEvent, GameEvent, MediaCommand, VideoFit};
use crate::calendar::FestivalDay;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 4;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_MAX_EVENTS: usize = 1;
pub const HEADER_EVENT_COUNT: usize = 2;
/// Events dropped this frame because the buffer was full.
pub const HEADER_DROPPED: usize = 3;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Display event kinds.
pub mod display_kind {
    /// a = candle
    pub const CANDLE_LIT: f32 = 1.0;
    /// a = candle
    pub const CANDLE_EXTINGUISHED: f32 = 2.0;
    /// a = candle, b = 1 ready / 0 not
    pub const CANDLE_READY: f32 = 3.0;
    /// a = candle
    pub const CANDLE_CELEBRATE: f32 = 4.0;
    /// a = candle, b = 1 shown / 0 hidden
    pub const CANDLE_AVAILABLE: f32 = 5.0;
    pub const IGNITER_LIT: f32 = 10.0;
    pub const IGNITER_EXTINGUISHED: f32 = 11.0;
    /// a = angle in radians
    pub const IGNITER_ROTATED: f32 = 12.0;
    /// a = x, b = y
    pub const IGNITER_MOVED: f32 = 13.0;
    pub const IGNITER_RETURNED: f32 = 14.0;
    /// a = 1 visible / 0 hidden
    pub const SECTIONS_VISIBLE: f32 = 20.0;
    /// a = day, 0 off-season
    pub const DAY_CHANGED: f32 = 21.0;
    /// a = 1 on / 0 off
    pub const DEVELOPER_MODE: f32 = 22.0;
}

/// Media request kinds.
pub mod media_kind {
    /// a = day, 0 for the default image
    pub const SHOW_IMAGE: f32 = 100.0;
    /// a = day, b = token, c = fit (0 contain, 1 cover)
    pub const SHOW_VIDEO: f32 = 101.0;
    pub const START_AUDIO: f32 = 102.0;
    pub const STOP_AUDIO: f32 = 103.0;
    pub const PLAY: f32 = 104.0;
    pub const PAUSE: f32 = 105.0;
    /// a = playback rate
    pub const SET_RATE: f32 = 106.0;
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn day_value(day: Option<FestivalDay>) -> f32 {
    day.map_or(0.0, |d| f32::from(d.get()))
}

pub fn encode_display(event: &DisplayEvent) -> GameEvent {
    use display_kind::*;
    match *event {
        DisplayEvent::CandleLit { index } => GameEvent::new(CANDLE_LIT, index.into(), 0.0, 0.0),
        DisplayEvent::CandleExtinguished { index } => {
            GameEvent::new(CANDLE_EXTINGUISHED, index.into(), 0.0, 0.0)
        }
        DisplayEvent::CandleReady { index, ready } => {
            GameEvent::new(CANDLE_READY, index.into(), flag(ready), 0.0)
        }
        DisplayEvent::CandleCelebrate { index } => {
            GameEvent::new(CANDLE_CELEBRATE, index.into(), 0.0, 0.0)
        }
        DisplayEvent::CandleAvailable { index, available } => {
            GameEvent::new(CANDLE_AVAILABLE, index.into(), flag(available), 0.0)
        }
        DisplayEvent::IgniterLit => GameEvent::new(IGNITER_LIT, 0.0, 0.0, 0.0),
        DisplayEvent::IgniterExtinguished => GameEvent::new(IGNITER_EXTINGUISHED, 0.0, 0.0, 0.0),
        DisplayEvent::IgniterRotated { angle } => GameEvent::new(IGNITER_ROTATED, angle, 0.0, 0.0),
        DisplayEvent::IgniterMoved { pos } => GameEvent::new(IGNITER_MOVED, pos.x, pos.y, 0.0),
        DisplayEvent::IgniterReturned => GameEvent::new(IGNITER_RETURNED, 0.0, 0.0, 0.0),
        DisplayEvent::SectionsVisible { visible } => {
            GameEvent::new(SECTIONS_VISIBLE, flag(visible), 0.0, 0.0)
        }
        DisplayEvent::DayChanged { day } => GameEvent::new(DAY_CHANGED, day_value(day), 0.0, 0.0),
        DisplayEvent::DeveloperMode { enabled } => {
            GameEvent::new(DEVELOPER_MODE, flag(enabled), 0.0, 0.0)
        }
    }
}

pub fn encode_media(command: &MediaCommand) -> GameEvent {
    use media_kind::*;
    match *command {
        MediaCommand::ShowImage { day } => GameEvent::new(SHOW_IMAGE, day_value(day), 0.0, 0.0),
        MediaCommand::ShowVideo { day, token, fit } => {
            let fit = match fit {
                VideoFit::Contain => 0.0,
                VideoFit::Cover => 1.0,
            };
            GameEvent::new(SHOW_VIDEO, day_value(Some(day)), token as f32, fit)
        }
        MediaCommand::StartAudio => GameEvent::new(START_AUDIO, 0.0, 0.0, 0.0),
        MediaCommand::StopAudio => GameEvent::new(STOP_AUDIO, 0.0, 0.0, 0.0),
        MediaCommand::Play => GameEvent::new(PLAY, 0.0, 0.0, 0.0),
        MediaCommand::Pause => GameEvent::new(PAUSE, 0.0, 0.0, 0.0),
        MediaCommand::SetRate { rate } => GameEvent::new(SET_RATE, rate, 0.0, 0.0),
    }
}

/// Fixed-capacity buffer the page reads after every frame.
pub struct EventBuffer {
    data: Vec<f32>,
    max_events: usize,
}

impl EventBuffer {
    pub fn new(max_events: usize) -> Self {
        let mut data = vec![0.0; HEADER_FLOATS + max_events * GameEvent::FLOATS];
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        data[HEADER_MAX_EVENTS] = max_events as f32;
        Self { data, max_events }
    }

    pub fn from_config(config: &MenorahConfig) -> Self {
        Self::new(config.max_events)
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    pub fn event_count(&self) -> usize {
        self.data[HEADER_EVENT_COUNT] as usize
    }

    pub fn dropped(&self) -> usize {
        self.data[HEADER_DROPPED] as usize
    }

    /// Replace the buffer contents with this frame's output:
    /// media requests first, then display events, each in emission order.
    pub fn pack(&mut self, ctx: &EngineContext) {
        let encoded = ctx
            .media
            .iter()
            .map(encode_media)
            .chain(ctx.events.iter().map(encode_display));

        let (header, body) = self.data.split_at_mut(HEADER_FLOATS);
        let slots: &mut [GameEvent] = bytemuck::cast_slice_mut(body);
        let mut count = 0;
        let mut dropped = 0;
        for event in encoded {
            match slots.get_mut(count) {
                Some(slot) => {
                    *slot = event;
                    count += 1;
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            log::warn!("event buffer full: dropped {dropped} of {} events", count + dropped);
        }
        header[HEADER_EVENT_COUNT] = count as f32;
        header[HEADER_DROPPED] = dropped as f32;
    }

    /// Packed events of the last frame.
    pub fn events(&self) -> &[GameEvent] {
        let body: &[GameEvent] = bytemuck::cast_slice(&self.data[HEADER_FLOATS..]);
        &body[..self.event_count()]
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    /// Total buffer length in floats.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
