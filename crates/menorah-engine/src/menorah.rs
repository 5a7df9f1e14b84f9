//! The menorah: owns every component and routes input between them.

use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::Serialize;

use crate::api::game::{EngineContext, MenorahConfig, MenorahLayout};
use crate::api::types::{CandleId, DisplayEvent};
use crate::calendar::{override_from_raw, CalendarResolver, FestivalDay};
use crate::candles::{is_available, required_count, CandleStateStore, CANDLE_COUNT};
use crate::input::queue::{InputEvent, InputQueue, Modifiers};
use crate::interaction::{DragProximityEngine, IgniterLifecycle, IgniterPhase};
use crate::media::{CompletionMediaController, MediaState};
use crate::storage::KeyValueStore;

/// Custom event kinds from the page UI.
pub mod custom_events {
    /// `a` = day 1..=8, 0 clears the override.
    pub const SET_OVERRIDE_DAY: u32 = 1;
    pub const RESET: u32 = 2;
    pub const TOGGLE_PLAYBACK: u32 = 3;
    pub const TOGGLE_SLOW_MOTION: u32 = 4;
    /// `a` = token of the video that failed.
    pub const MEDIA_LOAD_FAILED: u32 = 5;
}

/// DOM keyCode of `D`; Ctrl+Alt+D toggles developer mode.
const KEY_D: u32 = 68;

/// Info-panel view of the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub day: Option<FestivalDay>,
    pub override_day: Option<FestivalDay>,
    pub lit_count: u8,
    pub required: u8,
    pub label: String,
    /// Festival panels are shown during the festival or with an override.
    pub sections_visible: bool,
    /// The third blessing is only said on the first night.
    pub show_first_night_blessing: bool,
    pub developer_mode: bool,
    pub igniter: IgniterPhase,
    pub media: MediaState,
}

pub struct Menorah {
    config: MenorahConfig,
    calendar: CalendarResolver,
    store: CandleStateStore,
    igniter: IgniterLifecycle,
    proximity: DragProximityEngine,
    media: CompletionMediaController,
    override_day: Option<FestivalDay>,
    developer_mode: bool,
    now: DateTime<Utc>,
}

impl Menorah {
    pub fn new(config: MenorahConfig) -> Self {
        Self {
            calendar: CalendarResolver::new(config.calendar.clone()),
            store: CandleStateStore::new(config.storage_key.clone()),
            igniter: IgniterLifecycle::from_config(&config),
            proximity: DragProximityEngine::from_config(&config),
            media: CompletionMediaController::new(config.media.clone(), config.slow_motion_rate),
            override_day: None,
            developer_mode: false,
            now: DateTime::<Utc>::UNIX_EPOCH,
            config,
        }
    }

    pub fn config(&self) -> &MenorahConfig {
        &self.config
    }

    pub fn layout(&self) -> &MenorahLayout {
        &self.config.layout
    }

    pub fn store(&self) -> &CandleStateStore {
        &self.store
    }

    pub fn igniter(&self) -> &IgniterLifecycle {
        &self.igniter
    }

    pub fn media(&self) -> &CompletionMediaController {
        &self.media
    }

    pub fn day(&self) -> Option<FestivalDay> {
        self.store.day()
    }

    /// Read-only signal for the page's developer surfaces.
    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }

    /// Replace the measured geometry (e.g. after a resize).
    pub fn set_layout(&mut self, layout: MenorahLayout) {
        self.config.layout = layout;
    }

    /// Restore persisted state for the current day and announce everything.
    pub fn init(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, now: DateTime<Utc>) {
        self.now = now;
        let day = self.calendar.resolve(now, self.override_day);
        self.store.load(kv, day);

        if self.store.is_lit(CandleId::Igniter) && self.igniter.on_lit() {
            ctx.emit_event(DisplayEvent::IgniterLit);
        }
        self.announce_day(ctx);
        for index in 1..=CANDLE_COUNT {
            if self.store.is_lit(CandleId::Candle(index)) {
                ctx.emit_event(DisplayEvent::CandleLit { index });
            }
        }
        self.media.show_initial(ctx, day);
        log::info!(
            "menorah initialized (day {:?}, {} lit)",
            day.map(FestivalDay::get),
            self.store.lit_count()
        );
    }

    /// One frame: follow the calendar, apply queued input in order, then
    /// advance the tilt countdown.
    pub fn update(
        &mut self,
        ctx: &mut EngineContext,
        kv: &mut dyn KeyValueStore,
        input: &InputQueue,
        dt: f32,
        now: DateTime<Utc>,
    ) {
        self.now = now;
        let day = self.calendar.resolve(now, self.override_day);
        if day != self.store.day() {
            self.apply_day(ctx, kv, day);
        }

        for event in input.iter() {
            self.handle_input(ctx, kv, *event);
        }

        if self.igniter.tick(dt) {
            ctx.emit_event(DisplayEvent::IgniterRotated {
                angle: self.igniter.rotation(),
            });
        }
    }

    fn handle_input(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, event: InputEvent) {
        match event {
            InputEvent::Click { x, y } => self.click(ctx, kv, Vec2::new(x, y)),
            InputEvent::PointerDown { x, y } => {
                if self.igniter.pointer_down(Vec2::new(x, y), &self.config.layout) {
                    log::debug!("drag started ({:?})", self.igniter.phase());
                }
            }
            InputEvent::PointerMove { x, y } => {
                if let Some((pos, tilted)) = self.igniter.pointer_move(Vec2::new(x, y)) {
                    ctx.emit_event(DisplayEvent::IgniterMoved { pos });
                    if tilted {
                        self.check_proximity(ctx, kv);
                    }
                }
            }
            InputEvent::PointerUp { .. } => {
                if self.igniter.pointer_up() {
                    ctx.emit_event(DisplayEvent::IgniterReturned);
                    self.clear_ready(ctx);
                    // A day restored complete has nothing left to light.
                    self.media.evaluate(ctx, &mut self.store);
                }
            }
            InputEvent::KeyDown { key_code, modifiers } => {
                if key_code == KEY_D && modifiers.contains(Modifiers::CTRL.union(Modifiers::ALT)) {
                    self.developer_mode = !self.developer_mode;
                    log::info!("developer mode: {}", if self.developer_mode { "ON" } else { "OFF" });
                    ctx.emit_event(DisplayEvent::DeveloperMode {
                        enabled: self.developer_mode,
                    });
                }
            }
            InputEvent::KeyUp { .. } => {}
            InputEvent::Custom { kind, a, .. } => self.handle_custom(ctx, kv, kind, a),
        }
    }

    fn handle_custom(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, kind: u32, a: f32) {
        match kind {
            custom_events::SET_OVERRIDE_DAY => self.set_override(ctx, kv, override_from_raw(a as u32)),
            custom_events::RESET => self.reset(ctx, kv),
            custom_events::TOGGLE_PLAYBACK => self.media.toggle_playback(ctx),
            custom_events::TOGGLE_SLOW_MOTION => self.media.toggle_slow_motion(ctx),
            custom_events::MEDIA_LOAD_FAILED => self.media.on_load_failed(ctx, a as u32),
            other => log::debug!("ignoring custom event {other}"),
        }
    }

    /// Only the igniter responds to clicks, and only while unlit and at rest.
    fn click(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, pos: Vec2) {
        if self.igniter.is_dragging() || self.store.is_lit(CandleId::Igniter) {
            return;
        }
        if !self.igniter.hit_test(pos, &self.config.layout) {
            return;
        }
        if self.store.light_igniter(kv) && self.igniter.on_lit() {
            ctx.emit_event(DisplayEvent::IgniterLit);
        }
    }

    fn check_proximity(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore) {
        let flame = self.igniter.flame_point(&self.config.layout);
        let outcome = self.proximity.evaluate(
            flame,
            &self.config.layout,
            self.store.state(),
            self.store.day(),
        );
        for (index, ready) in outcome.ready_changes {
            ctx.emit_event(DisplayEvent::CandleReady { index, ready });
        }
        for index in outcome.to_light {
            if !self.store.light_candle(kv, index) {
                continue;
            }
            if self.proximity.unmark(index) {
                ctx.emit_event(DisplayEvent::CandleReady { index, ready: false });
            }
            ctx.emit_event(DisplayEvent::CandleLit { index });
            ctx.emit_event(DisplayEvent::CandleCelebrate { index });
            self.media.evaluate(ctx, &mut self.store);
        }
    }

    fn set_override(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, day: Option<FestivalDay>) {
        if day == self.override_day {
            return;
        }
        self.override_day = day;
        self.store.clear_completion();
        let resolved = self.calendar.resolve(self.now, day);
        self.apply_day(ctx, kv, resolved);
    }

    fn apply_day(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore, day: Option<FestivalDay>) {
        log::info!("festival day is now {:?}", day.map(FestivalDay::get));
        self.clear_ready(ctx);
        for index in self.store.recompute_availability(kv, day) {
            ctx.emit_event(DisplayEvent::CandleExtinguished { index });
        }
        self.announce_day(ctx);
        self.media.evaluate(ctx, &mut self.store);
    }

    /// Extinguish everything and return the igniter home, unlit.
    pub fn reset(&mut self, ctx: &mut EngineContext, kv: &mut dyn KeyValueStore) {
        self.igniter.reset();
        self.clear_ready(ctx);
        for index in 1..=CANDLE_COUNT {
            if self.store.is_lit(CandleId::Candle(index)) {
                ctx.emit_event(DisplayEvent::CandleExtinguished { index });
            }
        }
        self.store.reset_all(kv);
        ctx.emit_event(DisplayEvent::IgniterExtinguished);
        ctx.emit_event(DisplayEvent::IgniterReturned);
        self.media.reset(ctx, self.store.day());
        log::info!("menorah reset");
    }

    fn clear_ready(&mut self, ctx: &mut EngineContext) {
        for index in self.proximity.clear_ready() {
            ctx.emit_event(DisplayEvent::CandleReady { index, ready: false });
        }
    }

    fn announce_day(&self, ctx: &mut EngineContext) {
        let day = self.store.day();
        ctx.emit_event(DisplayEvent::DayChanged { day });
        ctx.emit_event(DisplayEvent::SectionsVisible {
            visible: day.is_some(),
        });
        for index in 1..=CANDLE_COUNT {
            ctx.emit_event(DisplayEvent::CandleAvailable {
                index,
                available: is_available(day, index),
            });
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        let day = self.store.day();
        let lit_count = self.store.lit_count();
        let required = required_count(day);
        // An override reads the same as the real day.
        let label = match day {
            Some(d) => format!("Day {}: {lit_count}/{required}", d.get()),
            None => "Not Hanukkah - Select test day".to_string(),
        };
        StatusSnapshot {
            day,
            override_day: self.override_day,
            lit_count,
            required,
            label,
            sections_visible: day.is_some(),
            show_first_night_blessing: day == Some(FestivalDay::FIRST),
            developer_mode: self.developer_mode,
            igniter: self.igniter.phase(),
            media: self.media.snapshot(),
        }
    }
}
