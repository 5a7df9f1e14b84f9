use chrono::{DateTime, Utc};
use menorah_engine::{
    EngineContext, EventBuffer, InputEvent, InputQueue, KeyValueStore, Menorah, MenorahConfig,
    MenorahLayout, StatusSnapshot,
};

/// Wires the menorah to a persistence backend and the flat event buffer.
///
/// The page owns one runner in a `thread_local!` and drives it through the
/// free functions in `lib.rs`, because wasm-bindgen cannot export generic
/// structs directly.
pub struct MenorahRunner<S: KeyValueStore> {
    menorah: Menorah,
    ctx: EngineContext,
    input: InputQueue,
    store: S,
    events: EventBuffer,
    now: DateTime<Utc>,
    initialized: bool,
}

/// Page clock in epoch milliseconds, or `None` if out of range.
pub fn from_epoch_ms(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

impl<S: KeyValueStore> MenorahRunner<S> {
    pub fn new(config: MenorahConfig, store: S) -> Self {
        let events = EventBuffer::from_config(&config);
        Self {
            menorah: Menorah::new(config),
            ctx: EngineContext::new(),
            input: InputQueue::new(),
            store,
            events,
            now: DateTime::<Utc>::UNIX_EPOCH,
            initialized: false,
        }
    }

    /// Restore state and publish the opening events. Call once.
    pub fn init(&mut self, now_ms: f64) {
        self.advance_clock(now_ms);
        self.ctx.clear_frame_data();
        self.menorah.init(&mut self.ctx, &mut self.store, self.now);
        self.events.pack(&self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: apply queued input, advance timers, pack events.
    pub fn tick(&mut self, dt: f32, now_ms: f64) {
        if !self.initialized {
            return;
        }
        self.advance_clock(now_ms);

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        self.menorah
            .update(&mut self.ctx, &mut self.store, &self.input, dt, self.now);

        // Drain input after update
        self.input.drain();

        self.events.pack(&self.ctx);
    }

    fn advance_clock(&mut self, now_ms: f64) {
        match from_epoch_ms(now_ms) {
            Some(now) => self.now = now,
            None => log::warn!("ignoring invalid clock value {now_ms}"),
        }
    }

    pub fn set_layout(&mut self, layout: MenorahLayout) {
        self.menorah.set_layout(layout);
    }

    pub fn menorah(&self) -> &Menorah {
        &self.menorah
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status(&self) -> StatusSnapshot {
        self.menorah.status()
    }

    pub fn status_json(&self) -> String {
        serde_json::to_string(&self.menorah.status()).unwrap_or_else(|e| {
            log::error!("failed to serialize status: {e}");
            "{}".to_string()
        })
    }

    pub fn media_json(&self) -> String {
        serde_json::to_string(&self.menorah.media().snapshot()).unwrap_or_else(|e| {
            log::error!("failed to serialize media state: {e}");
            "{}".to_string()
        })
    }

    pub fn developer_mode(&self) -> bool {
        self.menorah.developer_mode()
    }

    // ---- Pointer accessors for buffer reads ----

    pub fn events_ptr(&self) -> *const f32 {
        self.events.as_ptr()
    }

    pub fn events_len(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn event_count(&self) -> u32 {
        self.events.event_count() as u32
    }

    pub fn max_events(&self) -> u32 {
        self.events.max_events() as u32
    }
}
