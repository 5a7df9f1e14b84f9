//! Browser bridge: `#[wasm_bindgen]` exports over a single `MenorahRunner`.
//!
//! Per frame the page pushes input, calls `menorah_tick`, then reads the
//! packed event buffer through `get_events_ptr` / `get_events_len`.

use std::cell::RefCell;

use menorah_engine::{InputEvent, MenorahConfig, MenorahLayout, Modifiers};
use wasm_bindgen::prelude::*;

pub mod runner;
pub mod storage;

pub use runner::MenorahRunner;
pub use storage::LocalStorage;

thread_local! {
    static RUNNER: RefCell<Option<MenorahRunner<LocalStorage>>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&mut MenorahRunner<LocalStorage>) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow.as_mut().expect("Menorah not initialized. Call menorah_init() first.");
        f(runner)
    })
}

/// Create the runner. An empty or invalid `config_json` falls back to the
/// built-in configuration.
#[wasm_bindgen]
pub fn menorah_init(config_json: &str, now_ms: f64) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        MenorahConfig::default()
    } else {
        MenorahConfig::from_json(config_json).unwrap_or_else(|e| {
            log::error!("{e}; using default config");
            MenorahConfig::default()
        })
    };

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(MenorahRunner::new(config, LocalStorage));
    });

    with_runner(|r| r.init(now_ms));
    log::info!("menorah: initialized");
}

#[wasm_bindgen]
pub fn menorah_tick(dt: f32, now_ms: f64) {
    with_runner(|r| r.tick(dt, now_ms));
}

#[wasm_bindgen]
pub fn menorah_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
}

#[wasm_bindgen]
pub fn menorah_pointer_up(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
}

#[wasm_bindgen]
pub fn menorah_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn menorah_click(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::Click { x, y }));
}

/// `modifiers` is a bit set: 1 ctrl, 2 alt, 4 shift, 8 meta.
#[wasm_bindgen]
pub fn menorah_key_down(key_code: u32, modifiers: u8) {
    with_runner(|r| {
        r.push_input(InputEvent::KeyDown {
            key_code,
            modifiers: Modifiers::from_bits_truncate(modifiers),
        })
    });
}

#[wasm_bindgen]
pub fn menorah_key_up(key_code: u32) {
    with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
}

/// UI controls and media callbacks; see `menorah_engine::custom_events`.
#[wasm_bindgen]
pub fn menorah_custom_event(kind: u32, a: f32, b: f32, c: f32) {
    with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
}

#[wasm_bindgen]
pub fn menorah_set_layout(layout_json: &str) {
    match MenorahLayout::from_json(layout_json) {
        Ok(layout) => with_runner(|r| r.set_layout(layout)),
        Err(e) => log::warn!("ignoring layout: {e}"),
    }
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr())
}

/// Buffer length in floats, header included.
#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_runner(|r| r.events_len())
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_runner(|r| r.max_events())
}

#[wasm_bindgen]
pub fn get_status_json() -> String {
    with_runner(|r| r.status_json())
}

#[wasm_bindgen]
pub fn get_media_json() -> String {
    with_runner(|r| r.media_json())
}

#[wasm_bindgen]
pub fn menorah_developer_mode() -> bool {
    with_runner(|r| r.developer_mode())
}
