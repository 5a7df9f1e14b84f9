pub mod api;
pub mod bridge;
pub mod calendar;
pub mod candles;
pub mod core;
pub mod error;
pub mod input;
pub mod interaction;
pub mod media;
pub mod menorah;
pub mod storage;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, MenorahConfig, MenorahLayout};
pub use api::types::{CandleId, DisplayEvent, GameEvent, MediaCommand, VideoFit};
pub use bridge::protocol::EventBuffer;
pub use calendar::{CalendarResolver, DateTable, FestivalDay};
pub use candles::{CandleState, CandleStateStore};
pub use crate::core::time::DelayedTask;
pub use error::{ConfigError, StateError, StorageError};
pub use input::queue::{InputEvent, InputQueue, Modifiers};
pub use interaction::{DragProximityEngine, IgniterLifecycle, IgniterPhase};
pub use media::{CompletionMediaController, MediaManifest, MediaMode, MediaState};
pub use menorah::{custom_events, Menorah, StatusSnapshot};
pub use storage::{KeyValueStore, MemoryStore};
