pub mod availability;
pub mod store;

pub use availability::{can_light, is_available, required_count, CANDLE_COUNT};
pub use store::{CandleState, CandleStateStore};
