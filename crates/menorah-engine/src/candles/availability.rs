//! Right-to-left progressive unlock.
//!
//! On day D the candles with index `i >= 9 - D` are available: day 1
//! unlocks candle 8 only, day 8 unlocks all of them.

use crate::calendar::FestivalDay;

/// Number of regular candles (the igniter is not counted).
pub const CANDLE_COUNT: u8 = 8;

/// Whether candle `index` (1..=8) is shown for `day`.
/// Outside the festival every holder is shown (effective day 8).
pub fn is_available(day: Option<FestivalDay>, index: u8) -> bool {
    if !(1..=CANDLE_COUNT).contains(&index) {
        return false;
    }
    let effective = day.map_or(CANDLE_COUNT, FestivalDay::get);
    index >= CANDLE_COUNT + 1 - effective
}

/// Whether candle `index` may actually be lit. Nothing can be lit
/// without a day in progress.
pub fn can_light(day: Option<FestivalDay>, index: u8) -> bool {
    day.is_some() && is_available(day, index)
}

/// Candles that must be lit to complete `day`.
pub fn required_count(day: Option<FestivalDay>) -> u8 {
    day.map_or(0, FestivalDay::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_and_last_day() {
        let d1 = FestivalDay::new(1);
        assert!(is_available(d1, 8));
        assert!(!is_available(d1, 7));
        let d8 = FestivalDay::new(8);
        assert!((1..=8).all(|i| is_available(d8, i)));
    }

    #[test]
    fn off_season_shows_all_but_lights_none() {
        assert!((1..=8).all(|i| is_available(None, i)));
        assert!((1..=8).all(|i| !can_light(None, i)));
        assert_eq!(required_count(None), 0);
    }

    #[test]
    fn out_of_range_index_is_never_available() {
        assert!(!is_available(FestivalDay::new(8), 0));
        assert!(!is_available(FestivalDay::new(8), 9));
    }

    proptest! {
        #[test]
        fn matches_unlock_rule(day in 1u8..=8, index in 1u8..=8) {
            let d = FestivalDay::new(day);
            prop_assert_eq!(is_available(d, index), index >= 9 - day);
            prop_assert_eq!(can_light(d, index), index >= 9 - day);
        }

        #[test]
        fn available_count_equals_day(day in 1u8..=8) {
            let d = FestivalDay::new(day);
            let count = (1..=8).filter(|&i| is_available(d, i)).count();
            prop_assert_eq!(count as u8, required_count(d));
        }
    }
}
