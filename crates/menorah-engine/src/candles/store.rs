use serde::{Deserialize, Serialize};

use crate::api::types::CandleId;
use crate::calendar::FestivalDay;
use crate::candles::availability::{can_light, is_available, CANDLE_COUNT};
use crate::error::StateError;
use crate::storage::KeyValueStore;

/// Lit status of the igniter and the eight regular candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CandleState {
    pub igniter: bool,
    /// Candle `i` lives at `candles[i - 1]`.
    pub candles: [bool; CANDLE_COUNT as usize],
}

impl CandleState {
    pub fn is_lit(&self, id: CandleId) -> bool {
        match id {
            CandleId::Igniter => self.igniter,
            CandleId::Candle(i) => slot(i).is_some_and(|s| self.candles[s]),
        }
    }

    /// Lit regular candles; the igniter does not count.
    pub fn lit_count(&self) -> u8 {
        self.candles.iter().filter(|&&lit| lit).count() as u8
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PersistedCandles::from(*self))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<PersistedCandles>(json).map(Self::from)
    }
}

fn slot(index: u8) -> Option<usize> {
    (1..=CANDLE_COUNT).contains(&index).then(|| index as usize - 1)
}

/// Wire shape of the persisted map. Every key is required.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCandles {
    igniter: bool,
    candle_1: bool,
    candle_2: bool,
    candle_3: bool,
    candle_4: bool,
    candle_5: bool,
    candle_6: bool,
    candle_7: bool,
    candle_8: bool,
}

impl From<CandleState> for PersistedCandles {
    fn from(s: CandleState) -> Self {
        let [c1, c2, c3, c4, c5, c6, c7, c8] = s.candles;
        Self {
            igniter: s.igniter,
            candle_1: c1,
            candle_2: c2,
            candle_3: c3,
            candle_4: c4,
            candle_5: c5,
            candle_6: c6,
            candle_7: c7,
            candle_8: c8,
        }
    }
}

impl From<PersistedCandles> for CandleState {
    fn from(p: PersistedCandles) -> Self {
        Self {
            igniter: p.igniter,
            candles: [
                p.candle_1, p.candle_2, p.candle_3, p.candle_4,
                p.candle_5, p.candle_6, p.candle_7, p.candle_8,
            ],
        }
    }
}

/// Owner of the candle state and the per-day completion flag.
///
/// All writes go through these methods and are persisted immediately.
/// Persistence failures are logged; memory stays authoritative.
#[derive(Debug)]
pub struct CandleStateStore {
    state: CandleState,
    day: Option<FestivalDay>,
    completion_triggered: bool,
    key: String,
}

impl CandleStateStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            state: CandleState::default(),
            day: None,
            completion_triggered: false,
            key: key.into(),
        }
    }

    pub fn state(&self) -> &CandleState {
        &self.state
    }

    pub fn day(&self) -> Option<FestivalDay> {
        self.day
    }

    pub fn is_lit(&self, id: CandleId) -> bool {
        self.state.is_lit(id)
    }

    pub fn lit_count(&self) -> u8 {
        self.state.lit_count()
    }

    /// Restore from storage. Only resumes inside the festival; anything
    /// missing, unreadable or malformed starts from all-unlit.
    /// Returns the candles extinguished while reconciling with `day`.
    pub fn load(&mut self, store: &mut dyn KeyValueStore, day: Option<FestivalDay>) -> Vec<u8> {
        self.day = day;
        self.completion_triggered = false;
        if day.is_none() {
            self.reset_all(store);
            return Vec::new();
        }
        match self.read_persisted(store) {
            Ok(Some(saved)) => {
                self.state = saved;
                log::info!("restored candle state ({} lit)", self.state.lit_count());
                let extinguished = self.extinguish_unavailable();
                self.persist(store);
                extinguished
            }
            Ok(None) => {
                self.reset_all(store);
                Vec::new()
            }
            Err(e) => {
                log::warn!("discarding saved candle state: {e}");
                self.reset_all(store);
                Vec::new()
            }
        }
    }

    fn read_persisted(&self, store: &dyn KeyValueStore) -> Result<Option<CandleState>, StateError> {
        let Some(payload) = store.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(CandleState::from_json(&payload)?))
    }

    /// Light the igniter. Returns false if it was already lit.
    pub fn light_igniter(&mut self, store: &mut dyn KeyValueStore) -> bool {
        if self.state.igniter {
            return false;
        }
        self.state.igniter = true;
        self.persist(store);
        true
    }

    /// Light candle `index`. A silent no-op unless the igniter is lit, the
    /// candle is lightable today and not already lit.
    pub fn light_candle(&mut self, store: &mut dyn KeyValueStore, index: u8) -> bool {
        let Some(s) = slot(index) else {
            return false;
        };
        if !self.state.igniter || !can_light(self.day, index) || self.state.candles[s] {
            return false;
        }
        self.state.candles[s] = true;
        self.persist(store);
        true
    }

    /// Extinguish everything, clear storage and the completion flag.
    pub fn reset_all(&mut self, store: &mut dyn KeyValueStore) {
        self.state = CandleState::default();
        self.completion_triggered = false;
        if let Err(e) = store.remove(&self.key) {
            log::warn!("failed to clear saved candle state: {e}");
        }
    }

    /// Enough regular candles lit for the current day. Never true off-season.
    pub fn is_day_complete(&self) -> bool {
        self.day
            .is_some_and(|d| self.state.lit_count() >= d.get())
    }

    /// Adopt a new day: extinguish candles it does not unlock and persist.
    /// The completion flag is cleared when the day actually changes.
    pub fn recompute_availability(
        &mut self,
        store: &mut dyn KeyValueStore,
        day: Option<FestivalDay>,
    ) -> Vec<u8> {
        if self.day != day {
            self.completion_triggered = false;
        }
        self.day = day;
        let extinguished = self.extinguish_unavailable();
        self.persist(store);
        extinguished
    }

    pub fn completion_triggered(&self) -> bool {
        self.completion_triggered
    }

    pub fn mark_completion_triggered(&mut self) {
        self.completion_triggered = true;
    }

    pub fn clear_completion(&mut self) {
        self.completion_triggered = false;
    }

    fn extinguish_unavailable(&mut self) -> Vec<u8> {
        let day = self.day;
        (1..=CANDLE_COUNT)
            .filter(|&i| !is_available(day, i))
            .filter(|&i| std::mem::take(&mut self.state.candles[i as usize - 1]))
            .collect()
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        let result = self
            .state
            .to_json()
            .map_err(StateError::from)
            .and_then(|json| store.set(&self.key, &json).map_err(StateError::from));
        if let Err(e) = result {
            log::warn!("failed to save candle state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::FailingStore;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    const KEY: &str = "menorah";

    fn day(n: u8) -> Option<FestivalDay> {
        FestivalDay::new(n)
    }

    fn lit_store(d: u8) -> (CandleStateStore, MemoryStore) {
        let mut kv = MemoryStore::new();
        let mut store = CandleStateStore::new(KEY);
        store.load(&mut kv, day(d));
        assert!(store.light_igniter(&mut kv));
        (store, kv)
    }

    #[test]
    fn persisted_json_uses_candle_keys() {
        let mut state = CandleState::default();
        state.igniter = true;
        state.candles[7] = true;
        let json = state.to_json().unwrap();
        assert!(json.contains("\"candle_8\":true"));
        assert!(json.contains("\"igniter\":true"));
        assert_eq!(CandleState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn light_candle_requires_lit_igniter() {
        let mut kv = MemoryStore::new();
        let mut store = CandleStateStore::new(KEY);
        store.load(&mut kv, day(8));
        assert!(!store.light_candle(&mut kv, 8));
        assert!(!store.is_lit(CandleId::Candle(8)));
    }

    #[test]
    fn light_candle_is_idempotent() {
        let (mut store, mut kv) = lit_store(3);
        assert!(store.light_candle(&mut kv, 8));
        let once = *store.state();
        assert!(!store.light_candle(&mut kv, 8));
        assert_eq!(*store.state(), once);
    }

    #[test]
    fn unavailable_candle_is_rejected() {
        let (mut store, mut kv) = lit_store(2);
        assert!(!store.light_candle(&mut kv, 5));
        assert!(!store.is_lit(CandleId::Candle(5)));
        assert!(!store.light_candle(&mut kv, 0));
        assert!(!store.light_candle(&mut kv, 9));
    }

    #[test]
    fn nothing_lights_off_season() {
        let mut kv = MemoryStore::new();
        let mut store = CandleStateStore::new(KEY);
        store.load(&mut kv, None);
        store.light_igniter(&mut kv);
        assert!(!store.light_candle(&mut kv, 8));
        assert!(!store.is_day_complete());
    }

    #[test]
    fn every_mutation_persists() {
        let (mut store, mut kv) = lit_store(1);
        store.light_candle(&mut kv, 8);
        let saved = CandleState::from_json(&kv.get(KEY).unwrap().unwrap()).unwrap();
        assert!(saved.igniter);
        assert!(saved.candles[7]);
    }

    #[test]
    fn load_restores_only_available_candles() {
        let saved = CandleState { igniter: true, candles: [true; 8] };
        let mut kv = MemoryStore::with_entry(KEY, saved.to_json().unwrap());
        let mut store = CandleStateStore::new(KEY);
        let extinguished = store.load(&mut kv, day(3));
        assert_eq!(extinguished, vec![1, 2, 3, 4, 5]);
        assert!(store.is_lit(CandleId::Igniter));
        assert_eq!(store.lit_count(), 3);
        assert!(store.is_day_complete());
    }

    #[test]
    fn load_off_season_resets_and_clears_storage() {
        let saved = CandleState { igniter: true, candles: [true; 8] };
        let mut kv = MemoryStore::with_entry(KEY, saved.to_json().unwrap());
        let mut store = CandleStateStore::new(KEY);
        store.load(&mut kv, None);
        assert_eq!(*store.state(), CandleState::default());
        assert!(kv.get(KEY).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_falls_back_to_unlit() {
        for payload in ["not json", "{\"igniter\": true}", "{\"igniter\": 1}"] {
            let mut kv = MemoryStore::with_entry(KEY, payload);
            let mut store = CandleStateStore::new(KEY);
            store.load(&mut kv, day(4));
            assert_eq!(*store.state(), CandleState::default(), "payload {payload}");
            assert!(kv.get(KEY).unwrap().is_none());
        }
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut kv = FailingStore::default();
        let mut store = CandleStateStore::new(KEY);
        store.load(&mut kv, day(1));
        assert!(store.light_igniter(&mut kv));
        assert!(store.light_candle(&mut kv, 8));
        assert!(store.is_day_complete());
        assert_eq!(kv.write_attempts, 2);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut store, mut kv) = lit_store(1);
        store.light_candle(&mut kv, 8);
        store.mark_completion_triggered();
        store.reset_all(&mut kv);
        assert_eq!(*store.state(), CandleState::default());
        assert!(!store.completion_triggered());
        assert!(kv.get(KEY).unwrap().is_none());
    }

    #[test]
    fn day_change_clears_completion_flag() {
        let (mut store, mut kv) = lit_store(1);
        store.mark_completion_triggered();
        store.recompute_availability(&mut kv, day(1));
        assert!(store.completion_triggered());
        store.recompute_availability(&mut kv, day(2));
        assert!(!store.completion_triggered());
    }

    #[test]
    fn completion_counts_regular_candles_only() {
        let (mut store, mut kv) = lit_store(2);
        store.light_candle(&mut kv, 8);
        assert!(!store.is_day_complete());
        store.light_candle(&mut kv, 7);
        assert!(store.is_day_complete());
    }

    proptest! {
        #[test]
        fn recompute_leaves_no_unavailable_candle_lit(
            candles in proptest::array::uniform8(any::<bool>()),
            d in 1u8..=8,
        ) {
            let saved = CandleState { igniter: true, candles };
            let mut kv = MemoryStore::with_entry(KEY, saved.to_json().unwrap());
            let mut store = CandleStateStore::new(KEY);
            store.load(&mut kv, day(8));
            store.recompute_availability(&mut kv, day(d));
            for i in 1..=8u8 {
                if !is_available(day(d), i) {
                    prop_assert!(!store.is_lit(CandleId::Candle(i)));
                } else {
                    prop_assert_eq!(store.is_lit(CandleId::Candle(i)), candles[i as usize - 1]);
                }
            }
        }

        #[test]
        fn load_round_trips_restricted_to_day(
            candles in proptest::array::uniform8(any::<bool>()),
            igniter in any::<bool>(),
            d in 1u8..=8,
        ) {
            let saved = CandleState { igniter, candles };
            let mut kv = MemoryStore::with_entry(KEY, saved.to_json().unwrap());
            let mut store = CandleStateStore::new(KEY);
            store.load(&mut kv, day(d));
            prop_assert_eq!(store.is_lit(CandleId::Igniter), igniter);
            for i in 1..=8u8 {
                let expected = candles[i as usize - 1] && i >= 9 - d;
                prop_assert_eq!(store.is_lit(CandleId::Candle(i)), expected);
            }
        }
    }
}
