//! The per-user session store.
//!
//! Sessions are persisted one field per key (`{user_id}_{field}`) in a
//! [`KvStore`] backend.  `load` never fails: missing keys fall back to
//! defaults and corrupt values are logged and treated as absent.
//! `flush` is a sparse update: only non-empty fields are written, so a
//! partially populated in-memory session never erases stored values.
//! `clear` is the only operation that removes data.

use std::sync::Arc;

use tb_domain::dates::{format_wire_date, parse_wire_date};
use tb_domain::entity::{Offer, SearchType};
use tb_domain::error::Result;

use crate::kv::KvStore;
use crate::session::Session;
use crate::state::SessionState;

const F_STATE: &str = "state";
const F_SEARCH_TYPE: &str = "search_type";
const F_PLACE_FROM: &str = "place_from";
const F_PLACE_TO: &str = "place_to";
const F_HOTEL: &str = "hotel";
const F_DATE_FROM: &str = "date_from";
const F_DATE_TO: &str = "date_to";
const F_RESULT: &str = "result";

/// Every field key a session may own, for `clear`.
const ALL_FIELDS: &[&str] = &[
    F_STATE,
    F_SEARCH_TYPE,
    F_PLACE_FROM,
    F_PLACE_TO,
    F_HOTEL,
    F_DATE_FROM,
    F_DATE_TO,
    F_RESULT,
];

/// Session persistence over an injected key-value backend.
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(user_id: i64, field: &str) -> String {
        format!("{user_id}_{field}")
    }

    /// Load the session for `user_id`, defaulting every missing or
    /// corrupt field.  Never fails.
    pub fn load(&self, user_id: i64) -> Session {
        let mut session = Session::new(user_id);

        if let Some(raw) = self.field(user_id, F_STATE) {
            match SessionState::parse(&raw) {
                Some(state) => session.state = state,
                None => corrupt(user_id, F_STATE, &raw),
            }
        }
        if let Some(raw) = self.field(user_id, F_SEARCH_TYPE) {
            match SearchType::parse(&raw) {
                Some(t) => session.search_type = Some(t),
                None => corrupt(user_id, F_SEARCH_TYPE, &raw),
            }
        }
        session.place_from = self.int_field(user_id, F_PLACE_FROM);
        session.place_to = self.int_field(user_id, F_PLACE_TO);
        session.hotel = self.int_field(user_id, F_HOTEL);
        session.date_from = self.date_field(user_id, F_DATE_FROM);
        session.date_to = self.date_field(user_id, F_DATE_TO);
        if let Some(raw) = self.field(user_id, F_RESULT) {
            match serde_json::from_str::<Vec<Offer>>(&raw) {
                Ok(offers) => session.result = Some(offers),
                Err(_) => corrupt(user_id, F_RESULT, &raw),
            }
        }

        session
    }

    /// Write every non-empty field of `session`.  Unset fields are left
    /// alone in the backend.
    pub fn flush(&self, session: &Session) -> Result<()> {
        let uid = session.user_id;
        self.kv
            .set(&Self::key(uid, F_STATE), session.state.as_str())?;

        if let Some(t) = session.search_type {
            self.kv.set(&Self::key(uid, F_SEARCH_TYPE), t.as_str())?;
        }
        if let Some(id) = session.place_from {
            self.kv.set(&Self::key(uid, F_PLACE_FROM), &id.to_string())?;
        }
        if let Some(id) = session.place_to {
            self.kv.set(&Self::key(uid, F_PLACE_TO), &id.to_string())?;
        }
        if let Some(id) = session.hotel {
            self.kv.set(&Self::key(uid, F_HOTEL), &id.to_string())?;
        }
        if let Some(d) = session.date_from {
            self.kv
                .set(&Self::key(uid, F_DATE_FROM), &format_wire_date(d))?;
        }
        if let Some(d) = session.date_to {
            self.kv
                .set(&Self::key(uid, F_DATE_TO), &format_wire_date(d))?;
        }
        if let Some(ref offers) = session.result {
            self.kv
                .set(&Self::key(uid, F_RESULT), &serde_json::to_string(offers)?)?;
        }

        Ok(())
    }

    /// Delete every known key for `user_id`.
    pub fn clear(&self, user_id: i64) -> Result<()> {
        for field in ALL_FIELDS {
            self.kv.del(&Self::key(user_id, field))?;
        }
        Ok(())
    }

    // ── Field readers ──────────────────────────────────────────────

    fn field(&self, user_id: i64, field: &str) -> Option<String> {
        self.kv.get(&Self::key(user_id, field))
    }

    fn int_field(&self, user_id: i64, field: &str) -> Option<i64> {
        let raw = self.field(user_id, field)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                corrupt(user_id, field, &raw);
                None
            }
        }
    }

    fn date_field(&self, user_id: i64, field: &str) -> Option<chrono::NaiveDate> {
        let raw = self.field(user_id, field)?;
        match parse_wire_date(&raw) {
            Some(d) => Some(d),
            None => {
                corrupt(user_id, field, &raw);
                None
            }
        }
    }
}

fn corrupt(user_id: i64, field: &str, raw: &str) {
    tracing::warn!(user_id, field, raw, "corrupt stored value, treating as absent");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use chrono::NaiveDate;
    use tb_domain::entity::Offer;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryKv::new()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn load_missing_user_yields_defaults() {
        let s = store().load(99);
        assert_eq!(s, Session::new(99));
    }

    #[test]
    fn flush_then_load_round_trips_every_field() {
        let store = store();
        let mut s = Session::new(5);
        s.state = SessionState::SelectDateTo;
        s.search_type = Some(SearchType::ByPlace);
        s.place_from = Some(101);
        s.place_to = Some(202);
        s.date_from = Some(date(2024, 6, 10));
        s.date_to = Some(date(2024, 6, 15));
        s.result = Some(vec![Offer {
            name: "Hotel Aurora".into(),
            id: 7,
            price: 480.0,
            booking_url: "https://example.test/book/7".into(),
            date_from: date(2024, 6, 10),
            duration_days: 5,
        }]);

        store.flush(&s).unwrap();
        assert_eq!(store.load(5), s);
    }

    #[test]
    fn flush_is_sparse_and_preserves_stored_fields() {
        let store = store();
        let mut full = Session::new(5);
        full.state = SessionState::SelectDateFrom;
        full.search_type = Some(SearchType::ByHotel);
        full.hotel = Some(33);
        full.place_from = Some(44);
        store.flush(&full).unwrap();

        // A partially populated object must not wipe what is stored.
        let mut partial = Session::new(5);
        partial.state = SessionState::SelectDateTo;
        partial.date_from = Some(date(2024, 7, 1));
        store.flush(&partial).unwrap();

        let loaded = store.load(5);
        assert_eq!(loaded.state, SessionState::SelectDateTo);
        assert_eq!(loaded.hotel, Some(33));
        assert_eq!(loaded.place_from, Some(44));
        assert_eq!(loaded.date_from, Some(date(2024, 7, 1)));
    }

    #[test]
    fn clear_removes_everything() {
        let store = store();
        let mut s = Session::new(5);
        s.state = SessionState::SearchSuccess;
        s.search_type = Some(SearchType::ByPlace);
        s.place_to = Some(1);
        store.flush(&s).unwrap();

        store.clear(5).unwrap();
        assert_eq!(store.load(5), Session::new(5));
    }

    #[test]
    fn sessions_are_namespaced_by_user() {
        let store = store();
        let mut a = Session::new(1);
        a.place_from = Some(10);
        store.flush(&a).unwrap();

        let b = store.load(2);
        assert!(b.place_from.is_none());
    }

    #[test]
    fn corrupt_values_are_treated_as_absent() {
        let kv = Arc::new(MemoryKv::new());
        kv.set("5_state", "no_such_state").unwrap();
        kv.set("5_place_from", "twelve").unwrap();
        kv.set("5_date_from", "10.06.2024").unwrap(); // wrong format
        kv.set("5_search_type", "by_boat").unwrap();
        kv.set("5_result", "[{broken").unwrap();

        let s = SessionStore::new(kv).load(5);
        assert_eq!(s.state, SessionState::INITIAL);
        assert!(s.place_from.is_none());
        assert!(s.date_from.is_none());
        assert!(s.search_type.is_none());
        assert!(s.result.is_none());
    }
}
