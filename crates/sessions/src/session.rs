//! The per-user session record.

use chrono::NaiveDate;

use tb_domain::entity::{Offer, SearchType};

use crate::state::SessionState;

/// One user's conversation state, loaded and flushed around every
/// inbound message.
///
/// Optional fields are populated strictly in wizard order; the owning
/// step handler is the only writer of each field.  `result` is kept
/// just long enough to serve a repost follow-up after a successful
/// search.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: i64,
    pub state: SessionState,
    pub search_type: Option<SearchType>,
    pub place_from: Option<i64>,
    pub place_to: Option<i64>,
    pub hotel: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub result: Option<Vec<Offer>>,
}

impl Session {
    /// A fresh session at the first wizard step with nothing filled in.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: SessionState::INITIAL,
            search_type: None,
            place_from: None,
            place_to: None,
            hotel: None,
            date_from: None,
            date_to: None,
            result: None,
        }
    }

    /// The destination id for the active search mode, whichever of
    /// `place_to`/`hotel` the branch filled in.
    pub fn dest_or_hotel(&self) -> Option<i64> {
        match self.search_type? {
            SearchType::ByPlace => self.place_to,
            SearchType::ByHotel => self.hotel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty_at_initial_state() {
        let s = Session::new(7);
        assert_eq!(s.state, SessionState::INITIAL);
        assert!(s.search_type.is_none());
        assert!(s.place_from.is_none());
        assert!(s.date_from.is_none());
        assert!(s.result.is_none());
    }

    #[test]
    fn dest_follows_search_type() {
        let mut s = Session::new(7);
        s.place_to = Some(11);
        s.hotel = Some(22);

        assert_eq!(s.dest_or_hotel(), None);
        s.search_type = Some(SearchType::ByPlace);
        assert_eq!(s.dest_or_hotel(), Some(11));
        s.search_type = Some(SearchType::ByHotel);
        assert_eq!(s.dest_or_hotel(), Some(22));
    }
}
