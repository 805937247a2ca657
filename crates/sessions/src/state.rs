//! The conversation state machine.
//!
//! States form a single linear wizard with one early branch (hotel vs
//! place search) that converges again at the departure-city step.  The
//! only cycle is the universal reset back to the first step.
//!
//! `apply` is a pure function over a static transition table; it never
//! mutates anything, so callers decide what to do with an
//! `InvalidTransition` (the driver treats it as unrecognized input and
//! re-sends the current prompt).

use tb_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// States
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A step of the search wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    SelectType,
    SelectHotel,
    SelectTourPlace,
    SelectPlaceFrom,
    SelectDateFrom,
    SelectDateTo,
    SearchSuccess,
    SearchFail,
}

impl SessionState {
    pub const INITIAL: Self = Self::SelectType;

    /// Stable string form used by the session store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectType => "select_type",
            Self::SelectHotel => "select_hotel",
            Self::SelectTourPlace => "select_tour_place",
            Self::SelectPlaceFrom => "select_place_from",
            Self::SelectDateFrom => "select_date_from",
            Self::SelectDateTo => "select_date_to",
            Self::SearchSuccess => "search_success",
            Self::SearchFail => "search_fail",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). `None` for unknown input so
    /// a corrupt stored state degrades to the initial step instead of
    /// failing the load path.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "select_type" => Some(Self::SelectType),
            "select_hotel" => Some(Self::SelectHotel),
            "select_tour_place" => Some(Self::SelectTourPlace),
            "select_place_from" => Some(Self::SelectPlaceFrom),
            "select_date_from" => Some(Self::SelectDateFrom),
            "select_date_to" => Some(Self::SelectDateTo),
            "search_success" => Some(Self::SearchSuccess),
            "search_fail" => Some(Self::SearchFail),
            _ => None,
        }
    }

    /// Terminal states accept only the reset trigger.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SearchSuccess | Self::SearchFail)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Triggers + transition table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An event that may advance the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Universal: back to the first step from anywhere.
    Reset,
    ChooseHotelSearch,
    ChoosePlaceSearch,
    DestinationChosen,
    OriginChosen,
    DateFromChosen,
    SearchSucceeded,
    SearchFailed,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::ChooseHotelSearch => "choose_hotel_search",
            Self::ChoosePlaceSearch => "choose_place_search",
            Self::DestinationChosen => "destination_chosen",
            Self::OriginChosen => "origin_chosen",
            Self::DateFromChosen => "date_from_chosen",
            Self::SearchSucceeded => "search_succeeded",
            Self::SearchFailed => "search_failed",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Transition {
    trigger: Trigger,
    sources: &'static [SessionState],
    dest: SessionState,
}

use SessionState::*;

/// Guarded transitions. `Reset` is handled before the table is
/// consulted (source = any).
const TRANSITIONS: &[Transition] = &[
    Transition {
        trigger: Trigger::ChooseHotelSearch,
        sources: &[SelectType],
        dest: SelectHotel,
    },
    Transition {
        trigger: Trigger::ChoosePlaceSearch,
        sources: &[SelectType],
        dest: SelectTourPlace,
    },
    Transition {
        trigger: Trigger::DestinationChosen,
        sources: &[SelectHotel, SelectTourPlace],
        dest: SelectPlaceFrom,
    },
    Transition {
        trigger: Trigger::OriginChosen,
        sources: &[SelectPlaceFrom],
        dest: SelectDateFrom,
    },
    Transition {
        trigger: Trigger::DateFromChosen,
        sources: &[SelectDateFrom],
        dest: SelectDateTo,
    },
    Transition {
        trigger: Trigger::SearchSucceeded,
        sources: &[SelectDateTo],
        dest: SearchSuccess,
    },
    Transition {
        trigger: Trigger::SearchFailed,
        sources: &[SelectDateTo],
        dest: SearchFail,
    },
];

/// Resolve `(state, trigger)` against the transition table.
///
/// Returns the destination state, or `InvalidTransition` when the
/// trigger's declared sources exclude the current state.
pub fn apply(state: SessionState, trigger: Trigger) -> Result<SessionState> {
    if trigger == Trigger::Reset {
        return Ok(SessionState::INITIAL);
    }

    TRANSITIONS
        .iter()
        .find(|t| t.trigger == trigger && t.sources.contains(&state))
        .map(|t| t.dest)
        .ok_or_else(|| Error::InvalidTransition {
            state: state.to_string(),
            trigger: trigger.to_string(),
        })
}
