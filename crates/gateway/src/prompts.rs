//! User-facing message text, kept in one place so handlers and tests
//! agree on exact wording.

pub const WELCOME: &str = "Welcome!";

pub const BTN_BY_CITY: &str = "Search by city";
pub const BTN_BY_HOTEL: &str = "Search by hotel";

pub const SELECT_TYPE: &str =
    "Choose a search type: \"Search by city\" or \"Search by hotel\"";

pub const ASK_DEST_CITY: &str = "Enter the city you want to travel to:";
pub const ASK_DEST_HOTEL: &str = "Enter the hotel you want to stay at:";
pub const ASK_ORIGIN: &str = "Enter the city you are departing from:";
pub const ASK_DATE_FROM: &str = "Enter the departure date as DD.MM.YYYY:";
pub const ASK_DATE_TO: &str = "Enter the last day of the trip as DD.MM.YYYY:";

pub const CITY_NOT_FOUND: &str = "No city with that name was found, try again";
pub const HOTEL_NOT_FOUND: &str = "No hotel with that name was found, try again";
pub const BAD_DATE: &str = "That is not a valid date, try again";
pub const DATE_BEFORE_START: &str =
    "The end of the trip must not be earlier than its start";

pub const SEARCHING: &str = "Searching for tours...";
pub const FOUND_HEADER: &str = "Found the following tours for your query:";
pub const NOTHING_FOUND: &str =
    "Unfortunately nothing was found for your query. Send /new to start over.";
pub const SEARCH_ERROR: &str =
    "Something went wrong while searching. Please try again.";

pub const TERMINAL_HINT: &str = "Send /new to start a new search.";
pub const POST_DONE: &str = "Posted the result to registered channels.";
pub const NO_CHANNELS: &str = "No channels are registered.";
pub const NO_RESULT_TO_POST: &str = "There is no search result to post.";
pub const CHANNEL_ADDED: &str = "Channel registered.";
pub const CHANNEL_REMOVED: &str = "Channel removed.";
pub const CHANNEL_USAGE: &str = "Usage: /addchannel <chat id> or /delchannel <chat id>";
