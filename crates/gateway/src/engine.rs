//! The per-message engine.
//!
//! Every inbound message runs one turn: acquire the user's lock, load
//! the session, route by its current state, let the step handler
//! mutate + flush, and hand back the outbound instructions.  Routing is
//! by state, not message content; only `/start` and `/new` bypass it
//! as the universal reset.

use std::sync::Arc;

use tb_catalog::CatalogResolver;
use tb_domain::config::Config;
use tb_domain::dates::parse_user_date;
use tb_domain::entity::{CatalogKind, Offer, SearchType};
use tb_domain::error::Result;
use tb_providers::TravelProvider;
use tb_search::{SearchOrchestrator, SearchOutcome};
use tb_sessions::{
    apply, KvStore, Session, SessionState, SessionStore, Trigger, UserLockMap,
};

use crate::channels::ChannelRegistry;
use crate::outbound::Outbound;
use crate::prompts;

/// One inbound chat message.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub user_id: i64,
    pub chat: i64,
    pub message_id: i64,
    pub text: String,
}

/// The conversation driver core.
pub struct Engine {
    store: SessionStore,
    locks: UserLockMap,
    resolver: CatalogResolver,
    orchestrator: SearchOrchestrator,
    channels: ChannelRegistry,
}

impl Engine {
    pub fn new(
        kv: Arc<dyn KvStore>,
        provider: Arc<dyn TravelProvider>,
        config: &Config,
    ) -> Self {
        Self {
            store: SessionStore::new(kv.clone()),
            locks: UserLockMap::new(),
            resolver: CatalogResolver::new(provider.clone()),
            orchestrator: SearchOrchestrator::new(
                provider,
                config.search.clone(),
                config.provider.adult_count,
            ),
            channels: ChannelRegistry::new(kv),
        }
    }

    /// Number of users with a tracked session lock.
    pub fn tracked_users(&self) -> usize {
        self.locks.user_count()
    }

    /// Drop lock entries for users with no turn in flight.  Called
    /// periodically so the lock map does not grow without bound.
    pub fn prune_idle_locks(&self) {
        self.locks.prune_idle();
    }

    /// Run one turn for an inbound message.
    ///
    /// Handler failures (provider outages and the like) do not bubble:
    /// the user gets a generic failure message and the session stays on
    /// the same step so the input can simply be retried.
    pub async fn handle_message(&self, msg: &Inbound) -> Result<Vec<Outbound>> {
        let _permit = self.locks.acquire(msg.user_id).await;
        let text = msg.text.trim().to_owned();

        if let Some(out) = self.handle_command(msg, &text)? {
            return Ok(out);
        }

        let mut session = self.store.load(msg.user_id);
        match self.dispatch(&mut session, msg, &text).await {
            Ok(out) => Ok(out),
            Err(e) => {
                tracing::error!(user_id = msg.user_id, error = %e, "turn failed");
                Ok(vec![send(msg.chat, prompts::SEARCH_ERROR)])
            }
        }
    }

    // ── Commands (state-independent) ───────────────────────────────

    fn handle_command(&self, msg: &Inbound, text: &str) -> Result<Option<Vec<Outbound>>> {
        if text == "/start" || text == "/new" {
            self.store.clear(msg.user_id)?;
            let mut out = Vec::new();
            if text == "/start" {
                out.push(send(msg.chat, prompts::WELCOME));
            }
            out.push(send(msg.chat, prompts::SELECT_TYPE));
            return Ok(Some(out));
        }

        if let Some(arg) = text.strip_prefix("/addchannel") {
            return Ok(Some(match arg.trim().parse::<i64>() {
                Ok(chat) => {
                    self.channels.register(chat)?;
                    vec![send(msg.chat, prompts::CHANNEL_ADDED)]
                }
                Err(_) => vec![send(msg.chat, prompts::CHANNEL_USAGE)],
            }));
        }
        if let Some(arg) = text.strip_prefix("/delchannel") {
            return Ok(Some(match arg.trim().parse::<i64>() {
                Ok(chat) => {
                    self.channels.unregister(chat)?;
                    vec![send(msg.chat, prompts::CHANNEL_REMOVED)]
                }
                Err(_) => vec![send(msg.chat, prompts::CHANNEL_USAGE)],
            }));
        }

        Ok(None)
    }

    // ── State routing ──────────────────────────────────────────────

    async fn dispatch(
        &self,
        session: &mut Session,
        msg: &Inbound,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        match session.state {
            SessionState::SelectType => self.select_type(session, msg.chat, text),
            SessionState::SelectHotel | SessionState::SelectTourPlace => {
                self.select_destination(session, msg.chat, text).await
            }
            SessionState::SelectPlaceFrom => self.select_origin(session, msg.chat, text).await,
            SessionState::SelectDateFrom => self.select_date_from(session, msg.chat, text),
            SessionState::SelectDateTo => self.select_date_to(session, msg.chat, text).await,
            SessionState::SearchSuccess | SessionState::SearchFail => {
                Ok(self.terminal(session, msg.chat, text))
            }
        }
    }

    // ── Step handlers ──────────────────────────────────────────────

    fn select_type(
        &self,
        session: &mut Session,
        chat: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let (search_type, trigger, prompt) = match text {
            prompts::BTN_BY_CITY => (
                SearchType::ByPlace,
                Trigger::ChoosePlaceSearch,
                prompts::ASK_DEST_CITY,
            ),
            prompts::BTN_BY_HOTEL => (
                SearchType::ByHotel,
                Trigger::ChooseHotelSearch,
                prompts::ASK_DEST_HOTEL,
            ),
            _ => return Ok(vec![send(chat, prompts::SELECT_TYPE)]),
        };

        session.search_type = Some(search_type);
        session.state = apply(session.state, trigger)?;
        self.store.flush(session)?;
        Ok(vec![send(chat, prompt)])
    }

    async fn select_destination(
        &self,
        session: &mut Session,
        chat: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let (kind, not_found) = if session.state == SessionState::SelectHotel {
            (CatalogKind::Hotels, prompts::HOTEL_NOT_FOUND)
        } else {
            (CatalogKind::Destinations, prompts::CITY_NOT_FOUND)
        };

        let matches = self.resolver.resolve(text, kind).await?;
        let Some(first) = matches.first() else {
            return Ok(vec![send(chat, not_found)]);
        };

        if session.state == SessionState::SelectHotel {
            session.hotel = Some(first.id);
        } else {
            session.place_to = Some(first.id);
        }
        session.state = apply(session.state, Trigger::DestinationChosen)?;
        self.store.flush(session)?;
        Ok(vec![send(chat, prompts::ASK_ORIGIN)])
    }

    async fn select_origin(
        &self,
        session: &mut Session,
        chat: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let matches = self
            .resolver
            .resolve(text, CatalogKind::DepartureCities)
            .await?;
        let Some(first) = matches.first() else {
            return Ok(vec![send(chat, prompts::CITY_NOT_FOUND)]);
        };

        session.place_from = Some(first.id);
        session.state = apply(session.state, Trigger::OriginChosen)?;
        self.store.flush(session)?;
        Ok(vec![send(chat, prompts::ASK_DATE_FROM)])
    }

    fn select_date_from(
        &self,
        session: &mut Session,
        chat: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        let Some(date) = parse_user_date(text) else {
            return Ok(vec![send(chat, prompts::BAD_DATE)]);
        };

        session.date_from = Some(date);
        session.state = apply(session.state, Trigger::DateFromChosen)?;
        self.store.flush(session)?;
        Ok(vec![send(chat, prompts::ASK_DATE_TO)])
    }

    async fn select_date_to(
        &self,
        session: &mut Session,
        chat: i64,
        text: &str,
    ) -> Result<Vec<Outbound>> {
        // A lost date_from means the stored session is incomplete;
        // the user restarts from that step.
        let Some(date_from) = session.date_from else {
            session.state = SessionState::SelectDateFrom;
            self.store.flush(session)?;
            return Ok(vec![send(chat, prompts::ASK_DATE_FROM)]);
        };

        let Some(date) = parse_user_date(text) else {
            return Ok(vec![send(chat, prompts::BAD_DATE)]);
        };
        if date < date_from {
            return Ok(vec![send(chat, prompts::DATE_BEFORE_START)]);
        }

        session.date_to = Some(date);
        self.store.flush(session)?;

        let mut out = vec![send(chat, prompts::SEARCHING)];
        match self.orchestrator.search(session).await {
            Ok(SearchOutcome::Found(offers)) => {
                session.result = Some(offers.clone());
                session.state = apply(session.state, Trigger::SearchSucceeded)?;
                self.store.flush(session)?;

                out.push(send(chat, prompts::FOUND_HEADER));
                for offer in &offers {
                    out.push(offer_message(chat, offer));
                }
                out.push(send(chat, prompts::TERMINAL_HINT));
            }
            Ok(SearchOutcome::NotFound) => {
                session.state = apply(session.state, Trigger::SearchFailed)?;
                self.store.flush(session)?;
                out.push(send(chat, prompts::NOTHING_FOUND));
            }
            Err(e) => {
                // Hard failure: report it and stay on this step.
                tracing::error!(user_id = session.user_id, error = %e, "search failed");
                out.push(send(chat, prompts::SEARCH_ERROR));
            }
        }

        Ok(out)
    }

    fn terminal(&self, session: &Session, chat: i64, text: &str) -> Vec<Outbound> {
        if session.state == SessionState::SearchSuccess && text == "/post" {
            let Some(ref offers) = session.result else {
                return vec![send(chat, prompts::NO_RESULT_TO_POST)];
            };
            let channels = self.channels.list();
            if channels.is_empty() {
                return vec![send(chat, prompts::NO_CHANNELS)];
            }

            let mut out = Vec::new();
            for channel in channels {
                for offer in offers {
                    out.push(offer_message(channel, offer));
                }
            }
            out.push(send(chat, prompts::POST_DONE));
            return out;
        }

        vec![send(chat, prompts::TERMINAL_HINT)]
    }
}

fn send(chat: i64, text: &str) -> Outbound {
    Outbound::SendText {
        chat,
        text: text.to_owned(),
    }
}

fn offer_message(chat: i64, offer: &Offer) -> Outbound {
    Outbound::SendTextWithLink {
        chat,
        text: format!(
            "{} — {:.2} from {}, {} night(s)",
            offer.name, offer.price, offer.date_from, offer.duration_days
        ),
        url: offer.booking_url.clone(),
    }
}
