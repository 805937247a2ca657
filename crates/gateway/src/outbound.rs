//! Outbound instructions and the transport capability that renders
//! them.
//!
//! The engine never talks to a chat network directly; it returns a
//! batch of instructions and the serve loop delivers them.  Delivery is
//! best-effort per destination: one failed send is logged and the rest
//! of the batch still goes out.

use tb_domain::error::Result;

/// One message the engine wants delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    SendText {
        chat: i64,
        text: String,
    },
    SendTextWithLink {
        chat: i64,
        text: String,
        url: String,
    },
    Forward {
        from_chat: i64,
        to_chat: i64,
        message_id: i64,
    },
}

impl Outbound {
    /// The destination chat, for per-destination failure reporting.
    pub fn chat(&self) -> i64 {
        match self {
            Self::SendText { chat, .. } => *chat,
            Self::SendTextWithLink { chat, .. } => *chat,
            Self::Forward { to_chat, .. } => *to_chat,
        }
    }
}

/// Message delivery capability implemented by each chat transport.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat: i64, text: &str) -> Result<()>;
    async fn send_text_with_link(&self, chat: i64, text: &str, url: &str) -> Result<()>;
    async fn forward(&self, from_chat: i64, to_chat: i64, message_id: i64) -> Result<()>;
}

/// Deliver a batch, continuing past per-destination failures.  Returns
/// how many instructions were delivered.
pub async fn deliver_all(transport: &dyn ChatTransport, batch: &[Outbound]) -> usize {
    let mut delivered = 0;

    for item in batch {
        let result = match item {
            Outbound::SendText { chat, text } => transport.send_text(*chat, text).await,
            Outbound::SendTextWithLink { chat, text, url } => {
                transport.send_text_with_link(*chat, text, url).await
            }
            Outbound::Forward {
                from_chat,
                to_chat,
                message_id,
            } => transport.forward(*from_chat, *to_chat, *message_id).await,
        };

        match result {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(chat = item.chat(), error = %e, "delivery failed");
            }
        }
    }

    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tb_domain::error::Error;

    /// Records sends; fails for one poisoned chat id.
    struct FlakyTransport {
        poisoned_chat: i64,
        sent: Mutex<Vec<i64>>,
    }

    #[async_trait::async_trait]
    impl ChatTransport for FlakyTransport {
        async fn send_text(&self, chat: i64, _text: &str) -> Result<()> {
            if chat == self.poisoned_chat {
                return Err(Error::Transport("forbidden".into()));
            }
            self.sent.lock().push(chat);
            Ok(())
        }

        async fn send_text_with_link(&self, chat: i64, text: &str, _url: &str) -> Result<()> {
            self.send_text(chat, text).await
        }

        async fn forward(&self, _from: i64, to_chat: i64, _id: i64) -> Result<()> {
            self.send_text(to_chat, "").await
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let transport = FlakyTransport {
            poisoned_chat: 2,
            sent: Mutex::new(Vec::new()),
        };
        let batch = vec![
            Outbound::SendText { chat: 1, text: "a".into() },
            Outbound::SendText { chat: 2, text: "b".into() },
            Outbound::SendText { chat: 3, text: "c".into() },
        ];

        let delivered = deliver_all(&transport, &batch).await;
        assert_eq!(delivered, 2);
        assert_eq!(*transport.sent.lock(), vec![1, 3]);
    }

    #[test]
    fn chat_accessor_covers_every_variant() {
        assert_eq!(Outbound::SendText { chat: 5, text: String::new() }.chat(), 5);
        assert_eq!(
            Outbound::Forward { from_chat: 1, to_chat: 9, message_id: 3 }.chat(),
            9
        );
    }
}
