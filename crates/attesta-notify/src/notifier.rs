//! Rate-limited outbound notifier.
//!
//! Sends a batch strictly in input order with a fixed pause between
//! messages — a deliberate throttle against the messaging platform's
//! rate limits. Best-effort: a failing recipient is logged and skipped,
//! never aborting the rest of the batch, and nothing propagates to the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use attesta_core::{Error, LinkButton, Transport};

/// One message addressed to one chat.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub chat_id: i64,
    pub text: String,
    pub button: Option<LinkButton>,
}

impl Outgoing {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            button: None,
        }
    }

    pub fn with_button(chat_id: i64, text: impl Into<String>, button: LinkButton) -> Self {
        Self {
            chat_id,
            text: text.into(),
            button: Some(button),
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn Transport>,
    delay: Duration,
}

impl Notifier {
    pub fn new(transport: Arc<dyn Transport>, delay: Duration) -> Self {
        Self { transport, delay }
    }

    /// Deliver a batch sequentially. Returns how many sends succeeded.
    pub async fn send_batch(&self, batch: &[Outgoing]) -> usize {
        let mut delivered = 0;
        for message in batch {
            match self
                .transport
                .send(message.chat_id, &message.text, message.button.as_ref())
                .await
            {
                Ok(()) => {
                    delivered += 1;
                    tracing::info!(chat_id = message.chat_id, "notification delivered");
                }
                Err(Error::Recipient(reason)) => {
                    tracing::warn!(chat_id = message.chat_id, %reason, "recipient rejected, skipping");
                }
                Err(e) => {
                    tracing::error!(chat_id = message.chat_id, "delivery failed: {e}");
                }
            }
            tokio::time::sleep(self.delay).await;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use attesta_core::Result;
    use std::sync::Mutex;

    /// Records delivery order; chats listed in `reject` fail.
    struct RecordingTransport {
        sent: Mutex<Vec<i64>>,
        reject: Vec<i64>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, chat_id: i64, _text: &str, _button: Option<&LinkButton>) -> Result<()> {
            if self.reject.contains(&chat_id) {
                return Err(Error::Recipient("chat not found".into()));
            }
            self.sent.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    fn notifier_with(reject: Vec<i64>) -> (Notifier, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
            reject,
        });
        (
            Notifier::new(transport.clone(), Duration::ZERO),
            transport,
        )
    }

    #[tokio::test]
    async fn delivers_in_input_order() {
        let (notifier, transport) = notifier_with(vec![]);
        let batch: Vec<Outgoing> = [5, 3, 9, 1]
            .into_iter()
            .map(|id| Outgoing::text(id, "hi"))
            .collect();
        let delivered = notifier.send_batch(&batch).await;
        assert_eq!(delivered, 4);
        assert_eq!(*transport.sent.lock().unwrap(), vec![5, 3, 9, 1]);
    }

    #[tokio::test]
    async fn failing_recipient_does_not_abort_batch() {
        let (notifier, transport) = notifier_with(vec![3, 9]);
        let batch: Vec<Outgoing> = [5, 3, 9, 1]
            .into_iter()
            .map(|id| Outgoing::text(id, "hi"))
            .collect();
        let delivered = notifier.send_batch(&batch).await;
        assert_eq!(delivered, 2);
        assert_eq!(*transport.sent.lock().unwrap(), vec![5, 1]);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let (notifier, transport) = notifier_with(vec![]);
        assert_eq!(notifier.send_batch(&[]).await, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
