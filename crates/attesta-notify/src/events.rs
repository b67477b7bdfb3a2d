//! Event-triggered notifications.
//!
//! Mutation handlers enqueue a `NotifyEvent` and return immediately; one
//! worker loop drains the queue, opening its own short-lived database
//! session per event, so no HTTP response ever waits on a Telegram send
//! and no connection is held across the notifier's delays. Worker
//! failures are logged only — they never reach the original request,
//! which may long since have completed.

use tokio::sync::mpsc;

use attesta_core::Result;
use attesta_db::Store;

use crate::messages;
use crate::notifier::{Notifier, Outgoing};

/// A notification request emitted by a mutating endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyEvent {
    ExamCreated { exam_id: i64 },
    ExamLinkUpdated { exam_id: i64, link: String },
    MarkChanged {
        student_id: i64,
        discipline: String,
        value: Option<i16>,
    },
}

pub type NotifySender = mpsc::UnboundedSender<NotifyEvent>;

pub fn notify_channel() -> (NotifySender, mpsc::UnboundedReceiver<NotifyEvent>) {
    mpsc::unbounded_channel()
}

/// Worker loop: runs until every sender is dropped.
pub async fn run_worker(
    store: Store,
    notifier: Notifier,
    mut rx: mpsc::UnboundedReceiver<NotifyEvent>,
) {
    tracing::info!("notification worker started");
    while let Some(event) = rx.recv().await {
        if let Err(e) = handle_event(&store, &notifier, &event).await {
            tracing::error!("notification event failed: {e}");
        }
    }
    tracing::info!("notification worker stopped (queue closed)");
}

async fn handle_event(store: &Store, notifier: &Notifier, event: &NotifyEvent) -> Result<()> {
    match event {
        NotifyEvent::ExamCreated { exam_id } => {
            let exam = store.exam_details(*exam_id).await?;
            let recipients = store.exam_recipients(*exam_id).await?;
            let text = messages::exam_created(&exam);
            let batch: Vec<Outgoing> = recipients
                .into_iter()
                .map(|chat_id| Outgoing::text(chat_id, text.clone()))
                .collect();
            let delivered = notifier.send_batch(&batch).await;
            tracing::info!(exam_id, delivered, "exam creation announced");
        }
        NotifyEvent::ExamLinkUpdated { exam_id, link } => {
            let exam = store.exam_details(*exam_id).await?;
            let recipients = store.exam_recipients(*exam_id).await?;
            let (text, button) = messages::exam_link(&exam, link);
            let batch: Vec<Outgoing> = recipients
                .into_iter()
                .map(|chat_id| Outgoing::with_button(chat_id, text.clone(), button.clone()))
                .collect();
            let delivered = notifier.send_batch(&batch).await;
            tracing::info!(exam_id, delivered, "exam link announced");
        }
        NotifyEvent::MarkChanged {
            student_id,
            discipline,
            value,
        } => {
            let Some(chat_id) = store.student_chat_id(*student_id).await? else {
                tracing::warn!(student_id, "no chat handle bound, mark notice dropped");
                return Ok(());
            };
            let text = messages::mark_changed(discipline, *value);
            notifier.send_batch(&[Outgoing::text(chat_id, text)]).await;
        }
    }
    Ok(())
}
