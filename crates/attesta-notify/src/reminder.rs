//! Daily exam reminder scheduler.
//!
//! One scan at startup, then one per cron match (default 09:00 local).
//! Each scan is a full idempotent rescan of future-dated exams — no
//! stored cursor. A per-process sent-ledger keyed by (exam, offset, day)
//! keeps a manually re-triggered scan from double-sending within one
//! process lifetime; restarts forget it.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};

use attesta_db::Store;

use crate::cron;
use crate::messages;
use crate::notifier::{Notifier, Outgoing};

/// Whole days between `today` and a string-encoded exam date.
/// `None` when the date does not parse as `YYYY-MM-DD`.
pub fn days_left(holding_date: &str, today: NaiveDate) -> Option<i64> {
    NaiveDate::parse_from_str(holding_date, "%Y-%m-%d")
        .ok()
        .map(|date| (date - today).num_days())
}

/// Per-process dedup of sent reminders.
#[derive(Debug, Default)]
pub struct SentLedger {
    sent: HashSet<(i64, i64, NaiveDate)>,
}

impl SentLedger {
    /// Record a send; returns `false` when this (exam, offset) was
    /// already sent on `day`.
    pub fn mark(&mut self, exam_id: i64, offset: i64, day: NaiveDate) -> bool {
        self.sent.insert((exam_id, offset, day))
    }

    /// Drop entries from previous days.
    pub fn prune(&mut self, today: NaiveDate) {
        self.sent.retain(|(_, _, day)| *day == today);
    }
}

pub struct ReminderScheduler {
    store: Store,
    notifier: Notifier,
    cron: String,
    offsets: Vec<i64>,
    ledger: SentLedger,
}

impl ReminderScheduler {
    pub fn new(store: Store, notifier: Notifier, cron: String, offsets: Vec<i64>) -> Self {
        Self {
            store,
            notifier,
            cron,
            offsets,
            ledger: SentLedger::default(),
        }
    }

    /// Run forever: startup scan, then sleep until each cron match.
    pub async fn run(mut self) {
        tracing::info!(cron = %self.cron, offsets = ?self.offsets, "reminder scheduler started");
        self.scan(Local::now().date_naive()).await;

        loop {
            let now = Local::now();
            let Some(next) = cron::next_run_from_cron(&self.cron, now) else {
                tracing::error!(cron = %self.cron, "cron expression rejected, scheduler stopping");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!("next reminder scan at {}", next.format("%Y-%m-%d %H:%M"));
            tokio::time::sleep(wait).await;
            self.scan(Local::now().date_naive()).await;
        }
    }

    /// One full rescan. Returns the number of reminders delivered.
    /// All failures are logged and contained — a bad exam row or a
    /// database hiccup never aborts the scan loop.
    pub async fn scan(&mut self, today: NaiveDate) -> usize {
        tracing::info!(%today, "reminder scan started");
        self.ledger.prune(today);

        let today_str = today.format("%Y-%m-%d").to_string();
        let exams = match self.store.upcoming_exams(&today_str).await {
            Ok(exams) => exams,
            Err(e) => {
                tracing::error!("reminder scan: fetching exams failed: {e}");
                return 0;
            }
        };

        let mut delivered = 0;
        for exam in &exams {
            let Some(days) = days_left(&exam.holding_date, today) else {
                tracing::error!(
                    exam_id = exam.id,
                    date = %exam.holding_date,
                    "unparsable exam date, skipped"
                );
                continue;
            };
            if !self.offsets.contains(&days) {
                continue;
            }
            if !self.ledger.mark(exam.id, days, today) {
                tracing::debug!(exam_id = exam.id, days, "reminder already sent this run-day");
                continue;
            }

            let recipients = match self.store.exam_recipients(exam.id).await {
                Ok(recipients) => recipients,
                Err(e) => {
                    tracing::error!(exam_id = exam.id, "recipient resolution failed: {e}");
                    continue;
                }
            };

            let text = messages::reminder(exam, days);
            let batch: Vec<Outgoing> = recipients
                .into_iter()
                .map(|chat_id| Outgoing::text(chat_id, text.clone()))
                .collect();
            delivered += self.notifier.send_batch(&batch).await;
        }

        tracing::info!(delivered, "reminder scan finished");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn days_left_arithmetic() {
        let today = day("2026-08-05");
        assert_eq!(days_left("2026-08-06", today), Some(1));
        assert_eq!(days_left("2026-08-08", today), Some(3));
        assert_eq!(days_left("2026-08-05", today), Some(0));
        assert_eq!(days_left("2026-09-05", today), Some(31));
    }

    #[test]
    fn unparsable_dates_yield_none() {
        let today = day("2026-08-05");
        assert_eq!(days_left("06.08.2026", today), None);
        assert_eq!(days_left("soon", today), None);
        assert_eq!(days_left("", today), None);
    }

    #[test]
    fn ledger_suppresses_repeat_sends() {
        let mut ledger = SentLedger::default();
        let today = day("2026-08-05");
        assert!(ledger.mark(7, 3, today));
        assert!(!ledger.mark(7, 3, today));
        // Different offset for the same exam is a distinct reminder.
        assert!(ledger.mark(7, 1, today));
    }

    #[test]
    fn ledger_prune_keeps_only_today() {
        let mut ledger = SentLedger::default();
        ledger.mark(7, 3, day("2026-08-04"));
        ledger.mark(8, 1, day("2026-08-05"));
        ledger.prune(day("2026-08-05"));
        // Yesterday's entry is gone, so the same key can be re-marked.
        assert!(ledger.mark(7, 3, day("2026-08-04")));
        assert!(!ledger.mark(8, 1, day("2026-08-05")));
    }
}
