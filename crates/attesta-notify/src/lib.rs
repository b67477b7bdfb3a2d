//! # Attesta Notify
//!
//! The notification core: a rate-limited outbound notifier, an event
//! queue consumed by a worker loop (decoupling delivery from the HTTP
//! request that triggered it), and a daily reminder scheduler driven by
//! a lightweight cron expression.
//!
//! ```text
//! mutation handler ──> NotifyEvent ──> worker loop ──> resolver ──> Notifier
//!                                                                  (delay between sends)
//! ReminderScheduler (cron, daily) ──> scan upcoming exams ─────────┘
//! ```

pub mod cron;
pub mod events;
pub mod messages;
pub mod notifier;
pub mod reminder;

pub use events::{notify_channel, run_worker, NotifyEvent, NotifySender};
pub use notifier::{Notifier, Outgoing};
pub use reminder::ReminderScheduler;
