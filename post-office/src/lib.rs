//! # Shoutout Post Office
//!
//! Outbound side channels of the saga.
//!
//! | Port | Implementations |
//! |------|-----------------|
//! | [`MailSender`](shoutout_core::ports::MailSender) | [`MailgunCarrier`], [`QueuedMailSender`], [`ConsoleMailSender`] |
//! | [`AlertChannel`](shoutout_core::ports::AlertChannel) | [`TelegramAlertChannel`], [`LogAlertChannel`] |
//!
//! Saga handlers enqueue mail through [`QueuedMailSender`]; a dispatcher task
//! started by [`spawn_mail_dispatcher`] delivers it through a carrier so
//! request latency never depends on the mail provider.

pub mod alerts;
pub mod config;
pub mod console;
pub mod mailgun;
pub mod queue;

pub use alerts::{LogAlertChannel, TelegramAlertChannel};
pub use config::{MailgunConfig, TelegramConfig};
pub use console::ConsoleMailSender;
pub use mailgun::MailgunCarrier;
pub use queue::{QueuedMailSender, spawn_mail_dispatcher};
