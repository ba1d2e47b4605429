//! Collaborators shared by every bus built in a process.
//!
//! Everything in here is either stateless or connection-pooled and safe to
//! share across concurrent requests. Per-request state (units of work) is
//! created from [`UnitOfWorkFactory`] whenever a bus is built.

use std::sync::Arc;

use shoutout_core::SiteConfig;
use shoutout_core::environment::Clock;
use shoutout_core::ports::{
    AlertChannel, ErrorTracker, MailSender, OrderViews, PaymentGateway, PaymentRecords,
    ProfitPercentageViews, TalentViews, Transcoder, UnitOfWorkFactory,
};

/// Injected dependencies of the saga.
#[derive(Clone)]
pub struct ShoutoutEnvironment {
    /// Order and transaction lookups.
    pub orders: Arc<dyn OrderViews>,
    /// Talent lookups.
    pub talents: Arc<dyn TalentViews>,
    /// Profit percentage lookups.
    pub percentages: Arc<dyn ProfitPercentageViews>,
    /// Source of fresh units of work.
    pub units_of_work: Arc<dyn UnitOfWorkFactory>,
    /// Processor transaction records.
    pub payment_records: Arc<dyn PaymentRecords>,
    /// Processor client.
    pub payment_gateway: Arc<dyn PaymentGateway>,
    /// Notification email.
    pub mail_sender: Arc<dyn MailSender>,
    /// Operator alerts.
    pub alerts: Arc<dyn AlertChannel>,
    /// Error reporting.
    pub error_tracker: Arc<dyn ErrorTracker>,
    /// Transcode queue.
    pub transcoder: Arc<dyn Transcoder>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Public site settings.
    pub site: SiteConfig,
}
