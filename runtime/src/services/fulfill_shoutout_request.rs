//! Fulfill saga: validate, persist shoutout and profits, capture, transcode,
//! notify.

use shoutout_core::emails;
use shoutout_core::environment::Clock;
use shoutout_core::ports::{
    CaptureOutcome, CapturePayment, ErrorTracker, FulfillShoutoutRequestUnitOfWork, MailSender, OrderViews,
    TalentViews, Transcoder,
};
use shoutout_core::profit::{AgencyProfitFactory, TalentProfitFactory};
use shoutout_core::{
    DomainError, FulfillShoutoutRequestCommand, Order, OrderLookup, PersistingShoutoutVideoError, SagaError,
    Shoutout, ShoutoutSuccessfullyTranscodedEvent, ShoutoutUploadedEvent, SiteConfig, ViewError,
};

use super::send_notification;
use crate::bus::HandlerResult;

fn persisted_id(order: &Order) -> Result<i64, ViewError> {
    order.id.ok_or_else(|| ViewError::not_found("order id", order.hash_id))
}

/// Rejects expired, foreign or already fulfilled orders.
///
/// # Errors
///
/// The matching [`DomainError`], or `View` when the order is unknown.
pub async fn validate_if_order_can_be_fulfilled(
    command: FulfillShoutoutRequestCommand,
    orders: &dyn OrderViews,
    clock: &dyn Clock,
) -> HandlerResult {
    let order = orders.view_order(OrderLookup::Hash(command.order_hash)).await?;
    order.validate_if_it_can_be_fulfilled(&command, clock.now())?;
    Ok(Vec::new())
}

/// Stages the shoutout and the profit split, then commits them together.
///
/// # Errors
///
/// `OrderHasShoutout` when a concurrent fulfillment won the race,
/// `PersistingShoutoutVideo` for other commit failures, `View` for lookups.
pub async fn fulfill_shoutout_request(
    command: FulfillShoutoutRequestCommand,
    orders: &dyn OrderViews,
    talents: &dyn TalentViews,
    talent_profits: &TalentProfitFactory,
    agency_profits: &AgencyProfitFactory,
    uow: &mut dyn FulfillShoutoutRequestUnitOfWork,
    error_tracker: &dyn ErrorTracker,
) -> HandlerResult {
    let order = orders.view_order(OrderLookup::Hash(command.order_hash)).await?;
    let order_id = persisted_id(&order)?;
    let talent = talents.view_talent(order.talent_id).await?;

    uow.shoutout_repository_add(Shoutout::new(
        command.shoutout_hash,
        order_id,
        command.talent_id,
        command.video_file,
    ));
    uow.talent_profit_repository_add(talent_profits.build(&order, order_id).await?);
    if let Some(agency_id) = talent.agency_id {
        uow.agency_profit_repository_add(agency_profits.build(&order, order_id, agency_id).await?);
    }

    match uow.commit().await {
        Ok(()) => {
            tracing::info!(order_hash = %order.hash_id, shoutout_hash = %command.shoutout_hash, "shoutout persisted");
            Ok(Vec::new())
        }
        Err(PersistingShoutoutVideoError::OrderAlreadyFulfilled { order_id }) => {
            tracing::warn!(order_id, "concurrent fulfillment rejected");
            Err(DomainError::OrderHasShoutout.into())
        }
        Err(error) => {
            tracing::error!(order_hash = %order.hash_id, %error, "shoutout not persisted");
            error_tracker.capture_error(&error);
            Err(error.into())
        }
    }
}

/// Captures the authorized payment. The saga goes on whatever the outcome.
///
/// # Errors
///
/// `View` when the transaction data cannot be found.
pub async fn capture_payment(
    command: FulfillShoutoutRequestCommand,
    orders: &dyn OrderViews,
    capture: &dyn CapturePayment,
) -> HandlerResult {
    let transaction = orders.view_transaction_data(command.order_hash).await?;
    if capture.capture(&transaction).await == CaptureOutcome::AlertRaised {
        tracing::warn!(order_hash = %command.order_hash, "continuing without capture");
    }
    Ok(vec![
        ShoutoutUploadedEvent {
            order_hash: command.order_hash,
        }
        .into(),
    ])
}

/// Enqueues the transcode job of the order's shoutout.
///
/// # Errors
///
/// `View` when the order or its shoutout is missing, `Scheduling` when the
/// queue refuses the job.
pub async fn schedule_shoutout_transcoding(
    event: ShoutoutUploadedEvent,
    orders: &dyn OrderViews,
    transcoder: &dyn Transcoder,
) -> HandlerResult {
    let order = orders.view_order(OrderLookup::Hash(event.order_hash)).await?;
    let shoutout = order
        .shoutout
        .ok_or_else(|| ViewError::not_found("shoutout of order", event.order_hash))?;
    transcoder
        .schedule(shoutout.hash_id)
        .await
        .map_err(|error| SagaError::Scheduling(error.to_string()))?;
    tracing::info!(shoutout_hash = %shoutout.hash_id, "transcoding scheduled");
    Ok(Vec::new())
}

/// Emails the customer that the video is ready.
pub async fn notify_customer_about_shoutout_request_fulfilled(
    event: ShoutoutSuccessfullyTranscodedEvent,
    orders: &dyn OrderViews,
    talents: &dyn TalentViews,
    mail_sender: &dyn MailSender,
    error_tracker: &dyn ErrorTracker,
    site: &SiteConfig,
) -> HandlerResult {
    let lookup = async {
        let order = orders.view_order(OrderLookup::Id(event.order_id)).await?;
        let talent = talents.view_talent(order.talent_id).await?;
        let shoutout = order
            .shoutout
            .clone()
            .ok_or_else(|| ViewError::not_found("shoutout of order", event.order_id))?;
        Ok::<_, ViewError>(emails::shoutout_ready(&order, &shoutout, &talent, site))
    };
    match lookup.await {
        Ok(request) => send_notification(mail_sender, error_tracker, request).await,
        Err(error) => {
            tracing::error!(order_id = event.order_id, %error, "ready notification skipped");
            error_tracker.capture_error(&error);
        }
    }
    Ok(Vec::new())
}
