//! Charge saga: persist the request, charge it, tell customer and talent.

use shoutout_core::emails;
use shoutout_core::environment::Clock;
use shoutout_core::ports::{
    ErrorTracker, MailSender, OrderViews, PersistRequestShoutoutUnitOfWork, ProcessPayment, TalentViews,
};
use shoutout_core::{
    Buyer, Charge, ChargeStatus, CreditCard, Order, OrderDetails, OrderLookup, RequestShoutoutCommand,
    ShoutoutSuccessfullyRequestedEvent, SiteConfig,
};

use super::send_notification;
use crate::bus::HandlerResult;

/// Builds the order aggregate and commits it atomically.
///
/// # Errors
///
/// `RequiredField` for an invalid order, `PersistingShoutoutRequest` when the
/// commit fails.
pub async fn persist_request_shoutout(
    command: RequestShoutoutCommand,
    uow: &mut dyn PersistRequestShoutoutUnitOfWork,
    clock: &dyn Clock,
    error_tracker: &dyn ErrorTracker,
) -> HandlerResult {
    let now = clock.now();
    let credit_card = CreditCard::new(
        Buyer::new(
            command.credit_card_owner_fullname,
            command.credit_card_owner_birthdate,
            command.credit_card_owner_tax_document,
            command.credit_card_owner_phone_number,
            command.credit_card_owner_area_code,
        ),
        command.credit_card_hash,
    );
    let buyer = Buyer::new(
        command.customer_fullname,
        command.customer_birthdate,
        command.customer_tax_document,
        command.customer_phone_number,
        command.customer_area_code,
    );
    let charge = Charge::new(
        command.order_amount_paid,
        now,
        ChargeStatus::NotProcessed,
        credit_card.clone(),
        buyer.clone(),
    );
    let details = OrderDetails {
        hash_id: command.order_hash_id,
        talent_id: command.order_talent_id,
        video_is_for: command.order_video_is_for,
        is_from: command.order_is_from,
        is_to: command.order_is_to,
        instruction: command.order_instruction,
        email: command.order_email,
        is_public: command.order_is_public,
    };
    let order = Order::new(details, charge.clone(), now)?;

    uow.order_repository_add(order);
    uow.charge_repository_add(charge);
    uow.credit_card_repository_add(credit_card);
    uow.buyer_repository_add(buyer);
    if let Err(error) = uow.commit().await {
        tracing::error!(order_hash = %command.order_hash_id, %error, "shoutout request not persisted");
        error_tracker.capture_error(&error);
        return Err(error.into());
    }

    tracing::info!(order_hash = %command.order_hash_id, "shoutout request persisted");
    Ok(Vec::new())
}

/// Charges the freshly persisted order.
///
/// # Errors
///
/// `View` if the order cannot be read back, `ChargingShoutoutRequest` when the
/// processor rejects it.
pub async fn process_payment(
    command: RequestShoutoutCommand,
    orders: &dyn OrderViews,
    payments: &dyn ProcessPayment,
) -> HandlerResult {
    let mut order = orders.view_order(OrderLookup::Hash(command.order_hash_id)).await?;
    let event = payments.charge(&mut order).await?;
    Ok(vec![event.into()])
}

/// Emails the customer a receipt.
pub async fn send_info_to_customer_about_his_shoutout_request(
    event: ShoutoutSuccessfullyRequestedEvent,
    talents: &dyn TalentViews,
    mail_sender: &dyn MailSender,
    error_tracker: &dyn ErrorTracker,
    site: &SiteConfig,
) -> HandlerResult {
    match talents.view_talent(event.order.talent_id).await {
        Ok(talent) => {
            let request = emails::order_detail(&event.order, &talent, site);
            send_notification(mail_sender, error_tracker, request).await;
        }
        Err(error) => {
            tracing::error!(order_hash = %event.order.hash_id, %error, "customer receipt skipped");
            error_tracker.capture_error(&error);
        }
    }
    Ok(Vec::new())
}

/// Emails the talent about the new order.
pub async fn notify_talent_about_new_shoutout_request(
    event: ShoutoutSuccessfullyRequestedEvent,
    talents: &dyn TalentViews,
    mail_sender: &dyn MailSender,
    error_tracker: &dyn ErrorTracker,
    site: &SiteConfig,
) -> HandlerResult {
    match talents.view_talent(event.order.talent_id).await {
        Ok(talent) => {
            let request = emails::new_order_for_talent(&event.order, &talent, site);
            send_notification(mail_sender, error_tracker, request).await;
        }
        Err(error) => {
            tracing::error!(order_hash = %event.order.hash_id, %error, "talent notification skipped");
            error_tracker.capture_error(&error);
        }
    }
    Ok(Vec::new())
}
