//! Bus wiring.
//!
//! Every call builds a new [`MessageBus`] with fresh units of work, so buses
//! are never shared between requests. Shared collaborators come from the
//! [`ShoutoutEnvironment`].

use std::sync::Arc;
use tokio::sync::Mutex;

use shoutout_core::profit::{AgencyProfitFactory, TalentProfitFactory};
use shoutout_core::{
    FulfillShoutoutRequestCommand, RequestShoutoutCommand, ShoutoutSuccessfullyRequestedEvent,
    ShoutoutSuccessfullyTranscodedEvent, ShoutoutUploadedEvent,
};

use crate::adapters::{CapturePaymentUnitOfWork, PaymentProcessUnitOfWork};
use crate::bus::MessageBus;
use crate::environment::ShoutoutEnvironment;
use crate::services::{fulfill_shoutout_request as fulfill, request_shoutout as request};

/// Bus for `RequestShoutoutCommand` and its notifications.
#[must_use]
pub fn charge_order_bus(env: &ShoutoutEnvironment) -> MessageBus {
    let mut bus = MessageBus::new();

    let uow = Arc::new(Mutex::new(env.units_of_work.persist_request_shoutout()));
    let clock = Arc::clone(&env.clock);
    let tracker = Arc::clone(&env.error_tracker);
    bus.register(move |command: RequestShoutoutCommand| {
        let (uow, clock, tracker) = (Arc::clone(&uow), Arc::clone(&clock), Arc::clone(&tracker));
        async move {
            let mut uow = uow.lock().await;
            request::persist_request_shoutout(command, uow.as_mut(), clock.as_ref(), tracker.as_ref()).await
        }
    });

    let payments = Arc::new(PaymentProcessUnitOfWork::new(
        Arc::clone(&env.payment_gateway),
        Arc::clone(&env.payment_records),
        Arc::clone(&env.error_tracker),
    ));
    let orders = Arc::clone(&env.orders);
    bus.register(move |command: RequestShoutoutCommand| {
        let (orders, payments) = (Arc::clone(&orders), Arc::clone(&payments));
        async move { request::process_payment(command, orders.as_ref(), payments.as_ref()).await }
    });

    let (talents, mail, tracker, site) = notification_deps(env);
    bus.register(move |event: ShoutoutSuccessfullyRequestedEvent| {
        let (talents, mail, tracker, site) =
            (Arc::clone(&talents), Arc::clone(&mail), Arc::clone(&tracker), Arc::clone(&site));
        async move {
            request::send_info_to_customer_about_his_shoutout_request(
                event,
                talents.as_ref(),
                mail.as_ref(),
                tracker.as_ref(),
                &site,
            )
            .await
        }
    });

    let (talents, mail, tracker, site) = notification_deps(env);
    bus.register(move |event: ShoutoutSuccessfullyRequestedEvent| {
        let (talents, mail, tracker, site) =
            (Arc::clone(&talents), Arc::clone(&mail), Arc::clone(&tracker), Arc::clone(&site));
        async move {
            request::notify_talent_about_new_shoutout_request(
                event,
                talents.as_ref(),
                mail.as_ref(),
                tracker.as_ref(),
                &site,
            )
            .await
        }
    });

    bus
}

/// Bus for `FulfillShoutoutRequestCommand`, transcoding and the ready email.
#[must_use]
pub fn fulfill_shoutout_request_bus(env: &ShoutoutEnvironment) -> MessageBus {
    let mut bus = MessageBus::new();

    let orders = Arc::clone(&env.orders);
    let clock = Arc::clone(&env.clock);
    bus.register(move |command: FulfillShoutoutRequestCommand| {
        let (orders, clock) = (Arc::clone(&orders), Arc::clone(&clock));
        async move { fulfill::validate_if_order_can_be_fulfilled(command, orders.as_ref(), clock.as_ref()).await }
    });

    let orders = Arc::clone(&env.orders);
    let talents = Arc::clone(&env.talents);
    let talent_profits = TalentProfitFactory::new(Arc::clone(&env.percentages));
    let agency_profits = AgencyProfitFactory::new(Arc::clone(&env.percentages));
    let uow = Arc::new(Mutex::new(env.units_of_work.fulfill_shoutout_request()));
    let tracker = Arc::clone(&env.error_tracker);
    bus.register(move |command: FulfillShoutoutRequestCommand| {
        let (orders, talents, uow, tracker) =
            (Arc::clone(&orders), Arc::clone(&talents), Arc::clone(&uow), Arc::clone(&tracker));
        let (talent_profits, agency_profits) = (talent_profits.clone(), agency_profits.clone());
        async move {
            let mut uow = uow.lock().await;
            fulfill::fulfill_shoutout_request(
                command,
                orders.as_ref(),
                talents.as_ref(),
                &talent_profits,
                &agency_profits,
                uow.as_mut(),
                tracker.as_ref(),
            )
            .await
        }
    });

    let orders = Arc::clone(&env.orders);
    let capture = Arc::new(CapturePaymentUnitOfWork::new(
        Arc::clone(&env.payment_gateway),
        Arc::clone(&env.alerts),
        Arc::clone(&env.error_tracker),
    ));
    bus.register(move |command: FulfillShoutoutRequestCommand| {
        let (orders, capture) = (Arc::clone(&orders), Arc::clone(&capture));
        async move { fulfill::capture_payment(command, orders.as_ref(), capture.as_ref()).await }
    });

    let orders = Arc::clone(&env.orders);
    let transcoder = Arc::clone(&env.transcoder);
    bus.register(move |event: ShoutoutUploadedEvent| {
        let (orders, transcoder) = (Arc::clone(&orders), Arc::clone(&transcoder));
        async move { fulfill::schedule_shoutout_transcoding(event, orders.as_ref(), transcoder.as_ref()).await }
    });

    let orders = Arc::clone(&env.orders);
    let (talents, mail, tracker, site) = notification_deps(env);
    bus.register(move |event: ShoutoutSuccessfullyTranscodedEvent| {
        let (orders, talents, mail, tracker, site) = (
            Arc::clone(&orders),
            Arc::clone(&talents),
            Arc::clone(&mail),
            Arc::clone(&tracker),
            Arc::clone(&site),
        );
        async move {
            fulfill::notify_customer_about_shoutout_request_fulfilled(
                event,
                orders.as_ref(),
                talents.as_ref(),
                mail.as_ref(),
                tracker.as_ref(),
                &site,
            )
            .await
        }
    });

    bus
}

type NotificationDeps = (
    Arc<dyn shoutout_core::ports::TalentViews>,
    Arc<dyn shoutout_core::ports::MailSender>,
    Arc<dyn shoutout_core::ports::ErrorTracker>,
    Arc<shoutout_core::SiteConfig>,
);

fn notification_deps(env: &ShoutoutEnvironment) -> NotificationDeps {
    (
        Arc::clone(&env.talents),
        Arc::clone(&env.mail_sender),
        Arc::clone(&env.error_tracker),
        Arc::new(env.site.clone()),
    )
}
