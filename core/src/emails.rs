//! Templated notification emails.
//!
//! Templates are rendered by the mail provider; this module only decides the
//! template name, subject and variables.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::SiteConfig;
use crate::order::{Order, SP_TIMEZONE_OFFSET_HOURS, VideoIsFor};
use crate::shoutout::Shoutout;
use crate::talent::Talent;

/// Customer receipt sent after a successful charge.
pub const ORDER_DETAIL_TEMPLATE: &str = "order-detail";
/// Talent notification for a new order.
pub const NEW_ORDER_TEMPLATE: &str = "notify-talent-about-new-order";
/// Customer notification that the video is ready.
pub const SHOUTOUT_READY_TEMPLATE: &str = "notify-customer-that-his-viggio-is-ready";

const DATE_FORMAT: &str = "%d/%m/%Y";
const EXPIRATION_FORMAT: &str = "%d/%m/%Y - %Hh";

/// A provider-side template with its variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailTemplate {
    /// Template name known to the provider.
    pub name: String,
    /// Subject line.
    pub subject: String,
    /// Template variables.
    pub data: Map<String, Value>,
}

impl MailTemplate {
    /// Builds a template from any serializable variables struct.
    ///
    /// Non-object payloads produce an empty variable map.
    pub fn new(name: impl Into<String>, subject: impl Into<String>, data: &impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            subject: subject.into(),
            data,
        }
    }
}

/// A message ready for a [`MailSender`](crate::ports::MailSender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailRequest {
    /// Sender, `Name <address>` or a bare address.
    pub from_email: String,
    /// Recipient, `Name <address>` or a bare address.
    pub to_email: String,
    /// Template to render.
    pub template: MailTemplate,
}

/// Date in the customer-facing timezone.
fn sp_format(at: DateTime<Utc>, format: &str) -> String {
    (at - Duration::hours(SP_TIMEZONE_OFFSET_HOURS)).format(format).to_string()
}

#[derive(Serialize)]
struct OrderData<'a> {
    customer_name: &'a str,
    order_created_at: String,
    charge_amout_paid: String,
    talent_url: &'a str,
    talent_name: &'a str,
    order_instruction: &'a str,
    order_video_is_for: &'a str,
    order_is_from: &'a str,
    order_is_to: &'a str,
    order_expiration_datetime: String,
}

impl<'a> OrderData<'a> {
    fn new(order: &'a Order, talent: &'a Talent) -> Self {
        Self {
            customer_name: order.is_from(),
            order_created_at: order.created_at.format(DATE_FORMAT).to_string(),
            charge_amout_paid: order.charge.amount_paid.to_string(),
            talent_url: &talent.profile_url,
            talent_name: &talent.full_name,
            order_instruction: &order.instruction,
            order_video_is_for: order.video_is_for.as_str(),
            order_is_from: order.is_from(),
            order_is_to: &order.is_to,
            order_expiration_datetime: sp_format(order.expiration_datetime, EXPIRATION_FORMAT),
        }
    }
}

/// Receipt for the customer after the charge was accepted.
#[must_use]
pub fn order_detail(order: &Order, talent: &Talent, site: &SiteConfig) -> MailRequest {
    let data = OrderData::new(order, talent);
    MailRequest {
        from_email: site.contact_email.clone(),
        to_email: format!("{} <{}>", order.is_from(), order.email),
        template: MailTemplate::new(
            ORDER_DETAIL_TEMPLATE,
            format!("Seu pedido foi enviado para {}", talent.full_name),
            &data,
        ),
    }
}

#[derive(Serialize)]
struct NewOrderData<'a> {
    #[serde(flatten)]
    order: OrderData<'a>,
    dashboard_url: String,
}

/// Tells the talent a new order arrived.
#[must_use]
pub fn new_order_for_talent(order: &Order, talent: &Talent, site: &SiteConfig) -> MailRequest {
    let data = NewOrderData {
        order: OrderData::new(order, talent),
        dashboard_url: site.dashboard_url(),
    };
    MailRequest {
        from_email: site.staff_email.clone(),
        to_email: format!("{} <{}>", talent.full_name, talent.email),
        template: MailTemplate::new(NEW_ORDER_TEMPLATE, "Você tem um novo pedido", &data),
    }
}

#[derive(Serialize)]
struct ShoutoutReadyData<'a> {
    customer_name: &'a str,
    talent_name: &'a str,
    order_is_to: &'a str,
    order_video_is_for: &'a str,
    shoutout_absolute_url: String,
}

/// Tells the customer the video is ready to watch.
#[must_use]
pub fn shoutout_ready(order: &Order, shoutout: &Shoutout, talent: &Talent, site: &SiteConfig) -> MailRequest {
    let subject = match order.video_is_for {
        VideoIsFor::SomeoneElse => format!("Seu viggio para {} está pronto", order.is_to),
        VideoIsFor::Myself => "Seu viggio está pronto".to_owned(),
    };
    let data = ShoutoutReadyData {
        customer_name: order.is_from(),
        talent_name: &talent.full_name,
        order_is_to: &order.is_to,
        order_video_is_for: order.video_is_for.as_str(),
        shoutout_absolute_url: shoutout.absolute_url(&site.site_url),
    };
    MailRequest {
        from_email: site.contact_email.clone(),
        to_email: format!("{} <{}>", order.is_from(), order.email),
        template: MailTemplate::new(SHOUTOUT_READY_TEMPLATE, subject, &data),
    }
}
