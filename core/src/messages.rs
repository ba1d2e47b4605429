//! Commands and events exchanged on the message bus.
//!
//! [`Message`] is the closed set of everything the bus can carry. Each concrete
//! message implements [`BusMessage`], which lets the bus register strongly typed
//! handlers keyed by [`MessageType`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::{Order, VideoIsFor};

/// Customer asked for a shoutout and supplied payment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestShoutoutCommand {
    /// Public hash generated for the new order.
    pub order_hash_id: Uuid,
    /// Recipient kind.
    pub order_video_is_for: VideoIsFor,
    /// Sender name.
    pub order_is_from: Option<String>,
    /// Recipient name.
    pub order_is_to: String,
    /// What the talent should say.
    pub order_instruction: String,
    /// Customer email.
    pub order_email: String,
    /// Talent asked to record.
    pub order_talent_id: i64,
    /// Price in BRL.
    pub order_amount_paid: Decimal,
    /// Whether the video may be shown publicly.
    pub order_is_public: bool,
    /// Customer full name.
    pub customer_fullname: String,
    /// Customer birth date.
    pub customer_birthdate: NaiveDate,
    /// Customer phone number.
    pub customer_phone_number: String,
    /// Customer area code.
    pub customer_area_code: String,
    /// Customer CPF.
    pub customer_tax_document: String,
    /// Card holder full name.
    pub credit_card_owner_fullname: String,
    /// Card holder birth date.
    pub credit_card_owner_birthdate: NaiveDate,
    /// Card holder phone number.
    pub credit_card_owner_phone_number: String,
    /// Card holder area code.
    pub credit_card_owner_area_code: String,
    /// Card holder CPF.
    pub credit_card_owner_tax_document: String,
    /// Tokenized card.
    pub credit_card_hash: String,
}

/// Order persisted and charge accepted by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoutoutSuccessfullyRequestedEvent {
    /// The charged order.
    pub order: Order,
}

/// Talent uploaded the video for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillShoutoutRequestCommand {
    /// Hash for the new shoutout.
    pub shoutout_hash: Uuid,
    /// Order being fulfilled.
    pub order_hash: Uuid,
    /// Talent uploading.
    pub talent_id: i64,
    /// Storage key of the raw upload.
    pub video_file: String,
}

/// Shoutout persisted and capture requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoutoutUploadedEvent {
    /// Fulfilled order.
    pub order_hash: Uuid,
}

/// The video was converted to the playback format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoutoutSuccessfullyTranscodedEvent {
    /// Fulfilled order.
    pub order_id: i64,
}

/// Registry key of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// [`RequestShoutoutCommand`]
    RequestShoutout,
    /// [`ShoutoutSuccessfullyRequestedEvent`]
    ShoutoutSuccessfullyRequested,
    /// [`FulfillShoutoutRequestCommand`]
    FulfillShoutoutRequest,
    /// [`ShoutoutUploadedEvent`]
    ShoutoutUploaded,
    /// [`ShoutoutSuccessfullyTranscodedEvent`]
    ShoutoutSuccessfullyTranscoded,
}

impl MessageType {
    /// Name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestShoutout => "RequestShoutoutCommand",
            Self::ShoutoutSuccessfullyRequested => "ShoutoutSuccessfullyRequestedEvent",
            Self::FulfillShoutoutRequest => "FulfillShoutoutRequestCommand",
            Self::ShoutoutUploaded => "ShoutoutUploadedEvent",
            Self::ShoutoutSuccessfullyTranscoded => "ShoutoutSuccessfullyTranscodedEvent",
        }
    }
}

/// Everything the bus can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// See [`RequestShoutoutCommand`].
    RequestShoutout(RequestShoutoutCommand),
    /// See [`ShoutoutSuccessfullyRequestedEvent`].
    ShoutoutSuccessfullyRequested(ShoutoutSuccessfullyRequestedEvent),
    /// See [`FulfillShoutoutRequestCommand`].
    FulfillShoutoutRequest(FulfillShoutoutRequestCommand),
    /// See [`ShoutoutUploadedEvent`].
    ShoutoutUploaded(ShoutoutUploadedEvent),
    /// See [`ShoutoutSuccessfullyTranscodedEvent`].
    ShoutoutSuccessfullyTranscoded(ShoutoutSuccessfullyTranscodedEvent),
}

impl Message {
    /// Registry key.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::RequestShoutout(_) => MessageType::RequestShoutout,
            Self::ShoutoutSuccessfullyRequested(_) => MessageType::ShoutoutSuccessfullyRequested,
            Self::FulfillShoutoutRequest(_) => MessageType::FulfillShoutoutRequest,
            Self::ShoutoutUploaded(_) => MessageType::ShoutoutUploaded,
            Self::ShoutoutSuccessfullyTranscoded(_) => MessageType::ShoutoutSuccessfullyTranscoded,
        }
    }
}

/// A concrete message type that can be registered on the bus.
pub trait BusMessage: Clone + Send + Sync + 'static {
    /// Registry key.
    const TYPE: MessageType;

    /// Wraps into [`Message`].
    fn into_message(self) -> Message;

    /// Unwraps from [`Message`], `None` on type mismatch.
    fn from_message(message: Message) -> Option<Self>;
}

macro_rules! bus_message {
    ($ty:ty, $variant:ident) => {
        impl BusMessage for $ty {
            const TYPE: MessageType = MessageType::$variant;

            fn into_message(self) -> Message {
                Message::$variant(self)
            }

            fn from_message(message: Message) -> Option<Self> {
                match message {
                    Message::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Message {
            fn from(value: $ty) -> Self {
                Message::$variant(value)
            }
        }
    };
}

bus_message!(RequestShoutoutCommand, RequestShoutout);
bus_message!(ShoutoutSuccessfullyRequestedEvent, ShoutoutSuccessfullyRequested);
bus_message!(FulfillShoutoutRequestCommand, FulfillShoutoutRequest);
bus_message!(ShoutoutUploadedEvent, ShoutoutUploaded);
bus_message!(ShoutoutSuccessfullyTranscodedEvent, ShoutoutSuccessfullyTranscoded);
