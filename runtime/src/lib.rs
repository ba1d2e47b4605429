//! # Shoutout Runtime
//!
//! Executes the fulfillment saga: an in-process [`MessageBus`], the saga step
//! handlers, the gateway-backed units of work, and the wiring that builds a
//! fresh bus per request.
//!
//! ```text
//! RequestShoutoutCommand ─► persist ─► charge ─► ShoutoutSuccessfullyRequestedEvent
//!                                                  ├─► email customer
//!                                                  └─► email talent
//!
//! FulfillShoutoutRequestCommand ─► validate ─► persist ─► capture ─► ShoutoutUploadedEvent
//!                                                                     └─► schedule transcoding
//!                            (worker) ShoutoutSuccessfullyTranscodedEvent ─► email customer
//! ```

pub mod adapters;
pub mod bus;
pub mod environment;
pub mod reporting;
pub mod retry;
pub mod routes;
pub mod services;

pub use bus::{HandlerResult, MessageBus};
pub use environment::ShoutoutEnvironment;
pub use reporting::TracingErrorTracker;
pub use routes::{charge_order_bus, fulfill_shoutout_request_bus};
