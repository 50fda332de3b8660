//! Client side of the funnel.
//!
//! `flow` is the payment state machine, `hints` the advisory local cache and
//! draft storage, `client` the HTTP driver that ties them to the server.
//! Nothing in here is trusted by the server.

pub mod client;
pub mod flow;
pub mod hints;

pub use client::{CheckoutUi, ClientError, FunnelClient, FunnelOutcome};
pub use flow::{CheckoutEvent, CheckoutFlow, CheckoutState, FlowError, PaymentApproval};
pub use hints::{AccessHints, LocalStore};
