//! Checkout steps.
//!
//! The [`PaymentIntent`](payflow_sdk::objects::PaymentIntent) moves between
//! steps as a flat parameter set ([`StateCarrier`]); [`CheckoutFlow`] holds
//! the typed transitions and recomputes derived fields whenever a step is
//! restored.

mod carrier;
mod flow;

pub use carrier::{CarrierDefaults, StateCarrier};
pub use flow::{CheckoutFlow, ContinueOutcome, Settlement, ValidationError};
