//! Application layer: the request/callback correlation core.
//!
//! A payment request registers a single-use channel in the shared
//! [`registry::PendingRegistry`], dispatches its command, and waits. The
//! terminal's callback arrives on an unrelated HTTP request and is routed
//! through the same registry to the waiting task. [`gateway::PaymentGateway`]
//! owns one registry and wires both sides to it.

pub mod callback;
pub mod correlator;
pub mod credentials;
pub mod gateway;
pub mod registry;
