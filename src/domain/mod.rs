//! Domain types shared by every layer: validated amounts, payment commands,
//! callback results, credentials, and the ports the application depends on.

pub mod amount;
pub mod callback;
pub mod credentials;
pub mod payment;
pub mod ports;
