//! Adapters that implement the domain ports against the remote cloud.

pub mod poynt;
