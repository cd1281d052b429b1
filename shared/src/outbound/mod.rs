//! Outbound adapters implementing the domain's driven ports.

mod http_support;

pub mod firebase;
pub mod location;
pub mod memory;
pub mod places;
