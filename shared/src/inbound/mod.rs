//! Inbound adapters driving the domain.
//!
//! The view models are the driving side: UI hosts send events in and observe
//! published state.

pub mod view_models;
