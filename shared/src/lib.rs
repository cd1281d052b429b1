//! PupFiesta shared core.
//!
//! Dog-owner accounts, dog profiles mirrored into the owner's document, dog
//! park discovery and the screen reducers that drive them. Layout follows the
//! hexagonal split: `domain` owns models, ports and the Firebase repository;
//! `outbound` holds the Firebase, Places, location and in-memory adapters;
//! `inbound::view_models` exposes the reducers a UI binds to.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;
pub mod telemetry;
