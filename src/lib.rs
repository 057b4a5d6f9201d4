//! Shipment capacity planning
//!
//! Container and packing box management for outbound shipments: capacity and
//! safety validation, automatic container loading, box type selection,
//! packaging calculations and the packing box lifecycle.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod common;
pub mod config;
pub mod context;
pub mod db;
pub mod entities;
pub mod errors;
pub mod services;

pub use context::OperationContext;
pub use errors::ServiceError;
pub use services::CapacityServices;
