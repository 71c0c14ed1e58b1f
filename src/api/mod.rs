//! Dayforce REST resources
//!
//! [`DayforceClient`] knows the resource paths and which query parameters
//! each one requires; missing parameters are reported before any request is
//! sent.

mod client;
pub mod resources;

pub use client::DayforceClient;
