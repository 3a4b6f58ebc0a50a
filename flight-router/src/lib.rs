//! Flight network routing server.
//!
//! Finds cheapest, fastest and most reliable routes through a network of
//! airports and flights, and keeps them current as flights are delayed or
//! cancelled.

pub mod cache;
pub mod disruption;
pub mod domain;
pub mod network;
pub mod planner;
pub mod service;
pub mod stats;
pub mod web;
