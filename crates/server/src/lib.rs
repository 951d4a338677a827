//! Academy API server library.
//!
//! Content CMS (posts, services, programs, team, portfolio), first-party
//! analytics, translation dictionaries and image uploads behind one JSON API.
//! The binary in `main.rs` wires configuration, telemetry and the listener;
//! everything else lives here so it can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
