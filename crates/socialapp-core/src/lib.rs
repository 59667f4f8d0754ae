//! Core socialapp library (session store, API client, credential persistence, config).

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod logging;
