//! Client library for Binance-style spot exchange APIs.
//!
//! Provides a signed REST [`Client`] with market data and trading
//! endpoints, typed models, and an aggregated-trade WebSocket feed with
//! callback delivery and an explicit stop handle.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod trading;
pub mod transport;
pub mod websocket;

pub use auth::Credentials;
pub use client::{Client, Params};
pub use error::{Result, SpotkitError};
