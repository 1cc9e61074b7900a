//! # Global Trade Telegram Bot
//!
//! A Telegram bot that lets customers of a trade/logistics business track
//! their shipments: the user picks an option from an inline menu, sends a
//! tracking code and receives the shipment's status history fetched from
//! the logistics provider's API.

pub mod assets;
pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod localization;
pub mod logging;
pub mod menu;
pub mod report;
pub mod session;
pub mod shipment;
pub mod tls_listener;
pub mod tracking_client;
pub mod tracking_errors;
pub mod transport;
