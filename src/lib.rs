//! Webchat widget - embeddable customer-support chat core
//!
//! Owns a per-widget session, the conversation log and the exchange state
//! machine, and relays each user message to an automation webhook.

pub mod api;
pub mod config;
pub mod conversation;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod webhook;
pub mod widget;
