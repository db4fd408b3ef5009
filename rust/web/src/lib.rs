//! # bluffpoker_web: Transport Layer for the Bluff-Poker Game
//!
//! Hosts [`bluffpoker_engine`] games behind an HTTP/SSE API. Each session
//! owns one independent game guarded by its own mutex; a shared event bus
//! fans state changes out to subscribed clients; bot seats are driven by
//! [`bluffpoker_ai`] whenever the turn lands on one.
//!
//! ## Modules
//!
//! - [`users`] - username validation and online identity directory
//! - [`session`] - session registry and the per-game call wrappers
//! - [`events`] - game event types and the per-session event bus
//! - [`bots`] - bot seats and turn driving
//! - [`server`] - warp routes, server lifecycle, SSE streaming
//! - [`settings`] - validated configuration with env overrides
//! - [`errors`] - HTTP error response mapping
//! - [`logging`] - tracing subscriber setup

pub mod bots;
pub mod errors;
pub mod events;
pub mod logging;
pub mod server;
pub mod session;
pub mod settings;
pub mod users;
