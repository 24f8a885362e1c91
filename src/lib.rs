//! Minimal async WebSocket layer for constrained peers.
//!
//! This library speaks a restricted single-frame subset of the WebSocket wire
//! format directly over tokio TCP streams: the opening HTTP upgrade handshake
//! (client and server roles), `[opcode][length][payload]` frames with payloads
//! up to 125 bytes, keepalive ping/pong, and the `{room, msg}` / `{join}` JSON
//! envelope convention some embedded peers layer on top of Text frames.
//!
//! It does not implement fragmentation, payload masking, extended lengths or
//! TLS, and it does not route broadcasts between connections: a room is just a
//! tag in the envelope, and fan-out belongs to an application-side registry
//! holding a [`split::WSWriter`] per member connection.
//!
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod frame;
pub mod handshake;
mod keepalive;
mod read;
mod request;
pub mod room;
pub mod server;
pub mod split;
mod utils;
mod write;
