//! Production "glue" for the ambassador: real sockets, a real upstream
//! websocket client, and a real `hyper`-based HTTP client wrapping the
//! Sans-IO security logic in `ambassador-core`.
//!
//! Mirrors the teacher's `lockframe-server` split: a thin `main.rs` binary
//! wires up CLI args and logging, while this library exposes the listener
//! driver loops so integration tests can drive them over real sockets
//! without going through the binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod executor;
pub mod game_listener;
pub mod http_listener;
pub mod transport;

pub use error::ServerError;
pub use executor::HyperRequestExecutor;
