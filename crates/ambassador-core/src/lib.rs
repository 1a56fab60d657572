//! Sans-IO security logic for the ambassador game/HTTP proxy.
//!
//! This crate holds the trust boundary itself: the SWF decompressor and
//! scanner (C2/C3), the path-prefix router (C4), the secure HTTP pipeline
//! (C5), and the per-connection game session (C6). None of it touches a
//! concrete socket type. Capability traits in [`capability`] and
//! [`pipeline::RequestExecutor`] are the only seams to the outside world,
//! implemented by `ambassador-server` in production and by in-memory mocks
//! in tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod http;
pub mod pipeline;
pub mod router;
pub mod session;
pub mod swf;

pub use capability::{PacketReader, PacketWriter};
pub use http::{HTTPRequest, HTTPResponse};
pub use pipeline::{ExecutorError, RequestExecutor, SecureHttpPipeline};
pub use router::{render_main_xml, PathRouter, RoutingConfiguration};
pub use session::{GameProxySession, SessionError, SessionState, SERVER_TO_CLIENT_WHITELIST};
pub use swf::{decompress_swf, is_swf, scan_blacklist, SwfError, BLACKLIST};
