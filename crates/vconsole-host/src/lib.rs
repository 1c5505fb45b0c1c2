#![forbid(unsafe_code)]

//! Host adapter for the virtual console engine.
//!
//! `vconsole-host` wraps [`vconsole_core`] in the surface a display layer
//! actually consumes:
//!
//! - [`VirtualConsole`]: the session façade — submit raw chunks, receive
//!   coalesced flush notifications, read immutable snapshots.
//! - [`snapshot`]: serde-ready copies of the rendered structure for host
//!   interop (initial render, tests, transport to a web view).
//! - [`popup`]: the command popup positioning helper, a self-contained
//!   pixel-geometry policy for anchoring a transient overlay.
//!
//! The engine is single-threaded cooperative: ingestion happens on the host
//! event loop, and the only suspension point is the deferred flush the host
//! schedules through [`VirtualConsole::on_flush_scheduled`].

pub mod console;
pub mod popup;
pub mod snapshot;

pub use console::VirtualConsole;
pub use popup::{CommandPopup, PixelPoint, PixelRect, PixelSize};
pub use snapshot::{ConsoleSnapshot, LineSnapshot, RunSnapshot, SnapshotColor, SnapshotTarget};
pub use vconsole_core::{FlushDelta, HyperlinkInfo, LinkTarget, Style};
