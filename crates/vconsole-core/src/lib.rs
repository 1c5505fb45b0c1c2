#![forbid(unsafe_code)]

//! Host-agnostic virtual console engine.
//!
//! `vconsole-core` is the platform-independent output model at the heart of
//! the console display. It owns ANSI/control scanning, style resolution,
//! hyperlink tagging, and the overwrite-correct line buffer — all without any
//! host I/O dependencies.
//!
//! # Primary responsibilities
//!
//! - **Scanner**: streaming tokenizer that splits raw chunks into text runs
//!   and control actions, carrying partial escape sequences across chunks.
//! - **Style**: SGR attribute resolution into a normalized, composable token
//!   (flags, colors, class names).
//! - **Link**: OSC 8 hyperlink payloads plus passive URL auto-detection.
//! - **Line**: ordered styled runs with a logical write column; carriage
//!   return overwrites in place instead of erasing.
//! - **ConsoleBuffer**: ordered lines with a scrollback cap, oldest-first
//!   eviction, and dirty tracking for incremental re-render.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic; the host adapter supplies
//!   chunks and schedules flushes.
//! - **Deterministic**: identical chunk sequences always produce identical
//!   state, regardless of how the input was split.
//! - **Fail-soft**: malformed or hostile input degrades to no-ops; nothing in
//!   this crate panics on untrusted output.

pub mod buffer;
pub mod line;
pub mod link;
pub mod scanner;
pub mod style;

pub use buffer::{ConsoleBuffer, DEFAULT_MAX_LINES, FlushDelta};
pub use line::{Line, TextRun};
pub use link::{HyperlinkInfo, LinkPayload, LinkTarget, detect_links, parse_target};
pub use scanner::{Scanner, Token};
pub use style::{Color, Style, StyleFlags};
