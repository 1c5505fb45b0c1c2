//! Serde-ready snapshots of the rendered console structure.
//!
//! Observers never get a handle into live buffer state: the initial render
//! (and any host that ships console content across a boundary, e.g. to a web
//! view) reads these immutable copies instead. Conversion from core types is
//! one-way by design — the display layer cannot mutate the buffer.

use serde::{Deserialize, Serialize};
use vconsole_core::{Color, ConsoleBuffer, Line, LinkTarget, TextRun};

/// A color as carried in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotColor {
    Default,
    Named { index: u8 },
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

impl From<Color> for SnapshotColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Default => Self::Default,
            Color::Named(index) => Self::Named { index },
            Color::Indexed(index) => Self::Indexed { index },
            Color::Rgb(r, g, b) => Self::Rgb { r, g, b },
        }
    }
}

/// A resolved hyperlink target as carried in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotTarget {
    File {
        path: String,
        line: Option<u32>,
        col: Option<u32>,
    },
    Url {
        url: String,
    },
}

impl From<&LinkTarget> for SnapshotTarget {
    fn from(target: &LinkTarget) -> Self {
        match target {
            LinkTarget::File { path, line, col } => Self::File {
                path: path.clone(),
                line: *line,
                col: *col,
            },
            LinkTarget::Url(url) => Self::Url { url: url.clone() },
        }
    }
}

/// One styled run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub text: String,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub strikethrough: bool,
    pub fg: SnapshotColor,
    pub bg: SnapshotColor,
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<SnapshotTarget>,
}

impl From<&TextRun> for RunSnapshot {
    fn from(run: &TextRun) -> Self {
        use vconsole_core::StyleFlags as F;
        let flags = run.style.flags;
        Self {
            text: run.text.clone(),
            bold: flags.contains(F::BOLD),
            dim: flags.contains(F::DIM),
            italic: flags.contains(F::ITALIC),
            underline: flags.contains(F::UNDERLINE),
            inverse: flags.contains(F::INVERSE),
            strikethrough: flags.contains(F::STRIKETHROUGH),
            fg: run.style.fg.into(),
            bg: run.style.bg.into(),
            classes: run.style.classes.to_vec(),
            link: run.link.as_ref().map(|info| (&info.target).into()),
        }
    }
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub runs: Vec<RunSnapshot>,
}

impl From<&Line> for LineSnapshot {
    fn from(line: &Line) -> Self {
        Self {
            runs: line.runs().iter().map(RunSnapshot::from).collect(),
        }
    }
}

/// A consistent, fully-applied copy of the whole buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSnapshot {
    pub lines: Vec<LineSnapshot>,
}

impl From<&ConsoleBuffer> for ConsoleSnapshot {
    fn from(buffer: &ConsoleBuffer) -> Self {
        Self {
            lines: buffer.iter_lines().map(LineSnapshot::from).collect(),
        }
    }
}
