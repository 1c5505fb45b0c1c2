//! Styled lines and text runs.
//!
//! A [`Line`] is an ordered sequence of [`TextRun`]s plus a logical write
//! column. Carriage return moves the column to 0 without erasing anything;
//! the next write then replaces exactly the columns it covers while content
//! beyond the overwritten span stays visible. This is the overwrite-in-place
//! semantic that progress bars and spinners rely on.
//!
//! Invariant: no two consecutive runs share an identical `(style, link)`
//! token — every mutation re-normalizes run boundaries.

use crate::link::HyperlinkInfo;
use crate::style::Style;

/// A run of text with one style token and optional hyperlink annotation.
///
/// Owned by exactly one [`Line`]. Immutable once appended except for
/// truncation/splitting caused by an overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub style: Style,
    pub link: Option<HyperlinkInfo>,
}

impl TextRun {
    /// Width of this run in character columns.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether another run's token matches and the two could merge.
    ///
    /// A hyperlink boundary is always a split point: two runs merge only
    /// when both style and link annotation are identical.
    #[must_use]
    pub fn same_token(&self, style: &Style, link: Option<&HyperlinkInfo>) -> bool {
        self.style == *style && self.link.as_ref() == link
    }
}

/// One logical console line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    runs: Vec<TextRun>,
    /// 0-based char column where the next write begins.
    cursor: usize,
}

impl Line {
    /// Create an empty line with the cursor at column 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The runs of this line, left to right.
    #[must_use]
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Total width in character columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.runs.iter().map(TextRun::char_len).sum()
    }

    /// The logical write column.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The visible text of the line, styles stripped.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Move the write column to 0. Content is untouched.
    pub fn carriage_return(&mut self) {
        self.cursor = 0;
    }

    /// Move the write column left by `n`, clamped at 0.
    ///
    /// Does not delete characters by itself; deletion only happens when
    /// subsequent text overwrites the columns.
    pub fn backspace(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    /// Look up the hyperlink annotation covering a character column.
    #[must_use]
    pub fn link_at(&self, col: usize) -> Option<&HyperlinkInfo> {
        let mut start = 0;
        for run in &self.runs {
            let end = start + run.char_len();
            if col < end {
                return run.link.as_ref();
            }
            start = end;
        }
        None
    }

    /// Write `text` at the current column, overwriting in place.
    ///
    /// New text replaces exactly the columns it covers; old text beyond the
    /// overwritten span remains visible. At end-of-line this is a plain
    /// append, merging into the previous run when the token matches. The
    /// write column advances by the character count written.
    pub fn write(&mut self, text: &str, style: &Style, link: Option<&HyperlinkInfo>) {
        let n = text.chars().count();
        if n == 0 {
            return;
        }

        let start = self.cursor;
        let end = (start + n).min(self.width());

        let mut new_runs: Vec<TextRun> = Vec::with_capacity(self.runs.len() + 2);
        let mut inserted = false;
        let mut col = 0;

        let new_run = || TextRun {
            text: text.to_string(),
            style: style.clone(),
            link: link.cloned(),
        };

        for run in self.runs.drain(..) {
            let run_len = run.char_len();
            let run_start = col;
            let run_end = col + run_len;
            col = run_end;

            if run_end <= start {
                push_merged(&mut new_runs, run);
                continue;
            }
            if run_start >= end {
                if !inserted {
                    push_merged(&mut new_runs, new_run());
                    inserted = true;
                }
                push_merged(&mut new_runs, run);
                continue;
            }

            // The run overlaps the overwritten span.
            if run_start < start {
                push_merged(
                    &mut new_runs,
                    TextRun {
                        text: slice_chars(&run.text, 0, start - run_start),
                        style: run.style.clone(),
                        link: run.link.clone(),
                    },
                );
            }
            if !inserted {
                push_merged(&mut new_runs, new_run());
                inserted = true;
            }
            if run_end > end {
                push_merged(
                    &mut new_runs,
                    TextRun {
                        text: slice_chars(&run.text, end - run_start, run_len),
                        style: run.style,
                        link: run.link,
                    },
                );
            }
            // Fully covered remainder is dropped.
        }

        if !inserted {
            push_merged(&mut new_runs, new_run());
        }

        self.runs = new_runs;
        self.cursor = start + n;
    }
}

/// Append a run, merging into the previous run when the token matches and
/// dropping empty runs.
fn push_merged(runs: &mut Vec<TextRun>, run: TextRun) {
    if run.text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.same_token(&run.style, run.link.as_ref()) => {
            last.text.push_str(&run.text);
        }
        _ => runs.push(run),
    }
}

/// Slice a string by char indices `[from, to)`.
fn slice_chars(s: &str, from: usize, to: usize) -> String {
    s.chars().skip(from).take(to.saturating_sub(from)).collect()
}
