//! The console buffer: ordered lines, scrollback cap, dirty tracking.
//!
//! Lines are stored in a `VecDeque` in chronological order; the current line
//! (the one receiving input) is always the back line, and eviction pops from
//! the front. The buffer records the earliest line mutated since the last
//! flush plus the number of lines evicted from the head, so observers can
//! re-render only the affected suffix and fix up any externally held line
//! indices.

use std::collections::VecDeque;

use crate::line::Line;
use crate::link::{HyperlinkInfo, detect_links};
use crate::scanner::Token;
use crate::style::Style;

/// Default scrollback cap in lines.
pub const DEFAULT_MAX_LINES: usize = 1000;

/// Change set reported to the observer on flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushDelta {
    /// Index of the earliest line mutated since the last flush, in the
    /// buffer's post-eviction coordinates.
    pub first_dirty_line: usize,
    /// Lines removed from the head by scrollback eviction since the last
    /// flush. Observers holding line indices must shift them down by this.
    pub lines_evicted: usize,
    /// Total line count after the batch.
    pub line_count: usize,
}

/// Ordered sequence of styled lines with a scrollback cap.
#[derive(Debug, Clone)]
pub struct ConsoleBuffer {
    lines: VecDeque<Line>,
    max_lines: usize,
    /// Active SGR state; classes never live here (they come from the
    /// caller's default token at composition time).
    active: Style,
    /// Open OSC 8 marker scope, if any.
    open_link: Option<HyperlinkInfo>,
    first_dirty: Option<usize>,
    evicted: usize,
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl ConsoleBuffer {
    /// Create a buffer holding at most `max_lines` lines (minimum 1).
    ///
    /// The buffer always contains at least one (possibly empty) line.
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Line::new());
        Self {
            lines,
            max_lines: max_lines.max(1),
            active: Style::default(),
            open_link: None,
            first_dirty: None,
            evicted: 0,
        }
    }

    /// Current number of lines (always >= 1).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The scrollback cap.
    #[must_use]
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Get a line by index (0 = oldest).
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// The visible text of a line, styles stripped.
    #[must_use]
    pub fn line_text(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(Line::text)
    }

    /// Iterate over lines from oldest to newest.
    pub fn iter_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Look up the hyperlink annotation at a (line, column) position.
    ///
    /// This is the hyperlink activation boundary: the host resolves a click
    /// to a [`HyperlinkInfo`] here and performs any navigation itself.
    #[must_use]
    pub fn link_at(&self, row: usize, col: usize) -> Option<&HyperlinkInfo> {
        self.lines.get(row).and_then(|line| line.link_at(col))
    }

    /// Change the scrollback cap (minimum 1), evicting immediately if the
    /// buffer shrank below its current length.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines.max(1);
        self.evict_overflow();
    }

    /// Reset to a single empty line.
    ///
    /// Reported to observers as "everything evicted" plus a dirty line 0.
    pub fn clear(&mut self) {
        self.evicted += self.lines.len();
        self.lines.clear();
        self.lines.push_back(Line::new());
        self.active = Style::default();
        self.open_link = None;
        self.first_dirty = Some(0);
    }

    /// Apply a batch of scanner tokens against the buffer.
    ///
    /// `default_style` is the caller's default token for this batch (e.g.
    /// carrying an `"error"` class for stderr chunks); it is the reset base
    /// for SGR state and composes with SGR-derived attributes. Ingestion
    /// never fails: unknown controls are no-ops.
    pub fn ingest(&mut self, tokens: &[Token], default_style: &Style) {
        for token in tokens {
            match token {
                Token::Text(text) => self.write_text(text, default_style),
                Token::CarriageReturn => self.current_mut().carriage_return(),
                Token::Backspace(n) => self.current_mut().backspace(*n),
                Token::Newline => self.newline(),
                Token::Sgr(params) => self.active = self.active.apply_sgr(params),
                Token::Hyperlink(Some(payload)) => {
                    self.open_link = Some(HyperlinkInfo::from_payload(payload));
                }
                Token::Hyperlink(None) => self.open_link = None,
                Token::UnknownControl(_) => {}
            }
        }
    }

    /// Take the accumulated change set, resetting dirty state.
    ///
    /// Returns `None` when nothing changed since the last call.
    pub fn take_delta(&mut self) -> Option<FlushDelta> {
        if self.first_dirty.is_none() && self.evicted == 0 {
            return None;
        }
        let delta = FlushDelta {
            first_dirty_line: self.first_dirty.unwrap_or(0),
            lines_evicted: self.evicted,
            line_count: self.lines.len(),
        };
        self.first_dirty = None;
        self.evicted = 0;
        Some(delta)
    }

    /// Whether changes are pending since the last [`Self::take_delta`].
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.first_dirty.is_some() || self.evicted > 0
    }

    fn current_mut(&mut self) -> &mut Line {
        // The deque is never empty.
        self.lines.back_mut().expect("buffer holds at least one line")
    }

    fn mark_dirty(&mut self, row: usize) {
        self.first_dirty = Some(match self.first_dirty {
            Some(d) => d.min(row),
            None => row,
        });
    }

    fn write_text(&mut self, text: &str, default_style: &Style) {
        let style = self.active.composed_with(default_style);
        let row = self.lines.len() - 1;

        if let Some(link) = self.open_link.clone() {
            // Explicit marker scope takes precedence over auto-detection.
            self.current_mut().write(text, &style, Some(&link));
        } else {
            let spans = detect_links(text);
            if spans.is_empty() {
                self.current_mut().write(text, &style, None);
            } else {
                let mut prev = 0;
                for (range, _target) in &spans {
                    if range.start > prev {
                        self.current_mut()
                            .write(&text[prev..range.start], &style, None);
                    }
                    let uri = &text[range.clone()];
                    let info = HyperlinkInfo::from_uri(uri);
                    self.current_mut().write(uri, &style, Some(&info));
                    prev = range.end;
                }
                if prev < text.len() {
                    self.current_mut().write(&text[prev..], &style, None);
                }
            }
        }
        self.mark_dirty(row);
    }

    fn newline(&mut self) {
        // Style reset point: SGR state never crosses a line boundary.
        self.active = Style::default();
        self.lines.push_back(Line::new());
        let row = self.lines.len() - 1;
        self.mark_dirty(row);
        self.evict_overflow();
    }

    fn evict_overflow(&mut self) {
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
            self.evicted += 1;
            // Shift the dirty index with the head removal; a dirty line that
            // was itself evicted pins the index at 0.
            self.first_dirty = self.first_dirty.map(|d| d.saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkTarget;
    use crate::scanner::Scanner;
    use crate::style::{Color, StyleFlags};

    fn feed(buffer: &mut ConsoleBuffer, scanner: &mut Scanner, chunk: &str) {
        let tokens = scanner.scan(chunk);
        buffer.ingest(&tokens, &Style::default());
    }

    fn texts(buffer: &ConsoleBuffer) -> Vec<String> {
        buffer.iter_lines().map(Line::text).collect()
    }

    #[test]
    fn starts_with_one_empty_line() {
        let buffer = ConsoleBuffer::new(10);
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line_text(0).unwrap(), "");
        assert!(!buffer.has_changes());
    }

    #[test]
    fn newline_appends_and_current_is_last() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "one\ntwo");
        assert_eq!(texts(&buffer), vec!["one", "two"]);
    }

    #[test]
    fn overwrite_in_place() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "abcdef\rXYZ");
        assert_eq!(buffer.line_text(0).unwrap(), "XYZdef");
    }

    #[test]
    fn scrollback_cap_evicts_oldest() {
        let mut buffer = ConsoleBuffer::new(3);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "1\n2\n3\n4\n5");
        assert_eq!(texts(&buffer), vec!["3", "4", "5"]);

        let delta = buffer.take_delta().unwrap();
        assert_eq!(delta.lines_evicted, 2);
        assert_eq!(delta.line_count, 3);
    }

    #[test]
    fn sgr_styles_following_text() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "\u{1b}[1;31mhot\u{1b}[0m cold");
        let runs = buffer.line(0).unwrap().runs();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].style.flags.contains(StyleFlags::BOLD));
        assert_eq!(runs[0].style.fg, Color::Named(1));
        assert!(runs[1].style.is_plain());
    }

    #[test]
    fn style_resets_on_newline() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "\u{1b}[1;31mred\nnext");
        let runs = buffer.line(1).unwrap().runs();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].style.is_plain());
    }

    #[test]
    fn style_persists_across_chunks_within_a_line() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "\u{1b}[31mab");
        feed(&mut buffer, &mut scanner, "cd");
        let runs = buffer.line(0).unwrap().runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "abcd");
        assert_eq!(runs[0].style.fg, Color::Named(1));
    }

    #[test]
    fn default_class_tags_runs() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        let tokens = scanner.scan("\u{1b}[31moops");
        buffer.ingest(&tokens, &Style::with_class("error"));
        let runs = buffer.line(0).unwrap().runs();
        assert_eq!(runs[0].style.classes.as_slice(), ["error".to_string()]);
        assert_eq!(runs[0].style.fg, Color::Named(1));
    }

    #[test]
    fn marker_scope_tags_text() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(
            &mut buffer,
            &mut scanner,
            "see \u{1b}]8;;file:///f.R?line=42&col=7\u{7}f.R\u{1b}]8;;\u{7} ok",
        );
        let line = buffer.line(0).unwrap();
        assert_eq!(line.text(), "see f.R ok");
        let info = buffer.link_at(0, 4).unwrap();
        assert_eq!(
            info.target,
            LinkTarget::File {
                path: "/f.R".to_string(),
                line: Some(42),
                col: Some(7),
            }
        );
        assert!(buffer.link_at(0, 0).is_none());
        assert!(buffer.link_at(0, 8).is_none());
    }

    #[test]
    fn bare_url_is_auto_linked() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "docs at https://example.com now");
        let line = buffer.line(0).unwrap();
        assert_eq!(line.runs().len(), 3);
        let info = buffer.link_at(0, 10).unwrap();
        assert_eq!(info.uri, "https://example.com");
    }

    #[test]
    fn auto_detection_skipped_inside_marker_scope() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(
            &mut buffer,
            &mut scanner,
            "\u{1b}]8;;https://outer.test\u{7}https://inner.test\u{1b}]8;;\u{7}",
        );
        let info = buffer.link_at(0, 3).unwrap();
        assert_eq!(info.uri, "https://outer.test");
    }

    #[test]
    fn unknown_controls_are_no_ops() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "a\u{1b}[2Jb\u{1b}]0;t\u{7}c");
        assert_eq!(buffer.line_text(0).unwrap(), "abc");
    }

    #[test]
    fn delta_reports_earliest_dirty_line() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "a\nb\nc");
        let _ = buffer.take_delta();

        feed(&mut buffer, &mut scanner, "more");
        let delta = buffer.take_delta().unwrap();
        assert_eq!(delta.first_dirty_line, 2);
        assert_eq!(delta.lines_evicted, 0);
    }

    #[test]
    fn eviction_shifts_dirty_index() {
        let mut buffer = ConsoleBuffer::new(2);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "a\nb");
        let _ = buffer.take_delta();

        feed(&mut buffer, &mut scanner, "\nc");
        let delta = buffer.take_delta().unwrap();
        assert_eq!(delta.lines_evicted, 1);
        // The new line was appended at index 2, shifted to 1 by eviction.
        assert_eq!(delta.first_dirty_line, 1);
    }

    #[test]
    fn take_delta_is_none_when_clean() {
        let mut buffer = ConsoleBuffer::new(10);
        assert!(buffer.take_delta().is_none());
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "x");
        assert!(buffer.take_delta().is_some());
        assert!(buffer.take_delta().is_none());
    }

    #[test]
    fn set_max_lines_evicts_immediately() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "1\n2\n3\n4");
        let _ = buffer.take_delta();

        buffer.set_max_lines(2);
        assert_eq!(texts(&buffer), vec!["3", "4"]);
        let delta = buffer.take_delta().unwrap();
        assert_eq!(delta.lines_evicted, 2);
    }

    #[test]
    fn clear_resets_to_single_line() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "a\nb\nc");
        let _ = buffer.take_delta();

        buffer.clear();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line_text(0).unwrap(), "");
        let delta = buffer.take_delta().unwrap();
        assert_eq!(delta.lines_evicted, 3);
        assert_eq!(delta.first_dirty_line, 0);
    }

    #[test]
    fn backspace_then_text_overwrites() {
        let mut buffer = ConsoleBuffer::new(10);
        let mut scanner = Scanner::new();
        feed(&mut buffer, &mut scanner, "100%\u{8}\u{8}\u{8}\u{8}done");
        assert_eq!(buffer.line_text(0).unwrap(), "done");
    }

    #[test]
    fn split_ingest_merges_runs() {
        let mut a = ConsoleBuffer::new(10);
        let mut b = ConsoleBuffer::new(10);
        let mut sa = Scanner::new();
        let mut sb = Scanner::new();

        feed(&mut a, &mut sa, "AB");
        feed(&mut a, &mut sa, "CD");
        feed(&mut b, &mut sb, "ABCD");

        assert_eq!(a.line(0).unwrap().runs(), b.line(0).unwrap().runs());
        assert_eq!(a.line(0).unwrap().runs().len(), 1);
    }
}
