//! The virtual console session façade.
//!
//! [`VirtualConsole`] wires the scanner to the buffer and owns the coalesced
//! flush discipline: a busy interpreter can emit thousands of chunks per
//! second, and re-rendering per chunk would saturate the UI thread. Instead,
//! the first change after a flush arms a pending flag and invokes the host's
//! schedule hook once; every further change before the host calls
//! [`VirtualConsole::flush`] is subsumed into the same pending notification.
//! The final flush after a burst always reflects the cumulative state.
//!
//! Observers are only ever notified after an entire submit batch has been
//! applied, never mid-batch, so readers always see consistent state.

use vconsole_core::{
    ConsoleBuffer, DEFAULT_MAX_LINES, FlushDelta, HyperlinkInfo, Scanner, Style,
};

use crate::snapshot::ConsoleSnapshot;

/// A virtual console session: one interpreter output stream, one buffer.
pub struct VirtualConsole {
    scanner: Scanner,
    buffer: ConsoleBuffer,
    /// At-most-one-outstanding-notification flag. Armed on the first change
    /// after a flush; disarmed by [`Self::flush`].
    flush_pending: bool,
    /// Host hook invoked on the disarmed -> armed transition. The host is
    /// expected to schedule a deferred [`Self::flush`] call on its event
    /// loop; the content is idempotent to recompute, so superseding is just
    /// "don't schedule again".
    schedule: Option<Box<dyn FnMut()>>,
}

impl Default for VirtualConsole {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl VirtualConsole {
    /// Create a console capped at `max_lines` scrollback lines.
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            scanner: Scanner::new(),
            buffer: ConsoleBuffer::new(max_lines),
            flush_pending: false,
            schedule: None,
        }
    }

    /// Install the host's deferred-flush hook.
    ///
    /// Called at most once per pending period; the host must not read or
    /// mutate the console from inside the hook — it only schedules.
    pub fn on_flush_scheduled(&mut self, hook: impl FnMut() + 'static) {
        self.schedule = Some(Box::new(hook));
    }

    /// Submit a raw output chunk with no default class.
    pub fn submit(&mut self, text: &str) {
        self.submit_styled(text, &Style::default());
    }

    /// Submit a raw output chunk, tagging runs with `class` (e.g. `"error"`
    /// for stderr). The class composes with any SGR-derived styling.
    pub fn submit_with_class(&mut self, text: &str, class: &str) {
        self.submit_styled(text, &Style::with_class(class));
    }

    /// Submit a chunk against an explicit default style token.
    pub fn submit_styled(&mut self, text: &str, default_style: &Style) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("console_submit", chunk_len = text.len());
        #[cfg(feature = "tracing")]
        let _guard = _span.enter();

        let tokens = self.scanner.scan(text);
        self.buffer.ingest(&tokens, default_style);

        #[cfg(feature = "tracing")]
        tracing::trace!(tokens = tokens.len(), "chunk ingested");

        self.arm_if_dirty();
    }

    /// Deliver the pending change set and disarm the notification flag.
    ///
    /// Returns `None` when nothing changed since the last flush. The delta
    /// reports the earliest mutated line (observers re-render only the
    /// affected suffix) and the head-eviction count (observers shift any
    /// externally held line indices).
    pub fn flush(&mut self) -> Option<FlushDelta> {
        self.flush_pending = false;
        let delta = self.buffer.take_delta();

        #[cfg(feature = "tracing")]
        if let Some(d) = &delta {
            tracing::trace!(
                first_dirty = d.first_dirty_line,
                evicted = d.lines_evicted,
                "flush delivered"
            );
        }

        delta
    }

    /// Whether a flush is pending.
    #[must_use]
    pub fn flush_pending(&self) -> bool {
        self.flush_pending
    }

    /// An immutable copy of the current rendered structure.
    #[must_use]
    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot::from(&self.buffer)
    }

    /// Resolve a hyperlink activation at `(row, col)`.
    ///
    /// The engine performs no navigation; the host acts on the returned
    /// target (open an editor at the position, open an external URL).
    #[must_use]
    pub fn hyperlink_at(&self, row: usize, col: usize) -> Option<HyperlinkInfo> {
        self.buffer.link_at(row, col).cloned()
    }

    /// Current line count.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Visible text of one line, styles stripped.
    #[must_use]
    pub fn line_text(&self, row: usize) -> Option<String> {
        self.buffer.line_text(row)
    }

    /// Change the scrollback cap.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.buffer.set_max_lines(max_lines);
        self.arm_if_dirty();
    }

    /// Clear the console to a single empty line.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.arm_if_dirty();
    }

    fn arm_if_dirty(&mut self) {
        if self.buffer.has_changes() && !self.flush_pending {
            self.flush_pending = true;
            if let Some(hook) = self.schedule.as_mut() {
                hook();
            }
        }
    }
}
