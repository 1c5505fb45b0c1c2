//! Streaming control scanner.
//!
//! The scanner is a deterministic state machine that splits an incoming text
//! chunk into plain-text runs interleaved with control actions. It covers:
//!
//! - plain text (including multi-byte characters) -> [`Token::Text`]
//! - carriage return, newline, backspace -> dedicated tokens
//! - CSI `m` (SGR) sequences -> [`Token::Sgr`]
//! - OSC 8 hyperlink markers -> [`Token::Hyperlink`]
//! - capture of any other complete escape sequence as [`Token::UnknownControl`]
//!
//! A sequence that begins but does not complete within the current chunk is
//! buffered and resumed on the next `scan` call, so chunk boundaries are
//! invisible to the consumer. Malformed sequences are emitted as
//! `UnknownControl` rather than failing: the input is untrusted interpreter
//! output and scanning must always make forward progress.

use crate::link::LinkPayload;

/// Pending-sequence length cap. A sequence that grows past this without
/// terminating is flushed as [`Token::UnknownControl`] so hostile output
/// cannot grow the carry buffer without bound.
const MAX_PENDING: usize = 4096;

const ESC: char = '\u{1b}';
const BEL: char = '\u{07}';
const BS: char = '\u{08}';

/// Scanner output tokens, in exact encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of plain text between control actions.
    Text(String),
    /// Carriage return (`\r`): write position to column 0, content kept.
    CarriageReturn,
    /// One or more consecutive backspaces: write position left by count.
    Backspace(usize),
    /// Line feed (`\n`).
    Newline,
    /// SGR (`CSI ... m`): parsed numeric parameters, interpretation is the
    /// style resolver's job (they are stateful/delta-based).
    Sgr(Vec<u16>),
    /// OSC 8 hyperlink marker: `Some(payload)` opens a scope, `None` closes.
    Hyperlink(Option<LinkPayload>),
    /// A complete escape sequence this engine does not interpret, captured
    /// verbatim. The line buffer treats it as a no-op.
    UnknownControl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Esc,
    Csi,
    Osc,
    OscEsc,
}

/// Streaming scanner state.
#[derive(Debug, Clone)]
pub struct Scanner {
    state: State,
    /// Partial escape sequence carried across `scan` calls.
    pending: String,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a new scanner in ground state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            pending: String::new(),
        }
    }

    /// Whether a partial escape sequence is buffered awaiting more input.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Feed a chunk and return the tokens completed by it.
    ///
    /// Tokens are produced in exact encounter order. A trailing partial
    /// sequence is retained for the next call.
    #[must_use]
    pub fn scan(&mut self, chunk: &str) -> Vec<Token> {
        let mut out = Vec::new();
        let mut text = String::new();

        for c in chunk.chars() {
            match self.state {
                State::Ground => match c {
                    ESC => {
                        flush_text(&mut text, &mut out);
                        self.pending.clear();
                        self.pending.push(ESC);
                        self.state = State::Esc;
                    }
                    '\r' => {
                        flush_text(&mut text, &mut out);
                        out.push(Token::CarriageReturn);
                    }
                    '\n' => {
                        flush_text(&mut text, &mut out);
                        out.push(Token::Newline);
                    }
                    BS => {
                        flush_text(&mut text, &mut out);
                        match out.last_mut() {
                            Some(Token::Backspace(n)) => *n += 1,
                            _ => out.push(Token::Backspace(1)),
                        }
                    }
                    // Remaining C0 controls carry no display semantics here.
                    c if c.is_control() && c != '\t' => {}
                    c => text.push(c),
                },
                State::Esc => {
                    self.pending.push(c);
                    match c {
                        '[' => self.state = State::Csi,
                        ']' => self.state = State::Osc,
                        _ => {
                            self.state = State::Ground;
                            out.push(Token::UnknownControl(self.take_pending()));
                        }
                    }
                }
                State::Csi => {
                    self.pending.push(c);
                    // Final byte for CSI is in the 0x40..=0x7E range (ECMA-48).
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        self.state = State::Ground;
                        let seq = self.take_pending();
                        out.push(decode_csi(seq));
                    } else if self.pending.len() > MAX_PENDING {
                        self.state = State::Ground;
                        out.push(Token::UnknownControl(self.take_pending()));
                    }
                }
                State::Osc => match c {
                    BEL => {
                        self.state = State::Ground;
                        self.pending.push(c);
                        let seq = self.take_pending();
                        out.push(decode_osc(&seq));
                    }
                    ESC => {
                        // Possibly starting the ST terminator (ESC \).
                        self.pending.push(c);
                        self.state = State::OscEsc;
                    }
                    c => {
                        self.pending.push(c);
                        if self.pending.len() > MAX_PENDING {
                            self.state = State::Ground;
                            out.push(Token::UnknownControl(self.take_pending()));
                        }
                    }
                },
                State::OscEsc => {
                    self.pending.push(c);
                    if c == '\\' {
                        self.state = State::Ground;
                        let seq = self.take_pending();
                        out.push(decode_osc(&seq));
                    } else {
                        // False alarm; continue OSC.
                        self.state = State::Osc;
                    }
                }
            }
        }

        flush_text(&mut text, &mut out);
        out
    }

    fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }
}

fn flush_text(text: &mut String, out: &mut Vec<Token>) {
    if !text.is_empty() {
        out.push(Token::Text(std::mem::take(text)));
    }
}

/// Decode a complete CSI sequence (`ESC [ params final`).
///
/// Only SGR (`m`) is interpreted; everything else is captured verbatim.
fn decode_csi(seq: String) -> Token {
    let final_byte = seq.chars().next_back();
    if final_byte != Some('m') {
        return Token::UnknownControl(seq);
    }
    // Strip "ESC [" prefix and the final byte.
    let body = &seq[2..seq.len() - 1];
    match parse_csi_params(body) {
        Some(params) => Token::Sgr(params),
        None => Token::UnknownControl(seq),
    }
}

fn parse_csi_params(body: &str) -> Option<Vec<u16>> {
    if body.is_empty() {
        return Some(Vec::new());
    }
    let mut out = Vec::new();
    for part in body.split(';') {
        if part.is_empty() {
            out.push(0);
            continue;
        }
        let value = part.parse::<u32>().ok()?;
        out.push(value.min(u32::from(u16::MAX)) as u16);
    }
    Some(out)
}

/// Decode a complete OSC sequence. Only OSC 8 (hyperlink) is interpreted.
fn decode_osc(seq: &str) -> Token {
    // Strip "ESC ]" prefix and the terminator (BEL or ESC \).
    let body = seq
        .strip_prefix("\u{1b}]")
        .and_then(|s| {
            s.strip_suffix(BEL)
                .or_else(|| s.strip_suffix("\u{1b}\\"))
        });
    let Some(body) = body else {
        return Token::UnknownControl(seq.to_string());
    };

    let Some(rest) = body.strip_prefix("8;") else {
        return Token::UnknownControl(seq.to_string());
    };
    let Some((params, uri)) = rest.split_once(';') else {
        return Token::UnknownControl(seq.to_string());
    };

    if uri.is_empty() {
        Token::Hyperlink(None)
    } else {
        Token::Hyperlink(Some(LinkPayload {
            params: params.to_string(),
            uri: uri.to_string(),
        }))
    }
}
