//! Style tokens and SGR resolution.
//!
//! A [`Style`] is the normalized attribute token attached to every text run:
//! SGR flags, foreground/background colors, and an ordered list of
//! caller-supplied class names (e.g. `"error"` for stderr chunks). Resolution
//! from SGR parameters is pure — the same `(style, params)` pair always yields
//! the same result, which is what makes run merging deterministic.

use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
    /// SGR text attribute flags.
    ///
    /// Maps directly to the ECMA-48 SGR parameter values handled here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const INVERSE       = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
    }
}

/// Color representation for styled runs.
///
/// Supports the standard terminal color model hierarchy:
/// default → 16 named → 256 indexed → 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Inherit from the surrounding display (SGR 39 / SGR 49).
    #[default]
    Default,
    /// Named color index (0-15): standard 8 + bright 8.
    Named(u8),
    /// 256-color palette index (0-255).
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

/// A normalized style token.
///
/// Two tokens are equal iff all fields match; adjacent runs with equal tokens
/// merge in the line buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub flags: StyleFlags,
    pub fg: Color,
    pub bg: Color,
    /// Caller-supplied class names, in the order they were added.
    pub classes: SmallVec<[String; 2]>,
}

impl Style {
    /// The default token: no attributes, inherited colors, no classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A default token carrying a single class name.
    #[must_use]
    pub fn with_class(class: &str) -> Self {
        let mut style = Self::default();
        style.push_class(class);
        style
    }

    /// Add a class name if not already present.
    pub fn push_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    /// Whether this token has no attributes, colors, or classes.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Apply SGR parameters to this token, returning the resulting token.
    ///
    /// Parameter `0` (or an empty parameter list) resets to the default
    /// token. Unrecognized parameters are ignored without error. Class names
    /// are untouched by SGR transitions: they belong to the caller, not the
    /// escape stream (composition with the caller's default classes happens
    /// in [`Style::composed_with`]).
    #[must_use]
    pub fn apply_sgr(&self, params: &[u16]) -> Style {
        let mut out = self.clone();
        if params.is_empty() {
            out.reset_attrs();
            return out;
        }

        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => out.reset_attrs(),
                1 => out.flags.insert(StyleFlags::BOLD),
                2 => out.flags.insert(StyleFlags::DIM),
                3 => out.flags.insert(StyleFlags::ITALIC),
                4 => out.flags.insert(StyleFlags::UNDERLINE),
                7 => out.flags.insert(StyleFlags::INVERSE),
                9 => out.flags.insert(StyleFlags::STRIKETHROUGH),
                22 => out.flags.remove(StyleFlags::BOLD | StyleFlags::DIM),
                23 => out.flags.remove(StyleFlags::ITALIC),
                24 => out.flags.remove(StyleFlags::UNDERLINE),
                27 => out.flags.remove(StyleFlags::INVERSE),
                29 => out.flags.remove(StyleFlags::STRIKETHROUGH),
                30..=37 => out.fg = Color::Named((params[i] - 30) as u8),
                38 => {
                    if let Some((color, consumed)) = Self::extended_color(&params[i + 1..]) {
                        out.fg = color;
                        i += consumed;
                    }
                }
                39 => out.fg = Color::Default,
                40..=47 => out.bg = Color::Named((params[i] - 40) as u8),
                48 => {
                    if let Some((color, consumed)) = Self::extended_color(&params[i + 1..]) {
                        out.bg = color;
                        i += consumed;
                    }
                }
                49 => out.bg = Color::Default,
                90..=97 => out.fg = Color::Named((params[i] - 90 + 8) as u8),
                100..=107 => out.bg = Color::Named((params[i] - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
        out
    }

    /// Compose this token with a base token.
    ///
    /// The base supplies class names and fallback colors; `self` supplies the
    /// SGR-derived state. Used to tag runs lacking explicit SGR colors with
    /// the caller's default class/colors without letting SGR resets erase the
    /// caller's intent.
    #[must_use]
    pub fn composed_with(&self, base: &Style) -> Style {
        let mut out = self.clone();
        if out.fg == Color::Default {
            out.fg = base.fg;
        }
        if out.bg == Color::Default {
            out.bg = base.bg;
        }
        out.flags |= base.flags;
        for class in &base.classes {
            if !out.classes.iter().any(|c| c == class) {
                out.classes.push(class.clone());
            }
        }
        out
    }

    /// Decode an extended color continuation (`5;n` or `2;r;g;b`).
    ///
    /// Returns the color and the number of parameters consumed after the
    /// introducing 38/48, or `None` when the continuation is malformed.
    fn extended_color(rest: &[u16]) -> Option<(Color, usize)> {
        match rest.first()? {
            5 => {
                let n = *rest.get(1)?;
                Some((Color::Indexed(n.min(255) as u8), 2))
            }
            2 => {
                let r = *rest.get(1)?;
                let g = *rest.get(2)?;
                let b = *rest.get(3)?;
                Some((
                    Color::Rgb(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8),
                    4,
                ))
            }
            _ => None,
        }
    }

    fn reset_attrs(&mut self) {
        self.flags = StyleFlags::empty();
        self.fg = Color::Default;
        self.bg = Color::Default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_plain() {
        assert!(Style::default().is_plain());
    }

    #[test]
    fn empty_params_reset_to_default() {
        let style = Style::default().apply_sgr(&[1, 31]);
        assert!(!style.is_plain());
        assert!(style.apply_sgr(&[]).is_plain());
        assert!(style.apply_sgr(&[0]).is_plain());
    }

    #[test]
    fn bold_and_underline_toggle() {
        let style = Style::default().apply_sgr(&[1, 4]);
        assert!(style.flags.contains(StyleFlags::BOLD | StyleFlags::UNDERLINE));

        let style = style.apply_sgr(&[22, 24]);
        assert_eq!(style.flags, StyleFlags::empty());
    }

    #[test]
    fn palette_colors() {
        let style = Style::default().apply_sgr(&[31, 42]);
        assert_eq!(style.fg, Color::Named(1));
        assert_eq!(style.bg, Color::Named(2));

        let style = style.apply_sgr(&[91, 102]);
        assert_eq!(style.fg, Color::Named(9));
        assert_eq!(style.bg, Color::Named(10));

        let style = style.apply_sgr(&[39, 49]);
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
    }

    #[test]
    fn indexed_and_truecolor() {
        let style = Style::default().apply_sgr(&[38, 5, 208]);
        assert_eq!(style.fg, Color::Indexed(208));

        let style = style.apply_sgr(&[48, 2, 10, 20, 30]);
        assert_eq!(style.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn malformed_extended_color_is_ignored() {
        // 38 with no continuation, then a valid bold.
        let style = Style::default().apply_sgr(&[38]);
        assert_eq!(style.fg, Color::Default);

        let style = Style::default().apply_sgr(&[38, 9, 1]);
        assert_eq!(style.fg, Color::Default);
    }

    #[test]
    fn unrecognized_params_are_ignored() {
        let style = Style::default().apply_sgr(&[1, 55, 31, 999]);
        assert!(style.flags.contains(StyleFlags::BOLD));
        assert_eq!(style.fg, Color::Named(1));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = Style::default().apply_sgr(&[1, 38, 5, 100]);
        let b = Style::default().apply_sgr(&[1, 38, 5, 100]);
        assert_eq!(a, b);
    }

    #[test]
    fn classes_survive_sgr_reset() {
        let base = Style::with_class("error");
        let active = Style::default().apply_sgr(&[31]).apply_sgr(&[0]);
        let effective = active.composed_with(&base);
        assert_eq!(effective.classes.as_slice(), ["error".to_string()]);
        assert_eq!(effective.fg, Color::Default);
    }

    #[test]
    fn composition_keeps_sgr_colors_over_base() {
        let base = Style::with_class("error");
        let active = Style::default().apply_sgr(&[31]);
        let effective = active.composed_with(&base);
        assert_eq!(effective.fg, Color::Named(1));
        assert_eq!(effective.classes.as_slice(), ["error".to_string()]);
    }

    #[test]
    fn push_class_deduplicates() {
        let mut style = Style::with_class("error");
        style.push_class("error");
        assert_eq!(style.classes.len(), 1);
    }
}
