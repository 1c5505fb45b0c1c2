//! Command popup positioning.
//!
//! A transient overlay (e.g. a previewed command) is anchored relative to the
//! console viewport by a small, self-contained geometry policy: prefer
//! below-and-right of the requested anchor point, flip above when the box
//! would cross the viewport bottom, and clamp horizontally to the viewport
//! edges. The popup itself is host chrome; this module only computes where it
//! goes and tracks the shown/hidden state machine.

/// A point in host pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: i32,
    pub height: i32,
}

impl PixelSize {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A rectangle in host pixel coordinates (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Clamp a desired popup position so its bounding box stays in the viewport.
///
/// Policy: keep the requested position when it already fits; flip above the
/// anchor point when the box would cross the bottom edge; clamp horizontally
/// to the right then left edge (left wins when the box is wider than the
/// viewport). The flipped position also clamps to the viewport top.
#[must_use]
pub fn clamp_position(desired: PixelPoint, size: PixelSize, viewport: PixelRect) -> PixelPoint {
    let mut x = desired.x;
    let mut y = desired.y;

    if y + size.height > viewport.bottom() {
        y = desired.y - size.height;
    }
    if y < viewport.y {
        y = viewport.y;
    }

    if x + size.width > viewport.right() {
        x = viewport.right() - size.width;
    }
    if x < viewport.x {
        x = viewport.x;
    }

    PixelPoint::new(x, y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopupState {
    Hidden,
    Shown,
}

/// The command popup: a two-state machine with clamped positioning.
///
/// Re-invoking [`CommandPopup::show_command`] while shown recomputes the
/// anchor without an intermediate hide; the close hook fires exactly once
/// per shown -> hidden transition.
pub struct CommandPopup {
    state: PopupState,
    viewport: PixelRect,
    command: String,
    position: PixelPoint,
    size: PixelSize,
    on_close: Option<Box<dyn FnMut()>>,
}

impl CommandPopup {
    /// Create a hidden popup bound to a viewport.
    #[must_use]
    pub fn new(viewport: PixelRect) -> Self {
        Self {
            state: PopupState::Hidden,
            viewport,
            command: String::new(),
            position: PixelPoint::default(),
            size: PixelSize::default(),
            on_close: None,
        }
    }

    /// Install the close-notification hook.
    pub fn on_close(&mut self, hook: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(hook));
    }

    /// Update the viewport (e.g. after a host resize). Does not reposition
    /// an already-shown popup; the host calls [`Self::set_position`] if it
    /// wants that.
    pub fn set_viewport(&mut self, viewport: PixelRect) {
        self.viewport = viewport;
    }

    /// Show the popup with `command` at the clamped `desired` position.
    ///
    /// Returns the final on-screen position.
    pub fn show_command(
        &mut self,
        command: &str,
        desired: PixelPoint,
        size: PixelSize,
    ) -> PixelPoint {
        self.command.clear();
        self.command.push_str(command);
        self.size = size;
        self.position = clamp_position(desired, size, self.viewport);
        self.state = PopupState::Shown;
        self.position
    }

    /// Re-clamp and apply an explicitly requested position.
    pub fn set_position(&mut self, x: i32, y: i32) -> PixelPoint {
        self.position = clamp_position(PixelPoint::new(x, y), self.size, self.viewport);
        self.position
    }

    /// Hide the popup, firing the close hook once.
    ///
    /// Closing while hidden is a no-op.
    pub fn close(&mut self) {
        if self.state == PopupState::Shown {
            self.state = PopupState::Hidden;
            if let Some(hook) = self.on_close.as_mut() {
                hook();
            }
        }
    }

    /// Whether the popup is currently shown.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.state == PopupState::Shown
    }

    /// The displayed command text.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The current on-screen position.
    #[must_use]
    pub fn position(&self) -> PixelPoint {
        self.position
    }
}
