//! Pointer state management

use mote_core::{Canvas, Vec2};

/// Last known pointer (mouse or touch) state in device pixels.
///
/// Raw events are captured by the host; it only feeds normalized
/// coordinates in here. The simulation reads this once per tick.
#[derive(Clone, Copy, Debug)]
pub struct PointerState {
    /// Pointer position in device pixels
    pub position: Vec2,
    /// Whether the pointer currently overlaps the surface
    pub over_surface: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            // Far off-surface until the host reports a position
            position: Vec2::new(-10_000.0, -10_000.0),
            over_surface: false,
        }
    }

    /// Process a pointer move. Positions outside the canvas keep the last
    /// inside position and mark the pointer as off-surface.
    pub fn process_move(&mut self, x: f32, y: f32, canvas: Canvas) {
        let point = Vec2::new(x, y);
        if canvas.contains(point) {
            self.position = point;
            self.over_surface = true;
        } else {
            self.over_surface = false;
        }
    }

    /// Process an explicit enter/leave notification
    pub fn process_over(&mut self, over: bool) {
        self.over_surface = over;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_inside_and_outside() {
        let canvas = Canvas::new(100.0, 100.0);
        let mut pointer = PointerState::new();
        assert!(!pointer.over_surface);

        pointer.process_move(10.0, 20.0, canvas);
        assert!(pointer.over_surface);
        assert_eq!(pointer.position, Vec2::new(10.0, 20.0));

        pointer.process_move(150.0, 20.0, canvas);
        assert!(!pointer.over_surface);
        assert_eq!(pointer.position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn leave_keeps_last_position() {
        let canvas = Canvas::new(100.0, 100.0);
        let mut pointer = PointerState::new();
        pointer.process_move(40.0, 60.0, canvas);
        pointer.process_over(false);
        assert!(!pointer.over_surface);
        assert_eq!(pointer.position, Vec2::new(40.0, 60.0));
    }
}
