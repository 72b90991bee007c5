//! Drawing surface contract

use mote_core::{Color, Vec2};
use serde::Serialize;

/// The drawing collaborator. All coordinates are device pixels.
///
/// Rasterization lives outside the engine; a host wraps its canvas (or GPU
/// batcher) in this trait.
pub trait DrawSurface {
    fn clear_rect(&mut self, origin: Vec2, width: f32, height: f32);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Draw a named image (or pre-rendered emoji) centered on `center`,
    /// rotated by `rotation` degrees.
    fn draw_image(
        &mut self,
        source: &str,
        center: Vec2,
        width: f32,
        height: f32,
        rotation: f32,
        opacity: f32,
    );

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
}

/// One recorded drawing call
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        origin: Vec2,
        width: f32,
        height: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    Image {
        source: String,
        center: Vec2,
        width: f32,
        height: f32,
        rotation: f32,
        opacity: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
}

/// A surface that records every call, for headless runs and tests
#[derive(Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear call
    pub fn current_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.current_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn clear_rect(&mut self, origin: Vec2, width: f32, height: f32) {
        self.commands.push(DrawCommand::Clear {
            origin,
            width,
            height,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn draw_image(
        &mut self,
        source: &str,
        center: Vec2,
        width: f32,
        height: f32,
        rotation: f32,
        opacity: f32,
    ) {
        self.commands.push(DrawCommand::Image {
            source: source.to_string(),
            center,
            width,
            height,
            rotation,
            opacity,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }
}
