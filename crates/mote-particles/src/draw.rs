//! Turning particles, links and bursts into surface calls

use crate::config::{ParticleKind, ShapeKind};
use crate::interaction::PopBurst;
use crate::particle::Particle;
use crate::proximity::Link;
use mote_core::{Color, Vec2};
use mote_runtime::DrawSurface;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Segments used to approximate a full bubble outline
const BUBBLE_SEGMENTS: usize = 24;
/// Inset of the bubble's highlight arc, in px
const BUBBLE_HIGHLIGHT_INSET: f32 = 8.0;

pub fn draw_particle(surface: &mut dyn DrawSurface, particle: &Particle, kind: &ParticleKind) {
    let center = particle.position;
    let size = particle.size;
    match kind {
        ParticleKind::Shape { shape, vertices } => match shape {
            ShapeKind::Circle => surface.fill_circle(center, size, particle.color),
            ShapeKind::Triangle => {
                surface.fill_polygon(&polygon_points(center, size, 3), particle.color)
            }
            ShapeKind::Square => {
                surface.fill_polygon(&polygon_points(center, size, 4), particle.color)
            }
            ShapeKind::Polygon => {
                let n = vertices.unwrap_or(5).max(3) as usize;
                surface.fill_polygon(&polygon_points(center, size, n), particle.color)
            }
        },
        ParticleKind::Emoji { emoji } => surface.draw_image(
            emoji,
            center,
            size * 2.0,
            size * 2.0,
            particle.rotation.angle,
            particle.opacity(),
        ),
        ParticleKind::Image { src, width, height } => surface.draw_image(
            src,
            center,
            width.unwrap_or(size * 2.0),
            height.unwrap_or(size * 2.0),
            particle.rotation.angle,
            particle.opacity(),
        ),
        ParticleKind::Bubble { .. } => draw_bubble(surface, particle),
    }
}

/// Regular polygon with one vertex on the +x axis
pub fn polygon_points(center: Vec2, radius: f32, vertices: usize) -> Vec<Vec2> {
    let step = TAU / vertices as f32;
    (0..vertices)
        .map(|i| center + Vec2::from_angle(step * i as f32) * radius)
        .collect()
}

/// Outline plus a quarter-circle highlight, rotated with the particle
fn draw_bubble(surface: &mut dyn DrawSurface, particle: &Particle) {
    let rotation = particle.rotation.angle.to_radians();
    let center = particle.position;
    let color = particle.color;
    let width = particle.line_width;

    let highlight = (particle.size - BUBBLE_HIGHLIGHT_INSET).max(0.0);
    if highlight > 0.0 {
        stroke_arc(surface, center, highlight, rotation - FRAC_PI_2, rotation, 6, color, width);
    }
    stroke_arc(surface, center, particle.size, rotation, rotation + TAU, BUBBLE_SEGMENTS, color, width);
}

#[allow(clippy::too_many_arguments)]
fn stroke_arc(
    surface: &mut dyn DrawSurface,
    center: Vec2,
    radius: f32,
    start: f32,
    end: f32,
    segments: usize,
    color: Color,
    width: f32,
) {
    let step = (end - start) / segments as f32;
    let mut prev = center + Vec2::from_angle(start) * radius;
    for i in 1..=segments {
        let next = center + Vec2::from_angle(start + step * i as f32) * radius;
        surface.stroke_line(prev, next, color, width);
        prev = next;
    }
}

pub fn draw_links(surface: &mut dyn DrawSurface, links: &[Link]) {
    for link in links {
        surface.stroke_line(link.from, link.to, link.color, link.width);
    }
}

pub fn draw_burst(surface: &mut dyn DrawSurface, burst: &PopBurst, now: f64) {
    draw_links(surface, &burst.spokes(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mote_runtime::{DrawCommand, RecordingSurface};

    fn particle() -> Particle {
        let mut p = Particle::neutral();
        p.position = Vec2::new(50.0, 50.0);
        p.size = 10.0;
        p.color = Color::from_hex(0xFF0000);
        p
    }

    #[test]
    fn circle_is_filled() {
        let mut surface = RecordingSurface::new();
        draw_particle(&mut surface, &particle(), &ParticleKind::default());
        assert_eq!(
            surface.commands,
            vec![DrawCommand::Circle {
                center: Vec2::new(50.0, 50.0),
                radius: 10.0,
                color: Color::from_hex(0xFF0000),
            }]
        );
    }

    #[test]
    fn polygon_vertex_counts() {
        let mut surface = RecordingSurface::new();
        for (shape, vertices, expected) in [
            (ShapeKind::Triangle, None, 3),
            (ShapeKind::Square, None, 4),
            (ShapeKind::Polygon, Some(7), 7),
        ] {
            surface.clear();
            draw_particle(&mut surface, &particle(), &ParticleKind::Shape { shape, vertices });
            match &surface.commands[0] {
                DrawCommand::Polygon { points, .. } => assert_eq!(points.len(), expected),
                other => panic!("expected polygon, got {other:?}"),
            }
        }
    }

    #[test]
    fn images_default_to_diameter() {
        let mut surface = RecordingSurface::new();
        let kind = ParticleKind::Image {
            src: "leaf.png".into(),
            width: None,
            height: Some(4.0),
        };
        draw_particle(&mut surface, &particle(), &kind);
        match &surface.commands[0] {
            DrawCommand::Image {
                source,
                width,
                height,
                ..
            } => {
                assert_eq!(source, "leaf.png");
                assert_eq!(*width, 20.0);
                assert_eq!(*height, 4.0);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn bubble_is_stroked() {
        let mut surface = RecordingSurface::new();
        let mut p = particle();
        p.size = 20.0;
        draw_particle(&mut surface, &p, &ParticleKind::Bubble { can_pop: true });
        assert_eq!(surface.lines().count(), BUBBLE_SEGMENTS + 6);
    }

    #[test]
    fn polygon_points_on_radius() {
        for point in polygon_points(Vec2::ZERO, 5.0, 6) {
            assert!((point.length() - 5.0).abs() < 1e-4);
        }
    }
}
