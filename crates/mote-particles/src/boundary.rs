//! Edge classification and boundary policy

use mote_core::{parse_size, Canvas, Vec2};
use serde::{Deserialize, Serialize};

/// Seconds a pass-through particle survives after crossing an edge
pub const PASS_THROUGH_GRACE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryBehavior {
    Bounce,
    Destroy,
    #[default]
    PassThroughDestroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySide {
    Top,
    Bottom,
    Left,
    Right,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRule {
    pub side: BoundarySide,
    pub behavior: BoundaryBehavior,
}

/// Inset region, e.g. `{ width = "50%", height = "120px" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySize {
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    #[serde(default)]
    pub size: Option<BoundarySize>,
    #[serde(default)]
    pub rules: Vec<BoundaryRule>,
}

impl BoundaryConfig {
    /// First rule naming `side` (or `all`)
    pub fn rule_for(&self, side: BoundarySide) -> Option<BoundaryBehavior> {
        self.rules
            .iter()
            .find(|r| r.side == side || r.side == BoundarySide::All)
            .map(|r| r.behavior)
    }
}

/// What happens to the particle after the boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoundaryFate {
    Keep,
    DestroyLater,
    DestroyNow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOutcome {
    pub flip_x: bool,
    pub flip_y: bool,
    pub fate: BoundaryFate,
}

impl BoundaryOutcome {
    pub const NONE: Self = Self {
        flip_x: false,
        flip_y: false,
        fate: BoundaryFate::Keep,
    };

    /// Apply the velocity flips
    pub fn apply(&self, velocity: &mut Vec2) {
        if self.flip_x {
            velocity.x = -velocity.x;
        }
        if self.flip_y {
            velocity.y = -velocity.y;
        }
    }
}

/// Edges of the canvas after the optional inset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(canvas: Canvas, size: Option<&BoundarySize>) -> Self {
        let mut bounds = Self {
            left: 0.0,
            right: canvas.width,
            top: 0.0,
            bottom: canvas.height,
        };
        if let Some(size) = size {
            let inset_x = parse_size(&size.width, canvas.width) / 2.0;
            let inset_y = parse_size(&size.height, canvas.height) / 2.0;
            bounds.left += inset_x;
            bounds.right -= inset_x;
            bounds.top += inset_y;
            bounds.bottom -= inset_y;
        }
        bounds
    }

    /// Edges `point` lies beyond, in left/right/top/bottom order
    pub fn crossed(&self, point: Vec2) -> Vec<BoundarySide> {
        let mut edges = Vec::with_capacity(2);
        if point.x < self.left {
            edges.push(BoundarySide::Left);
        }
        if point.x > self.right {
            edges.push(BoundarySide::Right);
        }
        if point.y < self.top {
            edges.push(BoundarySide::Top);
        }
        if point.y > self.bottom {
            edges.push(BoundarySide::Bottom);
        }
        edges
    }
}

/// Classify `position` and decide the response. Pure: the caller applies
/// the flips and schedules or performs the destroy.
pub fn resolve(
    position: Vec2,
    velocity: Vec2,
    canvas: Canvas,
    config: Option<&BoundaryConfig>,
    default_behavior: Option<BoundaryBehavior>,
) -> BoundaryOutcome {
    let bounds = Bounds::new(canvas, config.and_then(|c| c.size.as_ref()));
    let mut outcome = BoundaryOutcome::NONE;

    for edge in bounds.crossed(position) {
        let behavior = config
            .and_then(|c| c.rule_for(edge))
            .or(default_behavior)
            .unwrap_or_default();
        match behavior {
            BoundaryBehavior::Bounce => match edge {
                BoundarySide::Left => outcome.flip_x |= velocity.x < 0.0,
                BoundarySide::Right => outcome.flip_x |= velocity.x > 0.0,
                BoundarySide::Top => outcome.flip_y |= velocity.y < 0.0,
                BoundarySide::Bottom => outcome.flip_y |= velocity.y > 0.0,
                BoundarySide::All => {}
            },
            BoundaryBehavior::Destroy => outcome.fate = outcome.fate.max(BoundaryFate::DestroyNow),
            BoundaryBehavior::PassThroughDestroy => {
                outcome.fate = outcome.fate.max(BoundaryFate::DestroyLater)
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas::new(800.0, 600.0);

    #[test]
    fn inside_is_untouched() {
        let out = resolve(
            Vec2::new(400.0, 300.0),
            Vec2::new(-1.0, 1.0),
            CANVAS,
            None,
            Some(BoundaryBehavior::Destroy),
        );
        assert_eq!(out, BoundaryOutcome::NONE);
    }

    #[test]
    fn bounce_flips_outward_component() {
        let out = resolve(
            Vec2::new(-1.0, 300.0),
            Vec2::new(-2.0, 1.0),
            CANVAS,
            None,
            Some(BoundaryBehavior::Bounce),
        );
        assert!(out.flip_x);
        assert!(!out.flip_y);
        assert_eq!(out.fate, BoundaryFate::Keep);

        let mut v = Vec2::new(-2.0, 1.0);
        out.apply(&mut v);
        assert_eq!(v, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn bounce_keeps_inward_velocity() {
        // Already heading back in: no flip, so it cannot get stuck outside
        let out = resolve(
            Vec2::new(-1.0, 300.0),
            Vec2::new(2.0, 0.0),
            CANVAS,
            None,
            Some(BoundaryBehavior::Bounce),
        );
        assert!(!out.flip_x);
    }

    #[test]
    fn corner_crossing_flips_both() {
        let out = resolve(
            Vec2::new(801.0, 601.0),
            Vec2::new(1.0, 1.0),
            CANVAS,
            None,
            Some(BoundaryBehavior::Bounce),
        );
        assert!(out.flip_x && out.flip_y);
    }

    #[test]
    fn missing_default_means_pass_through() {
        let out = resolve(Vec2::new(-5.0, 10.0), Vec2::ZERO, CANVAS, None, None);
        assert_eq!(out.fate, BoundaryFate::DestroyLater);
    }

    #[test]
    fn side_rule_beats_default() {
        let config = BoundaryConfig {
            size: None,
            rules: vec![BoundaryRule {
                side: BoundarySide::Bottom,
                behavior: BoundaryBehavior::Destroy,
            }],
        };
        let bottom = resolve(
            Vec2::new(10.0, 700.0),
            Vec2::new(0.0, 1.0),
            CANVAS,
            Some(&config),
            Some(BoundaryBehavior::Bounce),
        );
        assert_eq!(bottom.fate, BoundaryFate::DestroyNow);

        let top = resolve(
            Vec2::new(10.0, -1.0),
            Vec2::new(0.0, -1.0),
            CANVAS,
            Some(&config),
            Some(BoundaryBehavior::Bounce),
        );
        assert!(top.flip_y);
        assert_eq!(top.fate, BoundaryFate::Keep);
    }

    #[test]
    fn inset_region_moves_edges() {
        let size = BoundarySize {
            width: "50%".into(),
            height: "100px".into(),
        };
        let bounds = Bounds::new(CANVAS, Some(&size));
        assert_eq!(bounds.left, 200.0);
        assert_eq!(bounds.right, 600.0);
        assert_eq!(bounds.top, 50.0);
        assert_eq!(bounds.bottom, 550.0);
        assert_eq!(bounds.crossed(Vec2::new(100.0, 300.0)), vec![BoundarySide::Left]);
    }
}
