//! System configuration (parsed from TOML) and responsive resolution

use crate::emitter::EmitterConfig;
use crate::motion::MovementConfig;
use crate::proximity::LinkConfig;
use crate::rand::ParticleRng;
use crate::rotation::RotationConfig;
use mote_core::{Color, MoteError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

/// Root of a particle configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Frames-per-second ceiling (0 = host cadence)
    #[serde(default)]
    pub fps_limit: u32,
    /// Fixed seed for particle randomness and noise
    #[serde(default)]
    pub seed: Option<u32>,
    /// Recycle retired particles through the pool
    #[serde(default = "default_true")]
    pub pool_reuse: bool,
    #[serde(default)]
    pub interactivity: InteractivityConfig,
    #[serde(default)]
    pub themes: Vec<ColorTheme>,
    /// Template for the implicit full-canvas emitter
    #[serde(default)]
    pub particles: Option<ParticleTemplate>,
    #[serde(default)]
    pub emitters: Vec<EmitterConfig>,
    #[serde(default)]
    pub responsive: Option<ResponsiveConfig>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            fps_limit: 0,
            seed: None,
            pool_reuse: true,
            interactivity: InteractivityConfig::default(),
            themes: Vec::new(),
            particles: None,
            emitters: Vec::new(),
            responsive: None,
        }
    }
}

impl SystemConfig {
    /// Parse a configuration document, applying the breakpoint that matches
    /// `viewport_width`, then validate it.
    pub fn from_toml_str(content: &str, viewport_width: f32) -> Result<Self> {
        let mut root: toml::Table = content.parse()?;
        resolve_responsive(&mut root, viewport_width);
        let config: SystemConfig = toml::Value::Table(root).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P, viewport_width: f32) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content, viewport_width)
    }

    pub fn selected_theme(&self) -> Option<&ColorTheme> {
        self.themes.iter().find(|t| t.selected)
    }

    /// Select the theme after the current one (wrapping). Returns its name.
    pub fn cycle_theme(&mut self) -> Option<&str> {
        if self.themes.is_empty() {
            return None;
        }
        let current = self.themes.iter().position(|t| t.selected);
        let next = current.map(|i| (i + 1) % self.themes.len()).unwrap_or(0);
        for theme in &mut self.themes {
            theme.selected = false;
        }
        self.themes[next].selected = true;
        Some(self.themes[next].name.as_str())
    }

    /// Theme particle colour, used when a template names none
    pub fn theme_particle_color(&self) -> Option<&ColorSpec> {
        self.selected_theme()
            .and_then(|t| t.particle_color.as_ref())
            .filter(|c| !c.is_empty())
    }

    /// Theme link colour, used when a links effect names none
    pub fn theme_link_color(&self) -> Option<&ColorSpec> {
        self.selected_theme()
            .and_then(|t| t.link_color.as_ref())
            .filter(|c| !c.is_empty())
    }

    /// Range and shape checks that do not depend on the canvas.
    ///
    /// Missing templates are deliberately not checked here: they surface
    /// when the owning emitter first spawns.
    pub fn validate(&self) -> Result<()> {
        if let Some(template) = &self.particles {
            template.validate("particles")?;
        }
        for (i, emitter) in self.emitters.iter().enumerate() {
            emitter.validate(i)?;
        }
        if let Some(repulse) = &self.interactivity.repulse {
            non_negative("interactivity.repulse.duration", repulse.duration)?;
        }
        if let Some(connect) = &self.interactivity.connect {
            non_negative("interactivity.connect.radius", connect.radius)?;
        }
        for theme in &self.themes {
            for spec in [&theme.particle_color, &theme.link_color].into_iter().flatten() {
                spec.parse_all()?;
            }
        }
        Ok(())
    }
}

pub(crate) fn non_negative(field: &str, value: f32) -> Result<()> {
    if value < 0.0 || !value.is_finite() {
        return Err(MoteError::ValueOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: f64::MAX,
            value: value as f64,
        });
    }
    Ok(())
}

/// A min/max pair sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut ParticleRng) -> f32 {
        rng.range(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub(crate) fn validate(&self, field: &str) -> Result<()> {
        if self.min > self.max || !self.min.is_finite() || !self.max.is_finite() {
            return Err(MoteError::InvalidConfig(format!(
                "{field}: min ({}) must not exceed max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Particle radius range plus stroke width for outlined kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
    #[serde(default = "default_one")]
    pub line_width: f32,
}

impl SizeRange {
    pub fn sample(&self, rng: &mut ParticleRng) -> f32 {
        rng.range(self.min, self.max).max(0.0)
    }
}

/// A single colour or a palette to sample from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    Palette(Vec<String>),
}

impl ColorSpec {
    /// An empty string or palette means "defer to the theme"
    pub fn is_empty(&self) -> bool {
        match self {
            ColorSpec::Single(s) => s.trim().is_empty(),
            ColorSpec::Palette(p) => p.is_empty(),
        }
    }

    pub fn parse_all(&self) -> Result<Vec<Color>> {
        match self {
            ColorSpec::Single(s) => Ok(vec![Color::parse(s)?]),
            ColorSpec::Palette(p) => p.iter().map(|s| Color::parse(s)).collect(),
        }
    }

    /// Choose one colour: the single value, or a random palette entry
    pub fn pick(&self, rng: &mut ParticleRng) -> Result<Color> {
        match self {
            ColorSpec::Single(s) => Color::parse(s),
            ColorSpec::Palette(p) if p.is_empty() => Ok(Color::WHITE),
            ColorSpec::Palette(p) => Color::parse(&p[rng.index(p.len())]),
        }
    }
}

/// How a particle is rasterized by the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParticleKind {
    Shape {
        #[serde(default)]
        shape: ShapeKind,
        #[serde(default)]
        vertices: Option<u32>,
    },
    Emoji {
        #[serde(default = "default_emoji")]
        emoji: String,
    },
    Image {
        src: String,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
    },
    /// Rotating soap-bubble style particle that can be popped
    Bubble {
        #[serde(default = "default_true")]
        can_pop: bool,
    },
}

fn default_emoji() -> String {
    "\u{1F600}".to_string()
}

impl Default for ParticleKind {
    fn default() -> Self {
        ParticleKind::Shape {
            shape: ShapeKind::Circle,
            vertices: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Circle,
    Triangle,
    Square,
    Polygon,
}

/// Per-particle visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectConfig {
    Links(LinkConfig),
    /// Effect kinds this engine does not animate (e.g. trails)
    #[serde(other)]
    Unsupported,
}

/// Everything an emitter stamps onto the particles it spawns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleTemplate {
    #[serde(default)]
    pub kind: ParticleKind,
    /// Population cap (and the full population of the default emitter)
    #[serde(default)]
    pub total_quantity: Option<usize>,
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default)]
    pub size: Option<SizeRange>,
    #[serde(default = "default_one")]
    pub opacity: f32,
    #[serde(default)]
    pub movement: Option<MovementConfig>,
    #[serde(default)]
    pub rotation: Option<RotationConfig>,
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        Self {
            kind: ParticleKind::default(),
            total_quantity: None,
            color: None,
            size: None,
            opacity: 1.0,
            movement: None,
            rotation: None,
            effects: Vec::new(),
        }
    }
}

impl ParticleTemplate {
    /// The first links effect, if any
    pub fn links(&self) -> Option<&LinkConfig> {
        self.effects.iter().find_map(|e| match e {
            EffectConfig::Links(links) => Some(links),
            EffectConfig::Unsupported => None,
        })
    }

    pub(crate) fn validate(&self, path: &str) -> Result<()> {
        if let Some(size) = &self.size {
            ValueRange::new(size.min, size.max).validate(&format!("{path}.size"))?;
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(MoteError::ValueOutOfRange {
                field: format!("{path}.opacity"),
                min: 0.0,
                max: 1.0,
                value: self.opacity as f64,
            });
        }
        if let Some(movement) = &self.movement {
            movement.validate(&format!("{path}.movement"))?;
        }
        if let Some(rotation) = &self.rotation {
            rotation.validate(&format!("{path}.rotation"))?;
        }
        if let ParticleKind::Shape {
            shape: ShapeKind::Polygon,
            vertices: Some(n),
        } = self.kind
        {
            if n < 3 {
                return Err(MoteError::InvalidConfig(format!(
                    "{path}.kind: a polygon needs at least 3 vertices, got {n}"
                )));
            }
        }
        if let Some(links) = self.links() {
            non_negative(&format!("{path}.links.distance"), links.distance)?;
        }
        Ok(())
    }
}

// ── Interactivity ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMode {
    Repulse,
    PopBubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverMode {
    Connect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub enabled: bool,
    pub mode: ClickMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverEvent {
    pub enabled: bool,
    pub mode: HoverMode,
}

/// Click-to-repel parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepulseConfig {
    pub distance: f32,
    /// Seconds before the original velocity is restored
    pub duration: f32,
    pub speed: f32,
}

/// Pointer offset applied to pointer-link endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerOffset {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectLinks {
    #[serde(default = "default_one")]
    pub opacity: f32,
    #[serde(default = "default_one")]
    pub width: f32,
    #[serde(default)]
    pub link_to_pointer: bool,
    #[serde(default)]
    pub offset: PointerOffset,
}

impl Default for ConnectLinks {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            width: 1.0,
            link_to_pointer: false,
            offset: PointerOffset::default(),
        }
    }
}

/// Hover-to-connect parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectConfig {
    pub radius: f32,
    #[serde(default)]
    pub links: ConnectLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractivityConfig {
    #[serde(default)]
    pub on_click: Option<ClickEvent>,
    #[serde(default)]
    pub on_hover: Option<HoverEvent>,
    #[serde(default)]
    pub repulse: Option<RepulseConfig>,
    #[serde(default)]
    pub connect: Option<ConnectConfig>,
}

impl InteractivityConfig {
    pub fn any_event_enabled(&self) -> bool {
        self.on_click.is_some_and(|e| e.enabled) || self.on_hover.is_some_and(|e| e.enabled)
    }

    /// The enabled click mode, if any
    pub fn click_mode(&self) -> Option<ClickMode> {
        self.on_click.filter(|e| e.enabled).map(|e| e.mode)
    }

    /// Connect parameters when hover-connect is enabled and configured
    pub fn hover_connect(&self) -> Option<&ConnectConfig> {
        match self.on_hover {
            Some(HoverEvent {
                enabled: true,
                mode: HoverMode::Connect,
            }) => self.connect.as_ref(),
            _ => None,
        }
    }
}

// ── Themes ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorTheme {
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub particle_color: Option<ColorSpec>,
    #[serde(default)]
    pub link_color: Option<ColorSpec>,
}

// ── Responsive breakpoints ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
}

/// Overrides applied when the viewport width is in `[min_width, max_width]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: f32,
    #[serde(default)]
    pub max_width: Option<f32>,
    #[serde(default)]
    pub config: toml::Table,
}

impl Breakpoint {
    pub fn matches(&self, width: f32) -> bool {
        width >= self.min_width && self.max_width.map_or(true, |max| width <= max)
    }
}

/// Merge the first breakpoint matching `viewport_width` into `root`.
/// Returns the index of the applied breakpoint.
pub fn resolve_responsive(root: &mut toml::Table, viewport_width: f32) -> Option<usize> {
    let responsive: ResponsiveConfig = root.get("responsive")?.clone().try_into().ok()?;
    if !responsive.enabled {
        return None;
    }
    let (index, breakpoint) = responsive
        .breakpoints
        .into_iter()
        .enumerate()
        .find(|(_, b)| b.matches(viewport_width))?;
    log::debug!(
        "applying responsive breakpoint {} (min_width {})",
        index,
        breakpoint.min_width
    );
    deep_merge(root, breakpoint.config);
    Some(index)
}

/// Recursively merge `source` into `target`. Tables merge key by key;
/// a non-empty array replaces the target array wholesale, an empty one
/// leaves it alone; any other value overwrites.
pub fn deep_merge(target: &mut toml::Table, source: toml::Table) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                deep_merge(existing, incoming);
            }
            (Some(toml::Value::Array(_)), toml::Value::Array(incoming)) if incoming.is_empty() => {}
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MoveDirection;

    const BASIC: &str = r##"
fps_limit = 60
seed = 7

[particles]
total_quantity = 50
color = ["#ff0000", "#00ff00"]
size = { min = 1.0, max = 2.0 }

[particles.movement]
direction = "random"
speed = { min = 0.1, max = 0.3 }
default_boundary_behavior = "bounce"

[[particles.effects]]
type = "links"
distance = 100.0
width = 1.0

[[particles.effects]]
type = "trails"
"##;

    #[test]
    fn parse_basic_config() {
        let config = SystemConfig::from_toml_str(BASIC, 1024.0).unwrap();
        assert_eq!(config.fps_limit, 60);
        assert_eq!(config.seed, Some(7));
        assert!(config.pool_reuse);

        let template = config.particles.as_ref().unwrap();
        assert_eq!(template.total_quantity, Some(50));
        assert_eq!(template.opacity, 1.0);
        assert_eq!(template.kind, ParticleKind::default());
        let movement = template.movement.as_ref().unwrap();
        assert_eq!(movement.direction, MoveDirection::Random);
        assert_eq!(template.effects.len(), 2);
        assert_eq!(template.effects[1], EffectConfig::Unsupported);
        let links = template.links().unwrap();
        assert!((links.distance - 100.0).abs() < 1e-6);
        assert_eq!(links.opacity, 1.0);
        assert!(!links.solid);
    }

    #[test]
    fn responsive_breakpoint_overrides() {
        let doc = r##"
[particles]
total_quantity = 300
color = ["#fff", "#000"]

[responsive]
enabled = true

[[responsive.breakpoints]]
min_width = 0
max_width = 767

[responsive.breakpoints.config.particles]
total_quantity = 80
color = ["#f00"]

[[responsive.breakpoints]]
min_width = 768

[responsive.breakpoints.config.particles]
color = []
"##;
        let small = SystemConfig::from_toml_str(doc, 500.0).unwrap();
        let template = small.particles.unwrap();
        assert_eq!(template.total_quantity, Some(80));
        assert_eq!(template.color, Some(ColorSpec::Palette(vec!["#f00".into()])));

        // An empty override array keeps the base array
        let large = SystemConfig::from_toml_str(doc, 1200.0).unwrap();
        let template = large.particles.unwrap();
        assert_eq!(template.total_quantity, Some(300));
        assert_eq!(
            template.color,
            Some(ColorSpec::Palette(vec!["#fff".into(), "#000".into()]))
        );
    }

    #[test]
    fn disabled_responsive_is_ignored() {
        let mut root: toml::Table = r#"
a = 1
[responsive]
enabled = false
[[responsive.breakpoints]]
min_width = 0
config = { a = 2 }
"#
        .parse()
        .unwrap();
        assert_eq!(resolve_responsive(&mut root, 100.0), None);
        assert_eq!(root["a"].as_integer(), Some(1));
    }

    #[test]
    fn deep_merge_tables_and_scalars() {
        let mut target: toml::Table = "x = 1\n[t]\na = 1\nb = [1, 2]\n".parse().unwrap();
        let source: toml::Table = "y = 2\n[t]\na = 5\nb = [9]\n".parse().unwrap();
        deep_merge(&mut target, source);
        assert_eq!(target["x"].as_integer(), Some(1));
        assert_eq!(target["y"].as_integer(), Some(2));
        assert_eq!(target["t"]["a"].as_integer(), Some(5));
        assert_eq!(target["t"]["b"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn validation_rejects_inverted_ranges() {
        let doc = r#"
[particles]
size = { min = 3.0, max = 1.0 }
"#;
        let err = SystemConfig::from_toml_str(doc, 800.0).unwrap_err();
        assert!(matches!(err, MoteError::InvalidConfig(_)));
    }

    #[test]
    fn validation_rejects_bad_theme_color() {
        let doc = r#"
[[themes]]
name = "dark"
selected = true
particle_color = "definitely-not-a-color"
"#;
        let err = SystemConfig::from_toml_str(doc, 800.0).unwrap_err();
        assert!(matches!(err, MoteError::InvalidColor(_)));
    }

    #[test]
    fn theme_cycling() {
        let doc = r##"
[[themes]]
name = "dark"
selected = true
particle_color = "#fff"
link_color = "#fff"

[[themes]]
name = "light"
particle_color = "#000"
"##;
        let mut config = SystemConfig::from_toml_str(doc, 800.0).unwrap();
        assert_eq!(config.selected_theme().unwrap().name, "dark");
        assert!(config.theme_link_color().is_some());
        assert_eq!(config.cycle_theme(), Some("light"));
        assert_eq!(config.selected_theme().unwrap().name, "light");
        assert!(config.theme_link_color().is_none());
        assert_eq!(config.cycle_theme(), Some("dark"));
    }

    #[test]
    fn color_spec_pick_and_empty() {
        let mut rng = ParticleRng::new(3);
        let palette = ColorSpec::Palette(vec!["#ff0000".into(), "#0000ff".into()]);
        for _ in 0..20 {
            let c = palette.pick(&mut rng).unwrap();
            assert!(c == Color::from_hex(0xFF0000) || c == Color::from_hex(0x0000FF));
        }
        assert!(ColorSpec::Single(String::new()).is_empty());
        assert!(ColorSpec::Single("bogus".into()).pick(&mut rng).is_err());
    }

    #[test]
    fn interactivity_helpers() {
        let doc = r#"
[interactivity]
on_click = { enabled = true, mode = "repulse" }
on_hover = { enabled = true, mode = "connect" }
repulse = { distance = 75.0, duration = 0.4, speed = 4.0 }
connect = { radius = 75.0, links = { width = 1.0, link_to_pointer = true } }
"#;
        let config = SystemConfig::from_toml_str(doc, 800.0).unwrap();
        let i = &config.interactivity;
        assert!(i.any_event_enabled());
        assert_eq!(i.click_mode(), Some(ClickMode::Repulse));
        let connect = i.hover_connect().unwrap();
        assert!(connect.links.link_to_pointer);
        assert_eq!(connect.links.opacity, 1.0);
    }
}
