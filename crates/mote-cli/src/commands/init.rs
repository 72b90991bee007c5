//! Starter configuration command

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const STARTER_CONFIG: &str = r##"# Mote particle configuration
fps_limit = 60

# Implicit full-canvas emitter
[particles]
total_quantity = 50
color = ["#ffffff", "#9ad1ff"]
size = { min = 1.0, max = 3.0 }
opacity = 0.8

[particles.movement]
direction = "random"
speed = { min = 0.1, max = 0.3 }
default_boundary_behavior = "bounce"

[[particles.effects]]
type = "links"
distance = 100.0
opacity = 0.4

[interactivity]
on_click = { enabled = true, mode = "repulse" }
on_hover = { enabled = true, mode = "connect" }
repulse = { distance = 100.0, duration = 0.4, speed = 3.0 }
connect = { radius = 120.0, links = { opacity = 0.5, link_to_pointer = true } }

[[themes]]
name = "night"
selected = true
background = "#0b1021"
link_color = "#9ad1ff"

[[themes]]
name = "day"
background = "#f4f4f4"
particle_color = "#333333"
link_color = "#333333"

# Bubbles rising from the bottom edge, replaying every 8 seconds
[[emitters]]
position = "bottom_center"
region = { width = 20.0, height = 5.0 }
rate = { delay = 0.25, quantity = 2 }
life = { duration = 4.0, fade = 1.0 }
animation = { length = 8.0, replay = true }

[emitters.particles]
total_quantity = 40
kind = { type = "bubble" }
color = "#7fd8ff"
size = { min = 6.0, max = 14.0 }
movement = { direction = "up", speed = { min = 0.5, max = 1.5 } }

[responsive]
enabled = true

[[responsive.breakpoints]]
min_width = 0.0
max_width = 600.0
config = { particles = { total_quantity = 20 } }
"##;

pub fn run(path: &str, force: bool) -> Result<()> {
    let target = Path::new(path);

    if target.exists() && !force {
        anyhow::bail!("'{}' already exists (use --force to overwrite)", path);
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(target, STARTER_CONFIG).with_context(|| format!("Failed to write '{}'", path))?;

    println!("Created particle configuration: {}", path);
    println!();
    println!("Next steps:");
    println!("  mote validate {}", path);
    println!("  mote run {} --frames 600", path);

    Ok(())
}
