//! The particle field simulation: impulse repulsion away from the pointer
//! composed with a spring return toward each particle's anchor.
//!
//! The two forces are deliberately decoupled: repulsion never looks at the
//! anchor, and the return never looks at the pointer, so their composition
//! is purely additive within a frame. This shape of the update is what
//! gives the field its feel and must not be merged into a single solver.

use std::time::Instant;

use crate::color::Color;
use crate::config::{BandConfig, PhysicsConfig, SphereConfig};
use crate::lattice::{generate_band, generate_sphere, Exclusion, Particle};
use crate::pointer::{PointerSample, PointerTracker};
use crate::shape::Shape;
use crate::stroke::Stroke;

/// Which zone shape this field instance lays its lattice out in.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldLayout {
    Band(BandConfig),
    Sphere(SphereConfig),
}

/// A complete particle-field instance: lattice, pointer kinematics, and the
/// per-frame physics. All frame-to-frame state lives here; construct one on
/// mount and drop it on unmount.
#[derive(Debug, Clone)]
pub struct FieldEngine {
    layout: FieldLayout,
    physics: PhysicsConfig,
    exclusion: Option<Exclusion>,
    particles: Vec<Particle>,
    tracker: PointerTracker,
    line_width: f32,
    anchor_radius: f32,
}

impl FieldEngine {
    /// Creates a field over the banded (navbar-to-divider) zone. Call
    /// [`FieldEngine::resize`] before the first frame.
    pub fn band(config: BandConfig) -> Self {
        Self {
            physics: config.physics,
            layout: FieldLayout::Band(config),
            exclusion: None,
            particles: Vec::new(),
            tracker: PointerTracker::new(),
            line_width: config.line_width,
            anchor_radius: config.anchor_radius,
        }
    }

    /// Creates a field over the circular "sphere" zone.
    pub fn sphere(config: SphereConfig) -> Self {
        Self {
            physics: config.physics,
            layout: FieldLayout::Sphere(config),
            exclusion: None,
            particles: Vec::new(),
            tracker: PointerTracker::new(),
            line_width: config.line_width,
            anchor_radius: config.anchor_radius,
        }
    }

    /// Sets the circular region to keep free of particles. Takes effect at
    /// the next [`FieldEngine::resize`].
    pub fn set_exclusion(&mut self, exclusion: Option<Exclusion>) {
        self.exclusion = exclusion;
    }

    /// Regenerates the scaled configuration and the whole lattice for a new
    /// viewport. The particle list is replaced wholesale; a frame either
    /// sees the previous lattice or the new one, never a partial mix.
    ///
    /// A non-positive size clears the lattice and the field goes dormant
    /// until the next valid resize.
    pub fn resize(&mut self, size: (f32, f32)) {
        match self.layout {
            FieldLayout::Band(config) => {
                let scaled = config.scaled(size.0);
                self.line_width = scaled.line_width;
                self.anchor_radius = scaled.anchor_radius;
                self.particles = generate_band(size, &scaled, self.exclusion);
            }
            FieldLayout::Sphere(config) => {
                let container = size.0.min(size.1).round();
                self.line_width = config.line_width;
                self.anchor_radius = config.anchor_radius;
                self.particles = generate_sphere(container, &config, self.exclusion);
            }
        }
    }

    /// Records a raw pointer-move event, in the field's own coordinate
    /// space. The host un-rotates if the surface is transformed.
    pub fn pointer_moved(&mut self, position: (f32, f32), now: Instant) {
        self.tracker.pointer_moved(position, now);
    }

    /// Advances the simulation by one frame.
    pub fn update(&mut self, now: Instant) {
        let sample = self.tracker.sample(now);
        let physics = self.physics;
        for particle in self.particles.iter_mut() {
            step_particle(particle, &sample, &physics);
        }
    }

    /// Emits this frame's draw list: per particle a connecting line from
    /// anchor to live position, the anchor dot, then the particle disc.
    pub fn draw_list(&self) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(self.particles.len() * 3);
        for particle in &self.particles {
            shapes.push(Shape::line(
                (particle.target_x, particle.target_y),
                (particle.x, particle.y),
                Stroke::new(self.line_width, Color::WHITE),
            ));
            shapes.push(Shape::circle(
                (particle.target_x, particle.target_y),
                self.anchor_radius,
                Color::WHITE,
            ));
            shapes.push(Shape::circle(
                (particle.x, particle.y),
                particle.radius,
                particle.color,
            ));
        }
        shapes
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

/// Repulsion magnitude at `dist` from the pointer: linear falloff from
/// `push_force` at zero distance to zero at the influence radius.
pub fn repulsion_force(dist: f32, physics: &PhysicsConfig) -> f32 {
    if dist >= physics.mouse_radius {
        return 0.0;
    }
    physics.push_force * (1.0 - dist / physics.mouse_radius)
}

fn step_particle(particle: &mut Particle, pointer: &PointerSample, physics: &PhysicsConfig) {
    let dx = pointer.position.0 - particle.x;
    let dy = pointer.position.1 - particle.y;
    let dist = dx.hypot(dy);

    // Impulse repulsion, gated against micro-jitter by the frame-aligned
    // pointer speed.
    if pointer.is_moving
        && dist < physics.mouse_radius
        && dist > 0.0
        && pointer.speed > physics.speed_threshold
    {
        let nx = -dx / dist;
        let ny = -dy / dist;
        let force = repulsion_force(dist, physics);
        particle.x += nx * force;
        particle.y += ny * force;
    }

    // First-order spring return; snaps inside the tolerance to avoid
    // asymptotic jitter.
    let return_dx = particle.target_x - particle.x;
    let return_dy = particle.target_y - particle.y;
    let return_dist = return_dx.hypot(return_dy);
    if return_dist > physics.snap_distance {
        particle.x += return_dx * physics.return_speed;
        particle.y += return_dy * physics.return_speed;
    } else {
        particle.x = particle.target_x;
        particle.y = particle.target_y;
    }
}
