//! Ambient particle field
//!
//! Short-lived points that drift, bounce off the canvas edges and fade out.
//! Loudness speeds them up.

use crate::draw::{DrawList, DrawOp, Point};
use crate::palette::{self, Rgba};
use rand::Rng;

/// Maximum number of live particles
pub const MAX_PARTICLES: usize = 100;
/// Loudness above which a particle is spawned each frame
pub const SPAWN_LEVEL: f32 = 0.01;
/// Starting life (doubles as starting alpha)
pub const FULL_LIFE: f32 = 255.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Point,
    pub vel: Point,
    pub size: f32,
    pub life: f32,
    pub decay: f32,
    pub color: Rgba,
}

impl Particle {
    /// Randomized particle at `pos`
    pub fn spawn<R: Rng + ?Sized>(pos: Point, rng: &mut R) -> Self {
        Self {
            pos,
            vel: Point::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)),
            size: rng.gen_range(2.0..=8.0),
            life: FULL_LIFE,
            decay: rng.gen_range(1.0..=3.0),
            color: palette::warm_or_cool(rng.gen_range(0..palette::WARM_OR_COOL_LEN)),
        }
    }

    /// Move one step, bounce off the edges and lose `decay` life
    pub fn update(&mut self, level: f32, width: f32, height: f32) {
        let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
        let boost = 1.0 + level * 3.0;
        self.pos.x += self.vel.x * boost;
        self.pos.y += self.vel.y * boost;
        self.life -= self.decay;

        if self.pos.x < 0.0 || self.pos.x > width {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < 0.0 || self.pos.y > height {
            self.vel.y = -self.vel.y;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    /// Filled circle whose alpha is the remaining life
    pub fn draw(&self) -> DrawOp {
        DrawOp::Circle {
            center: self.pos,
            diameter: self.size,
            color: self.color.with_alpha_f(self.life),
        }
    }
}

/// Collection owning every live particle
#[derive(Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a randomized particle unless the field is full.
    /// Returns whether one was added.
    pub fn spawn<R: Rng + ?Sized>(&mut self, pos: Point, rng: &mut R) -> bool {
        self.push(Particle::spawn(pos, rng))
    }

    /// Add a prepared particle unless the field is full
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= MAX_PARTICLES {
            return false;
        }
        self.particles.push(particle);
        true
    }

    pub fn advance(&mut self, level: f32, width: f32, height: f32) {
        for p in &mut self.particles {
            p.update(level, width, height);
        }
    }

    pub fn prune(&mut self) {
        self.particles.retain(|p| !p.is_dead());
    }

    /// Draw ops for every particle that still has life left
    pub fn render(&self) -> DrawList {
        self.particles
            .iter()
            .filter(|p| !p.is_dead())
            .map(Particle::draw)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still_particle(x: f32, y: f32, decay: f32) -> Particle {
        Particle {
            pos: Point::new(x, y),
            vel: Point::new(0.0, 0.0),
            size: 4.0,
            life: FULL_LIFE,
            decay,
            color: palette::SUNSET[0],
        }
    }

    #[test]
    fn spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = Particle::spawn(Point::new(3.0, 4.0), &mut rng);
            assert!((-1.0..=1.0).contains(&p.vel.x));
            assert!((-1.0..=1.0).contains(&p.vel.y));
            assert!((2.0..=8.0).contains(&p.size));
            assert!((1.0..=3.0).contains(&p.decay));
            assert_eq!(p.life, FULL_LIFE);
            assert!(palette::SUNSET.contains(&p.color) || palette::CYBER.contains(&p.color));
        }
    }

    #[test]
    fn field_never_exceeds_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ParticleField::new();
        for i in 0..250 {
            field.spawn(Point::new(i as f32, 0.0), &mut rng);
            assert!(field.len() <= MAX_PARTICLES);
        }
        assert_eq!(field.len(), MAX_PARTICLES);
        assert!(!field.spawn(Point::new(0.0, 0.0), &mut rng));
    }

    #[test]
    fn decay_one_dies_after_255_steps() {
        let mut field = ParticleField::new();
        field.push(still_particle(100.0, 100.0, 1.0));

        for step in 0..255 {
            let before = field.iter().next().unwrap().life;
            field.advance(0.0, 800.0, 600.0);
            let after = field.iter().next().unwrap().life;
            assert!(after < before, "life must drop on step {step}");
        }

        assert!(field.iter().next().unwrap().is_dead());
        assert!(field.render().is_empty());
        field.prune();
        assert!(field.is_empty());
    }

    #[test]
    fn loudness_scales_velocity() {
        let mut p = still_particle(50.0, 50.0, 1.0);
        p.vel = Point::new(1.0, -0.5);
        p.update(1.0, 800.0, 600.0);
        assert!((p.pos.x - 54.0).abs() < 1e-6);
        assert!((p.pos.y - 48.0).abs() < 1e-6);
    }

    #[test]
    fn leaving_the_canvas_reflects_velocity() {
        let mut p = still_particle(0.5, 10.0, 1.0);
        p.vel = Point::new(-1.0, 0.0);
        p.update(0.0, 100.0, 100.0);
        assert!(p.pos.x < 0.0);
        assert_eq!(p.vel.x, 1.0);

        let mut q = still_particle(10.0, 99.5, 1.0);
        q.vel = Point::new(0.0, 1.0);
        q.update(0.0, 100.0, 100.0);
        assert_eq!(q.vel.y, -1.0);
    }

    #[test]
    fn render_uses_life_as_alpha() {
        let mut p = still_particle(1.0, 1.0, 55.0);
        p.update(0.0, 10.0, 10.0);
        match p.draw() {
            DrawOp::Circle { color, diameter, .. } => {
                assert_eq!(color.a, 200);
                assert_eq!(diameter, 4.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }
}
