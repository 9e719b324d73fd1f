//! Spore growth simulation
//!
//! A small population of spore systems. Each one sprouts up to a handful of
//! branches whose reach is set by the spectral energy at the moment they
//! appear, then grows them slowly toward that reach.

use crate::analyzer::SpectrumFrame;
use crate::draw::{map_range, DrawList, DrawOp, Point};
use crate::palette;
use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::TAU;

mod constants {
    /// Spawning stops once the population reaches this size
    pub const SPAWN_CAP: usize = 10;
    /// Oldest units are evicted above this size
    pub const EVICT_CAP: usize = 20;
    /// Branch limit per unit
    pub const MAX_BRANCHES: usize = 5;
    /// Growth phase step per frame
    pub const PHASE_STEP: f32 = 0.01;
    /// Chance per frame of a new branch
    pub const BRANCH_CHANCE: f64 = 0.02;
    /// Branch length gained per frame
    pub const GROWTH_STEP: f32 = 0.5;
    /// Branch reach range (energy 0 -> 255)
    pub const MIN_REACH: f32 = 20.0;
    pub const MAX_REACH: f32 = 150.0;
    /// Branch thickness range (energy 0 -> 255)
    pub const MIN_THICKNESS: f32 = 1.0;
    pub const MAX_THICKNESS: f32 = 5.0;
    /// Angular sway amplitude in radians
    pub const SWAY: f32 = 0.1;
    pub const BRANCH_ALPHA: u8 = 150;
}

pub use constants::{EVICT_CAP, MAX_BRANCHES, SPAWN_CAP};
use constants::*;

/// One branch of a spore system. Only `length` changes after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    angle: f32,
    length: f32,
    max_length: f32,
    thickness: f32,
}

impl Branch {
    /// New zero-length branch sized from a spectral energy sample (0-255)
    pub fn new(angle: f32, energy: f32) -> Self {
        Self {
            angle,
            length: 0.0,
            max_length: map_range(energy, 0.0, 255.0, MIN_REACH, MAX_REACH),
            thickness: map_range(energy, 0.0, 255.0, MIN_THICKNESS, MAX_THICKNESS),
        }
    }

    fn grow(&mut self) {
        if self.length < self.max_length {
            self.length = (self.length + GROWTH_STEP).min(self.max_length);
        }
    }

    #[cfg(test)]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[cfg(test)]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[cfg(test)]
    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    #[cfg(test)]
    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

/// A spore system anchored at one canvas position
#[derive(Clone, Debug)]
pub struct GrowthUnit {
    id: u64,
    origin: Point,
    branches: Vec<Branch>,
    phase: f32,
}

impl GrowthUnit {
    fn new(id: u64, origin: Point) -> Self {
        Self {
            id,
            origin,
            branches: Vec::with_capacity(MAX_BRANCHES),
            phase: 0.0,
        }
    }

    /// One frame: advance the phase, maybe sprout, grow every branch
    pub fn grow<R: Rng + ?Sized>(&mut self, spectrum: &SpectrumFrame, rng: &mut R) {
        self.phase += PHASE_STEP;

        if self.branches.len() < MAX_BRANCHES && rng.gen_bool(BRANCH_CHANCE) {
            let angle = rng.gen_range(0.0..TAU);
            let energy = if spectrum.is_empty() {
                0.0
            } else {
                spectrum.bin(rng.gen_range(0..spectrum.len()))
            };
            self.branches.push(Branch::new(angle, energy));
        }

        for branch in &mut self.branches {
            branch.grow();
        }
    }

    /// Lines from the origin plus a dot at each branch tip
    pub fn render(&self) -> DrawList {
        let blend = self.phase.sin() * 0.5 + 0.5;
        let mut ops = Vec::with_capacity(self.branches.len() * 2);

        for (i, branch) in self.branches.iter().enumerate() {
            let angle = branch.angle + (self.phase + i as f32).sin() * SWAY;
            let tip = self.origin.polar(angle, branch.length);
            let color = palette::sunset(i)
                .lerp(palette::cyber(i), blend)
                .with_alpha(BRANCH_ALPHA);

            ops.push(DrawOp::Line {
                from: self.origin,
                to: tip,
                width: branch.thickness,
                color,
            });
            ops.push(DrawOp::Circle {
                center: tip,
                diameter: branch.thickness * 2.0,
                color,
            });
        }
        ops
    }

    /// Creation order; lower is older
    pub fn id(&self) -> u64 {
        self.id
    }

    #[cfg(test)]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[cfg(test)]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

/// Population of spore systems in creation order
#[derive(Default)]
pub struct GrowthSimulation {
    units: VecDeque<GrowthUnit>,
    next_id: u64,
}

impl GrowthSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit at `origin` while the population is below the spawn cap
    pub fn spawn_unit(&mut self, origin: Point) -> bool {
        if self.units.len() >= SPAWN_CAP {
            return false;
        }
        self.insert(origin);
        true
    }

    fn insert(&mut self, origin: Point) {
        let id = self.next_id;
        self.next_id += 1;
        self.units.push_back(GrowthUnit::new(id, origin));
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, spectrum: &SpectrumFrame, rng: &mut R) {
        for unit in &mut self.units {
            unit.grow(spectrum, rng);
        }
    }

    /// Drop the oldest unit once the population is above the eviction cap
    pub fn evict(&mut self) -> Option<GrowthUnit> {
        if self.units.len() > EVICT_CAP {
            self.units.pop_front()
        } else {
            None
        }
    }

    pub fn render(&self) -> DrawList {
        self.units.iter().flat_map(GrowthUnit::render).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[cfg(test)]
    pub fn units(&self) -> impl Iterator<Item = &GrowthUnit> {
        self.units.iter()
    }
}
