// src/geometry.rs

//! Coordinate mappers: pure functions from an integer index (plus geometry
//! parameters) to a 2D position. Every mapper is deterministic and
//! side-effect-free so passes can resume, re-run, and preview without
//! drift.

use std::f64::consts::{FRAC_PI_2, TAU};

/// A position in surface coordinates (f64; the surface floors on write).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A mapped position annotated with its polar data, for callers that need
/// the angle or radius again (termination checks, petal connectors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub radius: f64,
}

// =============================================================================
// Archimedean spiral
// =============================================================================

/// `r = pitch * sqrt(n)`, `theta = sqrt(n) * 2pi`.
#[inline]
#[must_use]
pub fn archimedean(n: u64, pitch: f64, center: Point) -> PolarPoint {
    let root = (n as f64).sqrt();
    let radius = pitch * root;
    let angle = root * TAU;
    PolarPoint {
        x: center.x + radius * angle.cos(),
        y: center.y + radius * angle.sin(),
        angle,
        radius,
    }
}

// =============================================================================
// Square (Ulam) spiral
// =============================================================================

/// Cardinal walk direction. Screen coordinates: up decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Right,
    Up,
    Left,
    Down,
}

impl Heading {
    #[inline]
    fn turned(self) -> Self {
        match self {
            Heading::Right => Heading::Up,
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
        }
    }

    #[inline]
    fn delta(self, step: f64) -> (f64, f64) {
        match self {
            Heading::Right => (step, 0.0),
            Heading::Up => (0.0, -step),
            Heading::Left => (-step, 0.0),
            Heading::Down => (0.0, step),
        }
    }
}

/// Outward square-spiral walk: runs of equal length in each heading, run
/// length growing by one after every second turn. The walk state is part of
/// the render cursor; replaying from the same start yields the same
/// positions.
#[derive(Debug, Clone)]
pub struct UlamWalk {
    pos: Point,
    step: f64,
    heading: Heading,
    run: u32,
    taken: u32,
    turns: u32,
}

impl UlamWalk {
    #[must_use]
    pub fn new(center: Point, step: f64) -> Self {
        Self {
            pos: center,
            step,
            heading: Heading::Right,
            run: 1,
            taken: 0,
            turns: 0,
        }
    }

    /// Position for the current integer; advances the walk by one step.
    pub fn advance(&mut self) -> Point {
        let here = self.pos;
        let (dx, dy) = self.heading.delta(self.step);
        self.pos.x += dx;
        self.pos.y += dy;
        self.taken += 1;
        if self.taken == self.run {
            self.taken = 0;
            self.heading = self.heading.turned();
            self.turns += 1;
            if self.turns == 2 {
                self.turns = 0;
                self.run += 1;
            }
        }
        here
    }
}

impl Iterator for UlamWalk {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        Some(self.advance())
    }
}

/// Lattice position of integer `n` (1-based, 1 at the origin, unit step).
/// Test and preview helper; rendering uses the walk directly.
#[must_use]
pub fn ulam_position(n: u64) -> Point {
    let mut walk = UlamWalk::new(Point::new(0.0, 0.0), 1.0);
    let mut p = walk.advance();
    for _ in 1..n {
        p = walk.advance();
    }
    p
}

// =============================================================================
// Polygon (N-gon) spiral
// =============================================================================

/// Unit-radius vertex ring for a regular polygon, closed (the first vertex
/// is repeated at the end so side `s` spans `verts[s]..verts[s+1]`).
#[must_use]
pub fn polygon_vertices(sides: u32, rotation: f64) -> Vec<Point> {
    let mut verts = Vec::with_capacity(sides as usize + 1);
    for i in 0..sides {
        let theta = f64::from(i) * TAU / f64::from(sides) + rotation;
        verts.push(Point::new(theta.cos(), theta.sin()));
    }
    verts.push(verts[0]);
    verts
}

/// Integer assigned to `(layer, side)`, layers 1-based. Kept in u64 end to
/// end: high side counts at deep layers overflow f64-safe integer range
/// long before they overflow u64.
#[inline]
#[must_use]
pub fn polygon_index(layer: u64, side: u32, sides: u32) -> u64 {
    (layer - 1) * u64::from(sides) + u64::from(side) + 1
}

/// Scales a unit vertex onto the ring of the given radius.
#[inline]
#[must_use]
pub fn ring_point(center: Point, radius: f64, vertex: Point) -> Point {
    Point::new(center.x + radius * vertex.x, center.y + radius * vertex.y)
}

// =============================================================================
// Polar slice mapping
// =============================================================================

/// Angle of a residue class: slice 0 points straight up.
#[inline]
#[must_use]
pub fn slice_angle(residue: u32, modulus: u32) -> f64 {
    f64::from(residue) * (TAU / f64::from(modulus)) - FRAC_PI_2
}

/// `residue = n mod modulus`; radius compresses area-preservingly so density
/// reads uniformly across the disc.
#[inline]
#[must_use]
pub fn polar_map(n: u64, modulus: u32, domain: u64, max_radius: f64, center: Point) -> PolarPoint {
    let residue = (n % u64::from(modulus)) as u32;
    let angle = slice_angle(residue, modulus);
    let radius = ((n as f64) / (domain as f64)).sqrt() * max_radius;
    PolarPoint {
        x: center.x + radius * angle.cos(),
        y: center.y + radius * angle.sin(),
        angle,
        radius,
    }
}

/// Per-residue sine/cosine cache for the batched polar point pass. Rebuilt
/// only when the modulus changes; agrees exactly with [`polar_map`] because
/// both go through [`slice_angle`].
#[derive(Debug, Clone)]
pub struct SliceTable {
    modulus: u32,
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl SliceTable {
    #[must_use]
    pub fn new(modulus: u32) -> Self {
        let mut cos = Vec::with_capacity(modulus as usize);
        let mut sin = Vec::with_capacity(modulus as usize);
        for residue in 0..modulus {
            let angle = slice_angle(residue, modulus);
            cos.push(angle.cos());
            sin.push(angle.sin());
        }
        Self { modulus, cos, sin }
    }

    #[inline]
    #[must_use]
    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    #[inline]
    #[must_use]
    pub fn cos(&self, residue: u32) -> f64 {
        self.cos[residue as usize]
    }

    #[inline]
    #[must_use]
    pub fn sin(&self, residue: u32) -> f64 {
        self.sin[residue as usize]
    }
}

/// Whether two mapped angles land in the same angular slice, allowing for
/// wraparound at `2pi`.
#[inline]
#[must_use]
pub fn same_slice(a: f64, b: f64, epsilon: f64) -> bool {
    let diff = (a - b).abs();
    diff < epsilon || (diff - TAU).abs() < epsilon
}
