//! Ring geometry and movement constraints

use std::ops::Sub;

use serde::{Deserialize, Serialize};

use super::fighter::Fighter;

/// Horizontal reach within which an attack can connect
pub const FIGHTER_CONTACT_DISTANCE_X: f32 = 7.5;

/// Depth reach within which an attack can connect
pub const FIGHTER_CONTACT_DISTANCE_Y: f32 = 1.5;

/// 2D position in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Trapezoidal floor of the ring as seen in perspective.
///
/// The far rope (large y) is shorter than the near rope, so the allowed x
/// range depends on y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Run over rise of the side ropes
    pub slope: f32,
}

impl RingBounds {
    /// The stock ring
    pub const STANDARD: RingBounds = RingBounds {
        min_x: 7.0,
        max_x: 60.0,
        min_y: 4.0,
        max_y: 22.0,
        slope: 3.16,
    };

    /// Allowed x range at depth `y`
    pub fn x_range_at(&self, y: f32) -> (f32, f32) {
        (y / self.slope + self.min_x, y / -self.slope + self.max_x)
    }

    /// Clamp a position onto the ring floor.
    ///
    /// y is clamped first; the x range is taken at the clamped y.
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        let y = position.y.clamp(self.min_y, self.max_y);
        let (min_x, max_x) = self.x_range_at(y);

        let x = if position.x < min_x {
            min_x
        } else if position.x > max_x {
            max_x
        } else {
            position.x
        };

        Vec2::new(x, y)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        if position.y < self.min_y || position.y > self.max_y {
            return false;
        }
        let (min_x, max_x) = self.x_range_at(position.y);
        position.x >= min_x && position.x <= max_x
    }
}

impl Default for RingBounds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Positional rules applied to both fighters each tick
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Whether two positions are close enough for an attack to connect
    pub fn within_contact_distance(a: Vec2, b: Vec2) -> bool {
        let d = a - b;
        d.x.abs() <= FIGHTER_CONTACT_DISTANCE_X && d.y.abs() <= FIGHTER_CONTACT_DISTANCE_Y
    }

    /// Turn the fighters toward each other. Ties face the player right.
    pub fn face_each_other(player: &mut Fighter, opponent: &mut Fighter) {
        if player.position().x <= opponent.position().x {
            player.face_right();
            opponent.face_left();
        } else {
            player.face_left();
            opponent.face_right();
        }
    }

    /// Keep a fighter on the ring floor
    pub fn keep_within_ring(fighter: &mut Fighter, ring: &RingBounds) {
        let clamped = ring.clamp(fighter.position());
        if clamped != fighter.position() {
            fighter.set_position(clamped);
        }
    }
}
