//! Fighter state machine
//!
//! A fighter is pure simulation state: which move it is in, how long it has
//! been in it, where it stands and how much life it has left. Everything it
//! does is driven through the command methods below, whether the commands
//! come from a human input source or from the opponent AI.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::animation::AnimationLibrary;
use super::combat::BLOCK_DAMAGE_FACTOR;
use super::physics::Vec2;
use crate::protocol::Command;

/// How fast a fighter walks (world units per second, per axis)
pub const MOVEMENT_SPEED: f32 = 10.0;

/// Life a fighter starts every round with
pub const MAX_LIFE: f32 = 100.0;

/// Share of an attack's animation before the hit can land
const ATTACK_ACTIVE_START: f32 = 0.33;

/// Share of an attack's animation after which the hit can no longer land
const ATTACK_ACTIVE_END: f32 = 0.66;

/// Fighter states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    Block,
    Hurt,
    Idle,
    Kick,
    Lose,
    Punch,
    Walk,
    Win,
}

impl FighterState {
    /// Whether the state's animation repeats while the state is held
    pub fn loops(self) -> bool {
        matches!(
            self,
            FighterState::Block | FighterState::Idle | FighterState::Walk | FighterState::Win
        )
    }

    /// States that end on their own once their animation has played
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            FighterState::Punch | FighterState::Kick | FighterState::Hurt
        )
    }

    /// States a new action (block, punch, kick) may start from
    pub fn is_free(self) -> bool {
        matches!(self, FighterState::Idle | FighterState::Walk)
    }
}

/// Display tint, opaque to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Tint {
    pub const WHITE: Tint = Tint {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn from_rgb(values: [f32; 3]) -> Self {
        Self {
            r: values[0],
            g: values[1],
            b: values[2],
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Held movement intent, each axis in {-1, 0, 1}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementDirection {
    pub x: i8,
    pub y: i8,
}

impl MovementDirection {
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// State and elapsed time the renderer should sample.
///
/// Only refreshed by ticks with a positive delta, so a paused game keeps
/// drawing the last live frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub state: FighterState,
    pub state_time: f32,
}

/// What a call to [`Fighter::get_hit`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    /// Life actually taken
    pub damage: f32,
    /// The hit was absorbed by a block
    pub blocked: bool,
    /// The hit ended the fighter's round
    pub knocked_out: bool,
}

/// A single fighter
#[derive(Debug, Clone)]
pub struct Fighter {
    name: String,
    tint: Tint,
    animations: Arc<dyn AnimationLibrary>,

    state: FighterState,
    state_time: f32,
    render: RenderFrame,

    position: Vec2,
    movement: MovementDirection,
    facing: Facing,

    life: f32,
    made_contact: bool,
}

impl Fighter {
    pub fn new(name: impl Into<String>, tint: Tint, animations: Arc<dyn AnimationLibrary>) -> Self {
        Self {
            name: name.into(),
            tint,
            animations,
            state: FighterState::Idle,
            state_time: 0.0,
            render: RenderFrame {
                state: FighterState::Idle,
                state_time: 0.0,
            },
            position: Vec2::ZERO,
            movement: MovementDirection::default(),
            facing: Facing::Right,
            life: MAX_LIFE,
            made_contact: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn animations(&self) -> &dyn AnimationLibrary {
        self.animations.as_ref()
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn render_frame(&self) -> RenderFrame {
        self.render
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn movement_direction(&self) -> MovementDirection {
        self.movement
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Reset for a new round at the given spot
    pub fn get_ready(&mut self, x: f32, y: f32) {
        self.state = FighterState::Idle;
        self.state_time = 0.0;
        self.render = RenderFrame {
            state: FighterState::Idle,
            state_time: 0.0,
        };
        self.position = Vec2::new(x, y);
        self.movement = MovementDirection::default();
        self.life = MAX_LIFE;
        self.made_contact = false;
    }

    /// Advance the fighter by `delta` seconds
    pub fn update(&mut self, delta: f32) {
        self.state_time += delta;

        if delta > 0.0 {
            self.render = RenderFrame {
                state: self.state,
                state_time: self.state_time,
            };
        }

        if self.state == FighterState::Walk {
            self.position.x += f32::from(self.movement.x) * MOVEMENT_SPEED * delta;
            self.position.y += f32::from(self.movement.y) * MOVEMENT_SPEED * delta;
        } else if self.state.is_timed()
            && self
                .animations
                .is_animation_finished(self.state, self.state_time)
        {
            self.return_to_neutral();
        }
    }

    pub fn face_left(&mut self) {
        self.facing = Facing::Left;
    }

    pub fn face_right(&mut self) {
        self.facing = Facing::Right;
    }

    /// Dispatch a discrete command
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::MoveUp => self.move_up(),
            Command::MoveDown => self.move_down(),
            Command::StopMovingLeft => self.stop_moving_left(),
            Command::StopMovingRight => self.stop_moving_right(),
            Command::StopMovingUp => self.stop_moving_up(),
            Command::StopMovingDown => self.stop_moving_down(),
            Command::Block => self.block(),
            Command::StopBlocking => self.stop_blocking(),
            Command::Punch => self.punch(),
            Command::Kick => self.kick(),
        }
    }

    pub fn move_left(&mut self) {
        self.set_movement(-1, self.movement.y);
    }

    pub fn move_right(&mut self) {
        self.set_movement(1, self.movement.y);
    }

    pub fn move_up(&mut self) {
        self.set_movement(self.movement.x, 1);
    }

    pub fn move_down(&mut self) {
        self.set_movement(self.movement.x, -1);
    }

    // Releasing a direction only clears the axis if that direction is the one held.

    pub fn stop_moving_left(&mut self) {
        if self.movement.x == -1 {
            self.set_movement(0, self.movement.y);
        }
    }

    pub fn stop_moving_right(&mut self) {
        if self.movement.x == 1 {
            self.set_movement(0, self.movement.y);
        }
    }

    pub fn stop_moving_up(&mut self) {
        if self.movement.y == 1 {
            self.set_movement(self.movement.x, 0);
        }
    }

    pub fn stop_moving_down(&mut self) {
        if self.movement.y == -1 {
            self.set_movement(self.movement.x, 0);
        }
    }

    fn set_movement(&mut self, x: i8, y: i8) {
        self.movement = MovementDirection { x, y };

        if self.state == FighterState::Walk && self.movement.is_zero() {
            self.change_state(FighterState::Idle);
        } else if self.state == FighterState::Idle && !self.movement.is_zero() {
            self.change_state(FighterState::Walk);
        }
    }

    pub fn block(&mut self) {
        if self.state.is_free() {
            self.change_state(FighterState::Block);
        }
    }

    pub fn stop_blocking(&mut self) {
        if self.state == FighterState::Block {
            self.return_to_neutral();
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.state == FighterState::Block
    }

    pub fn punch(&mut self) {
        self.start_attack(FighterState::Punch);
    }

    pub fn kick(&mut self) {
        self.start_attack(FighterState::Kick);
    }

    fn start_attack(&mut self, attack: FighterState) {
        if self.state.is_free() {
            self.change_state(attack);
            self.made_contact = false;
        }
    }

    /// In a punch or kick, regardless of whether it can still land
    pub fn is_attacking(&self) -> bool {
        matches!(self.state, FighterState::Punch | FighterState::Kick)
    }

    /// The current swing is inside its active window and has not landed yet
    pub fn is_attack_active(&self) -> bool {
        if self.made_contact || !self.is_attacking() {
            return false;
        }
        let duration = self.animations.animation_duration(self.state);
        self.state_time > duration * ATTACK_ACTIVE_START
            && self.state_time < duration * ATTACK_ACTIVE_END
    }

    /// Latch the current swing as landed
    pub fn make_contact(&mut self) {
        self.made_contact = true;
    }

    pub fn has_made_contact(&self) -> bool {
        self.made_contact
    }

    /// Take a hit of `damage`.
    ///
    /// Returns `None` when the fighter cannot be hit (hurt, won or lost).
    pub fn get_hit(&mut self, damage: f32) -> Option<HitOutcome> {
        if matches!(
            self.state,
            FighterState::Hurt | FighterState::Win | FighterState::Lose
        ) {
            return None;
        }

        let blocked = self.is_blocking();
        let damage = if blocked {
            damage * BLOCK_DAMAGE_FACTOR
        } else {
            damage
        };
        self.life -= damage;

        let knocked_out = self.life <= 0.0;
        if knocked_out {
            self.lose();
        } else if !blocked {
            self.change_state(FighterState::Hurt);
        }

        Some(HitOutcome {
            damage,
            blocked,
            knocked_out,
        })
    }

    pub fn has_lost(&self) -> bool {
        self.state == FighterState::Lose
    }

    pub fn has_won(&self) -> bool {
        self.state == FighterState::Win
    }

    pub fn win(&mut self) {
        self.change_state(FighterState::Win);
    }

    pub fn lose(&mut self) {
        self.change_state(FighterState::Lose);
        self.life = 0.0;
    }

    fn return_to_neutral(&mut self) {
        if self.movement.is_zero() {
            self.change_state(FighterState::Idle);
        } else {
            self.change_state(FighterState::Walk);
        }
    }

    fn change_state(&mut self, state: FighterState) {
        self.state = state;
        self.state_time = 0.0;
    }
}
