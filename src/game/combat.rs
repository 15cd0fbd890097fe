//! Combat system - contact detection, damage, blocking

use tracing::trace;

use super::fighter::Fighter;
use super::physics::PhysicsSystem;
use crate::protocol::{GameEvent, Side};

/// Damage a landed punch or kick deals
pub const HIT_STRENGTH: f32 = 5.0;

/// Share of damage that still gets through a block
pub const BLOCK_DAMAGE_FACTOR: f32 = 0.2;

/// Hit result from contact resolution
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub attacker: Side,
    pub defender: Side,
    /// Life actually taken (0 if the defender could not be hit)
    pub damage: f32,
    pub blocked: bool,
    /// The defender was hittable at all (not hurt, won or lost)
    pub registered: bool,
    pub defender_knocked_out: bool,
    pub x: f32,
    pub y: f32,
}

impl HitResult {
    /// Events an audio or effects layer cares about
    pub fn events(&self) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::AttackContact {
            attacker: self.attacker,
        }];

        if !self.registered {
            return events;
        }

        events.push(if self.blocked {
            GameEvent::Blocked {
                attacker: self.attacker,
                defender: self.defender,
                damage: self.damage,
                x: self.x,
                y: self.y,
            }
        } else {
            GameEvent::HitLanded {
                attacker: self.attacker,
                defender: self.defender,
                damage: self.damage,
                x: self.x,
                y: self.y,
            }
        });

        events
    }
}

/// Combat system for resolving attacks between the two fighters
pub struct CombatSystem;

impl CombatSystem {
    /// Resolve at most one landed attack for this tick.
    ///
    /// The player's attack is checked first; the opponent's is only checked
    /// when the player has no active attack.
    pub fn resolve_contact(player: &mut Fighter, opponent: &mut Fighter) -> Option<HitResult> {
        if !PhysicsSystem::within_contact_distance(player.position(), opponent.position()) {
            return None;
        }

        if player.is_attack_active() {
            Some(Self::land(Side::Player, player, opponent))
        } else if opponent.is_attack_active() {
            Some(Self::land(Side::Opponent, opponent, player))
        } else {
            None
        }
    }

    fn land(attacker_side: Side, attacker: &mut Fighter, defender: &mut Fighter) -> HitResult {
        let outcome = defender.get_hit(HIT_STRENGTH);
        attacker.make_contact();

        let at = defender.position();
        let result = HitResult {
            attacker: attacker_side,
            defender: attacker_side.other(),
            damage: outcome.map(|o| o.damage).unwrap_or(0.0),
            blocked: outcome.map(|o| o.blocked).unwrap_or(false),
            registered: outcome.is_some(),
            defender_knocked_out: defender.has_lost(),
            x: at.x,
            y: at.y,
        };

        trace!(
            attacker = %result.attacker,
            damage = result.damage,
            blocked = result.blocked,
            defender_life = defender.life(),
            "Attack connected"
        );

        result
    }
}
