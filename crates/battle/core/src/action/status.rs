//! Attaching, ticking, and ending statuses.
//!
//! Every stat a status touches on attach is recorded in its payload, and the
//! end hook reverses exactly that recorded delta. Re-attaching a status whose
//! name is already present only raises the remaining duration.

use crate::config::BattleConfig;
use crate::state::{BattleState, DamageType, Effect, EntityId, Position, Side, Status, StatusKind};
use crate::tactic::Tactic;

use super::combat::{self, KillCredit, Strike};
use super::{effect, general, movement};

/// Outcome of [`attach`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusApplication {
    /// A new instance joined the carrier's list.
    Attached,
    /// A same-named status was already present; its duration was raised.
    Refreshed,
    /// The carrier cannot take this status (dead, not a unit, list full, or
    /// a cooldown freeze on anything but an active general).
    Rejected,
}

/// Attaches `status` to `carrier`, refreshing instead of stacking.
pub fn attach(state: &mut BattleState, carrier: EntityId, mut status: Status) -> StatusApplication {
    let Some(entity) = state
        .entity_mut(carrier)
        .filter(|entity| entity.alive && entity.unit().is_some())
    else {
        return StatusApplication::Rejected;
    };

    if let Some(existing) = entity.statuses.get_mut(&status.name) {
        existing.duration = existing.duration.max(status.duration);
        return StatusApplication::Refreshed;
    }
    if entity.statuses.is_full() {
        return StatusApplication::Rejected;
    }
    if matches!(status.kind, StatusKind::FreezeCooldowns) && !state.generals.contains(&Some(carrier)) {
        return StatusApplication::Rejected;
    }

    on_attach(state, carrier, &mut status);
    match state.entity_mut(carrier).map(|entity| entity.statuses.push(status)) {
        Some(Ok(())) => StatusApplication::Attached,
        _ => StatusApplication::Rejected,
    }
}

fn on_attach(state: &mut BattleState, carrier: EntityId, status: &mut Status) {
    let Some(entity) = state.entity_mut(carrier) else {
        return;
    };
    let position = entity.position;

    match &mut status.kind {
        StatusKind::Shield { armor, damage_type } => {
            if let Some(unit) = entity.unit_mut() {
                unit.armor.adjust(*damage_type, *armor);
            }
        }
        StatusKind::Empower { percent, bonus } => {
            if let Some(unit) = entity.unit_mut() {
                *bonus = unit.power * *percent / 100;
                unit.power += *bonus;
            }
        }
        StatusKind::Blind { saved_power } => {
            if let Some(unit) = entity.unit_mut() {
                *saved_power = unit.power;
                unit.power = 0;
            }
        }
        StatusKind::Vanished { return_to } => {
            *return_to = position;
            entity.next_action = BattleConfig::SUSPENDED_NEXT_ACTION;
            movement::vacate(state, carrier);
            if let Some(entity) = state.entity_mut(carrier) {
                entity.position = Position::NOWHERE;
            }
        }
        StatusKind::Stunned { marker } => {
            *marker = effect::spawn(state, Side::Neutral, position, Effect::blinking(), None, '~');
        }
        _ => {}
    }
}

/// Runs one tick of every status on `carrier`.
///
/// Statuses are visited by name so that ones ending (or appearing) mid-pass
/// are handled once each. Ticking stops as soon as the carrier dies.
pub fn tick_all(state: &mut BattleState, carrier: EntityId) {
    let mut visited: Vec<String> = Vec::new();
    loop {
        if !state.is_alive(carrier) {
            return;
        }
        let Some(name) = state.entity(carrier).and_then(|entity| {
            entity
                .statuses
                .names()
                .find(|name| !visited.iter().any(|seen| seen == name))
                .map(str::to_owned)
        }) else {
            return;
        };
        update(state, carrier, &name);
        visited.push(name);
    }
}

fn update(state: &mut BattleState, carrier: EntityId, name: &str) {
    let Some(status) = state
        .entity_mut(carrier)
        .and_then(|entity| entity.statuses.get_mut(name))
    else {
        return;
    };

    if status.duration > 0 {
        status.duration -= 1;
        let expired = status.duration <= 0;
        tick(state, carrier, name);
        if expired {
            end(state, carrier, name);
        }
    }

    if let Some(entity) = state.entity_mut(carrier)
        && entity.statuses.get(name).is_some_and(Status::suspends_carrier)
    {
        entity.next_action = BattleConfig::SUSPENDED_NEXT_ACTION;
    }
}

fn tick(state: &mut BattleState, carrier: EntityId, name: &str) {
    let Some(entity) = state.entity_mut(carrier) else {
        return;
    };
    let Some(status) = entity.statuses.get_mut(name) else {
        return;
    };
    let owner = status.owner;

    match &mut status.kind {
        StatusKind::Poison {
            power,
            interval,
            timer,
        } => {
            *timer -= 1;
            if *timer < 0 {
                *timer = *interval;
                let strike = Strike {
                    power: *power,
                    damage_type: DamageType::Magical,
                    visual: None,
                    credit: KillCredit {
                        killer: None,
                        owner,
                    },
                };
                combat::receive(state, carrier, strike);
            }
        }
        StatusKind::Stunned { .. } => entity.reset_action(),
        StatusKind::Haste { speedup } => entity.next_action -= *speedup,
        StatusKind::FreezeCooldowns => {
            if let Some(general) = entity.general_mut() {
                for skill in &mut general.skills {
                    skill.change_cd(-1);
                }
            }
        }
        StatusKind::Taunted => {
            let Some(target) = owner
                .and_then(|owner| state.entity(owner))
                .filter(|owner| owner.is_on_board())
                .map(|owner| owner.position)
            else {
                return;
            };
            if state.generals.contains(&Some(carrier)) {
                general::place_flag(state, carrier, target);
            } else if state.is_minion(carrier)
                && let Some(unit) = state.entity_mut(carrier).and_then(|entity| entity.unit_mut())
            {
                unit.tactic = Tactic::AttackGeneral;
            }
        }
        _ => {}
    }
}

/// Detaches `name` from `carrier` and reverses what it did on attach.
pub fn end(state: &mut BattleState, carrier: EntityId, name: &str) {
    let Some(status) = remove_silently(state, carrier, name) else {
        return;
    };
    let alive = state.is_alive(carrier);
    let Some(entity) = state.entity_mut(carrier) else {
        return;
    };

    match status.kind {
        StatusKind::Shield { armor, damage_type } => {
            if let Some(unit) = entity.unit_mut() {
                unit.armor.adjust(damage_type, -armor);
            }
        }
        StatusKind::Empower { bonus, .. } => {
            if let Some(unit) = entity.unit_mut() {
                unit.power -= bonus;
            }
        }
        StatusKind::Blind { saved_power } => {
            if let Some(unit) = entity.unit_mut() {
                unit.power = saved_power;
            }
        }
        StatusKind::Recalling => entity.reset_action(),
        StatusKind::Stunned { marker } => {
            if let Some(marker) = marker {
                effect::disappear(state, marker);
            }
        }
        StatusKind::Vanishing { vanished_duration } if alive => {
            entity.reset_action();
            attach(state, carrier, Status::vanished(vanished_duration));
        }
        StatusKind::Vanished { return_to } if alive => {
            match movement::teleport(state, carrier, return_to) {
                Ok(()) => {
                    if let Some(entity) = state.entity_mut(carrier) {
                        entity.reset_action();
                    }
                }
                Err(_) => combat::die(state, carrier),
            }
        }
        _ => {}
    }
}

/// Drops a status without running its end hook.
pub(crate) fn remove_silently(state: &mut BattleState, carrier: EntityId, name: &str) -> Option<Status> {
    state.entity_mut(carrier)?.statuses.remove(name)
}
