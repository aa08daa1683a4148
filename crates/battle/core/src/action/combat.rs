use crate::state::{
    BattleState, DamageType, Effect, EntityId, EntityKind, Position, Side, StatusKind, UnitClass,
};

use super::{effect, general, movement};

/// Who gets credit when a strike kills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KillCredit {
    /// Entity that dealt the blow. `None` for status damage.
    pub killer: Option<EntityId>,
    /// Caster behind the blow, credited as well.
    pub owner: Option<EntityId>,
}

/// One resolved hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    pub power: i32,
    pub damage_type: DamageType,
    /// Glyph of the short-lived visual left on the defender.
    pub visual: Option<char>,
    pub credit: KillCredit,
}

impl Strike {
    /// The strike `attacker` deals with its own stats.
    pub fn from_entity(state: &BattleState, attacker: EntityId) -> Option<Self> {
        let entity = state.entity(attacker)?;
        let credit = KillCredit {
            killer: Some(attacker),
            owner: entity.owner,
        };
        let strike = match &entity.kind {
            EntityKind::Unit(_) | EntityKind::General(_) => {
                let unit = entity.unit()?;
                Self {
                    power: unit.power,
                    damage_type: unit.damage_type,
                    visual: Some(unit.attack_glyph),
                    credit,
                }
            }
            EntityKind::Effect(effect) => Self {
                power: effect.power,
                damage_type: DamageType::Physical,
                visual: None,
                credit,
            },
            EntityKind::Mine { power } => Self {
                power: *power,
                damage_type: DamageType::Physical,
                visual: None,
                credit,
            },
            EntityKind::Fortress(_) => return None,
        };
        Some(strike)
    }
}

/// Applies `strike` to `target`.
///
/// Units lose `max(0, power - armor)` hp, clamped at zero, and die on zero.
/// A mine hits its attacker back with its own power and breaks. Fortresses
/// and effects shrug everything off.
pub fn receive(state: &mut BattleState, target: EntityId, strike: Strike) {
    let Some(entity) = state.entity(target).filter(|entity| entity.alive) else {
        return;
    };
    match entity.kind {
        EntityKind::Unit(_) | EntityKind::General(_) => take_damage(state, target, strike),
        EntityKind::Mine { power } => {
            let owner = entity.owner;
            detonate(state, target, power, owner, strike);
        }
        EntityKind::Fortress(_) | EntityKind::Effect(_) => {}
    }
}

fn take_damage(state: &mut BattleState, target: EntityId, strike: Strike) {
    let Some(entity) = state.entity_mut(target) else {
        return;
    };
    let position = entity.position;
    let Some(unit) = entity.unit_mut() else {
        return;
    };
    unit.hp -= unit.armor.mitigate(strike.power, strike.damage_type);
    let dead = unit.hp <= 0;
    if dead {
        unit.hp = 0;
    }

    if let Some(glyph) = strike.visual {
        effect::spawn(state, Side::Neutral, position, Effect::temp(1), None, glyph);
    }
    if dead && !general::rebirth(state, target) {
        die(state, target);
        register_kill(state, strike.credit);
    }
}

fn detonate(
    state: &mut BattleState,
    mine: EntityId,
    power: i32,
    owner: Option<EntityId>,
    strike: Strike,
) {
    if let Some(attacker) = strike.credit.killer
        && state
            .entity(attacker)
            .is_some_and(|entity| entity.alive && entity.can_be_attacked())
    {
        let backlash = Strike {
            power,
            damage_type: DamageType::Physical,
            visual: None,
            credit: KillCredit {
                killer: Some(mine),
                owner,
            },
        };
        receive(state, attacker, backlash);
    }
    die(state, mine);
}

pub(crate) fn register_kill(state: &mut BattleState, credit: KillCredit) {
    for id in [credit.killer, credit.owner].into_iter().flatten() {
        if let Some(entity) = state.entity_mut(id) {
            entity.kills += 1;
        }
    }
}

/// Removes `id` from the board. Dying twice is a no-op.
///
/// A minion's death is reflected in its side's live-minion count; a
/// stunned unit takes its marker with it.
pub fn die(state: &mut BattleState, id: EntityId) {
    let Some(entity) = state.entity(id) else {
        return;
    };
    if !entity.alive {
        return;
    }
    if entity.is_effect() {
        effect::disappear(state, id);
        return;
    }

    let side = entity.side;
    let markers: Vec<EntityId> = entity
        .statuses
        .iter()
        .filter_map(|status| match status.kind {
            StatusKind::Stunned { marker } => marker,
            _ => None,
        })
        .collect();

    movement::vacate(state, id);
    if let Some(entity) = state.entity_mut(id) {
        entity.alive = false;
    }
    for marker in markers {
        effect::disappear(state, marker);
    }

    if state.is_minion(id)
        && let Some(general) = state.general_id(side)
        && let Some(general) = state.entity_mut(general).and_then(|entity| entity.general_mut())
    {
        general.minions_alive -= 1;
    }
}

/// First attackable enemy next to `id`.
///
/// Single-tile units look forward, backward, up, down (then the diagonals
/// when asked). Big units sweep their whole body one step forward, then
/// down, then up.
pub fn enemy_reachable(state: &BattleState, id: EntityId, diagonals: bool) -> Option<EntityId> {
    const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];
    const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

    let entity = state.entity(id)?;
    if !entity.is_on_board() {
        return None;
    }
    let is_target = |position: Position| {
        state
            .occupant(position)
            .filter(|other| other.id != id && !other.is_ally(entity) && other.can_be_attacked())
            .map(|other| other.id)
    };

    if let Some(unit) = entity.unit()
        && let UnitClass::Big { length } = unit.class
    {
        let forward = entity.side.forward();
        for (dx, dy) in [(forward, 0), (forward, 0), (0, 1), (0, -1)] {
            let anchor = entity.position.offset(dx, dy);
            for cell in crate::state::footprint(anchor, length) {
                if let Some(enemy) = is_target(cell) {
                    return Some(enemy);
                }
            }
        }
        return None;
    }

    let extra: &[(i32, i32)] = if diagonals { &DIAGONAL } else { &[] };
    ORTHOGONAL
        .iter()
        .chain(extra)
        .find_map(|(dx, dy)| {
            is_target(entity.position.offset(entity.side.mirror_dx(*dx), *dy))
        })
}

/// Strikes the first reachable enemy. Returns whether anything was hit.
pub fn try_attack(state: &mut BattleState, id: EntityId) -> bool {
    let Some(enemy) = enemy_reachable(state, id, false) else {
        return false;
    };
    let Some(strike) = Strike::from_entity(state, id) else {
        return false;
    };
    receive(state, enemy, strike);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::movement::spawn;
    use crate::state::{Armor, Battleground, Entity, UnitTemplate};
    use crate::tactic::Tactic;

    fn minion(state: &mut BattleState, side: Side, x: i32, y: i32, hp: i32) -> EntityId {
        let mut template = UnitTemplate::default();
        template.max_hp = hp;
        let unit = template.instantiate(side, Tactic::Stop);
        let id = spawn(
            state,
            Entity::new(EntityId::default(), side, Position::new(x, y), 'm', EntityKind::Unit(unit)),
        )
        .unwrap();
        state.minions.push(id);
        id
    }

    fn strike(power: i32, killer: EntityId) -> Strike {
        Strike {
            power,
            damage_type: DamageType::Physical,
            visual: None,
            credit: KillCredit {
                killer: Some(killer),
                owner: None,
            },
        }
    }

    #[test]
    fn armor_soaks_damage() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let attacker = minion(&mut state, Side::First, 2, 2, 30);
        let target = minion(&mut state, Side::Second, 3, 2, 30);
        state.entity_mut(target).unwrap().unit_mut().unwrap().armor = Armor::physical(4);
        receive(&mut state, target, strike(6, attacker));
        assert_eq!(state.entity(target).unwrap().hp(), Some(28));
        receive(&mut state, target, strike(3, attacker));
        assert_eq!(state.entity(target).unwrap().hp(), Some(28));
    }

    #[test]
    fn forward_is_checked_first() {
        let mut state = BattleState::new(Battleground::bordered(8, 6));
        let unit = minion(&mut state, Side::Second, 4, 2, 30);
        let behind = minion(&mut state, Side::First, 5, 2, 30);
        let ahead = minion(&mut state, Side::First, 3, 2, 30);
        assert_eq!(enemy_reachable(&state, unit, false), Some(ahead));
        die(&mut state, ahead);
        assert_eq!(enemy_reachable(&state, unit, false), Some(behind));
    }

    #[test]
    fn diagonals_only_when_asked_forward_first() {
        let mut state = BattleState::new(Battleground::bordered(8, 7));
        let unit = minion(&mut state, Side::Second, 4, 3, 30);
        let back_low = minion(&mut state, Side::First, 5, 4, 30);
        let front_low = minion(&mut state, Side::First, 3, 4, 30);
        let front_high = minion(&mut state, Side::First, 3, 2, 30);
        assert_eq!(enemy_reachable(&state, unit, false), None);
        assert_eq!(enemy_reachable(&state, unit, true), Some(front_high));
        die(&mut state, front_high);
        assert_eq!(enemy_reachable(&state, unit, true), Some(front_low));
        die(&mut state, front_low);
        assert_eq!(enemy_reachable(&state, unit, true), Some(back_low));
    }

    #[test]
    fn mines_hit_back_and_break() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let attacker = minion(&mut state, Side::First, 2, 2, 60);
        let mine = spawn(
            &mut state,
            Entity::new(
                EntityId::default(),
                Side::Neutral,
                Position::new(3, 2),
                'X',
                EntityKind::Mine { power: 50 },
            ),
        )
        .unwrap();
        assert!(try_attack(&mut state, attacker));
        assert!(!state.is_alive(mine));
        assert_eq!(state.entity(attacker).unwrap().hp(), Some(10));
        assert_eq!(state.grid.occupant(Position::new(3, 2)), None);
    }

    #[test]
    fn kill_credit_reaches_the_owner() {
        let mut state = BattleState::new(Battleground::bordered(8, 5));
        let caster = minion(&mut state, Side::First, 1, 1, 30);
        let target = minion(&mut state, Side::Second, 3, 2, 10);
        let blow = Strike {
            credit: KillCredit {
                killer: None,
                owner: Some(caster),
            },
            ..strike(50, caster)
        };
        receive(&mut state, target, blow);
        assert!(!state.is_alive(target));
        assert_eq!(state.entity(caster).unwrap().kills, 1);
        state.check_occupancy().unwrap();
    }
}
