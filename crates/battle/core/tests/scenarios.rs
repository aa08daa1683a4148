//! Behavioral scenarios for the battle rules, driven through the public API.

use skirmish_core::action::{combat, general, minion, movement, status};
use skirmish_core::{
    Action, Area, Battle, BattleConfig, BattleSetup, BattleState, Battleground, DamageType,
    EntityId, KillCredit, Position, Side, Status, StatusApplication, Strike, Tactic, UnitTemplate,
};

fn grunt(hp: i32) -> UnitTemplate {
    UnitTemplate {
        max_hp: hp,
        ..UnitTemplate::minion("grunt", 'm')
    }
}

fn enlist(state: &mut BattleState, side: Side, x: i32, y: i32) -> EntityId {
    minion::enlist(state, side, &grunt(10), Tactic::Stop, Position::new(x, y)).unwrap()
}

fn hit(power: i32, attacker: Option<EntityId>) -> Strike {
    Strike {
        power,
        damage_type: DamageType::Physical,
        visual: None,
        credit: KillCredit {
            killer: attacker,
            owner: None,
        },
    }
}

fn small_battle() -> Battle {
    Battle::new(BattleSetup::new(BattleConfig::new().with_starting_minions(8))).unwrap()
}

// ============================================================================
// Combat
// ============================================================================

#[test]
fn wounded_minion_survives_a_light_hit() {
    let mut state = BattleState::new(Battleground::bordered(10, 10));
    let attacker = enlist(&mut state, Side::Second, 5, 5);
    let target = enlist(&mut state, Side::First, 4, 5);

    combat::receive(&mut state, target, hit(6, Some(attacker)));

    let entity = state.entity(target).unwrap();
    assert!(entity.alive);
    let unit = entity.unit().unwrap();
    assert_eq!(unit.hp, 4);
    assert!((unit.health_ratio() - 0.4).abs() < f32::EPSILON);
    assert_eq!(state.grid.occupant(Position::new(4, 5)), Some(target));
    assert_eq!(state.entity(attacker).unwrap().kills, 0);
}

#[test]
fn lethal_hit_clamps_hp_and_credits_the_killer() {
    let mut state = BattleState::new(Battleground::bordered(10, 10));
    let attacker = enlist(&mut state, Side::Second, 5, 5);
    let target = enlist(&mut state, Side::First, 4, 5);

    combat::receive(&mut state, target, hit(15, Some(attacker)));

    let entity = state.entity(target).unwrap();
    assert!(!entity.alive);
    assert_eq!(entity.unit().unwrap().hp, 0);
    assert_eq!(state.grid.occupant(Position::new(4, 5)), None);
    assert_eq!(state.live_minions(Side::First).count(), 0);
    assert_eq!(state.entity(attacker).unwrap().kills, 1);
    state.check_occupancy().unwrap();
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn straight_line_covers_every_tile_in_order() {
    let state = BattleState::new(Battleground::open(10, 10));
    let tiles = Area::line_from(Position::new(0, 0)).tiles(&state, None, Position::new(5, 0));
    let expected: Vec<Position> = (0..=5).map(|x| Position::new(x, 0)).collect();
    assert_eq!(tiles, expected);
}

// ============================================================================
// Tactics
// ============================================================================

fn selected(battle: &Battle, side: Side) -> usize {
    battle
        .state()
        .general(side)
        .and_then(|entity| entity.general())
        .map(|profile| profile.selected_tactic)
        .unwrap()
}

#[test]
fn tactic_toggle_round_trips() {
    let mut battle = small_battle();
    let mut turn = 0;
    let mut order = |battle: &mut Battle, action: Action| {
        battle.submit(Side::First, turn, action).unwrap();
        battle.advance().unwrap();
        battle.advance().unwrap();
        turn += 2;
    };

    order(&mut battle, Action::SelectTactic { index: 2 });
    order(&mut battle, Action::SelectTactic { index: 0 });
    assert_eq!(selected(&battle, Side::First), 0);

    let toggle = |battle: &Battle| {
        let entity = battle.state().general(Side::First).unwrap();
        general::toggle_target(entity.general().unwrap())
    };

    let first = toggle(&battle);
    assert_eq!(first, 2);
    order(&mut battle, Action::SelectTactic { index: first });
    assert_eq!(selected(&battle, Side::First), 2);

    let second = toggle(&battle);
    assert_eq!(second, 0);
    order(&mut battle, Action::SelectTactic { index: second });
    assert_eq!(selected(&battle, Side::First), 0);
}

#[test]
fn selecting_a_tactic_reaches_every_minion() {
    let mut battle = small_battle();
    battle.submit(Side::Second, 0, Action::SelectTactic { index: 1 }).unwrap();
    battle.advance().unwrap();
    battle.advance().unwrap();
    assert!(
        battle
            .state()
            .live_minions(Side::Second)
            .all(|entity| entity.unit().unwrap().tactic == Tactic::Forward)
    );
    assert!(
        battle
            .state()
            .live_minions(Side::First)
            .all(|entity| entity.unit().unwrap().tactic == Tactic::Stop)
    );
}

// ============================================================================
// Statuses
// ============================================================================

#[test]
fn reapplied_shield_keeps_the_longer_duration() {
    let mut state = BattleState::new(Battleground::bordered(10, 10));
    let carrier = enlist(&mut state, Side::First, 3, 3);

    assert_eq!(
        status::attach(&mut state, carrier, Status::shield(15, 2, DamageType::Physical)),
        StatusApplication::Attached
    );
    assert_eq!(
        status::attach(&mut state, carrier, Status::shield(10, 2, DamageType::Physical)),
        StatusApplication::Refreshed
    );

    let entity = state.entity(carrier).unwrap();
    assert_eq!(entity.statuses.len(), 1);
    assert_eq!(entity.statuses.get(Status::SHIELD).unwrap().duration, 15);
    assert_eq!(entity.unit().unwrap().armor.get(DamageType::Physical), 2);
}

#[test]
fn shield_expiry_restores_armor() {
    let mut state = BattleState::new(Battleground::bordered(10, 10));
    let carrier = enlist(&mut state, Side::First, 3, 3);
    status::attach(&mut state, carrier, Status::shield(3, 4, DamageType::Physical));
    assert_eq!(state.entity(carrier).unwrap().unit().unwrap().armor.get(DamageType::Physical), 4);

    for _ in 0..3 {
        status::tick_all(&mut state, carrier);
    }
    let entity = state.entity(carrier).unwrap();
    assert!(entity.statuses.is_empty());
    assert_eq!(entity.unit().unwrap().armor.get(DamageType::Physical), 0);
}

// ============================================================================
// Movement
// ============================================================================

#[test]
fn blocked_push_chain_moves_nobody() {
    let mut state = BattleState::new(Battleground::bordered(10, 5));
    let a = enlist(&mut state, Side::First, 6, 2);
    let b = enlist(&mut state, Side::First, 7, 2);
    let c = enlist(&mut state, Side::First, 8, 2);

    assert!(movement::step(&mut state, a, 1, 0).is_err());
    assert_eq!(state.entity(a).unwrap().position, Position::new(6, 2));
    assert_eq!(state.entity(b).unwrap().position, Position::new(7, 2));
    assert_eq!(state.entity(c).unwrap().position, Position::new(8, 2));
    state.check_occupancy().unwrap();
}

#[test]
fn free_push_chain_shifts_everyone() {
    let mut state = BattleState::new(Battleground::bordered(10, 5));
    let a = enlist(&mut state, Side::First, 4, 2);
    let b = enlist(&mut state, Side::First, 5, 2);
    let c = enlist(&mut state, Side::First, 6, 2);

    movement::step(&mut state, a, 1, 0).unwrap();
    assert_eq!(state.entity(a).unwrap().position, Position::new(5, 2));
    assert_eq!(state.entity(b).unwrap().position, Position::new(6, 2));
    assert_eq!(state.entity(c).unwrap().position, Position::new(7, 2));
    assert!(state.entity(b).unwrap().pushed);
    state.check_occupancy().unwrap();
}

#[test]
fn enemies_are_not_pushed() {
    let mut state = BattleState::new(Battleground::bordered(10, 5));
    let a = enlist(&mut state, Side::First, 4, 2);
    enlist(&mut state, Side::Second, 5, 2);
    assert!(movement::step(&mut state, a, 1, 0).is_err());
    assert_eq!(state.entity(a).unwrap().position, Position::new(4, 2));
}

// ============================================================================
// Turn lag
// ============================================================================

#[test]
fn orders_stay_hidden_until_the_lag_has_passed() {
    let mut left = small_battle();
    let mut right = small_battle();
    for battle in [&mut left, &mut right] {
        battle.submit(Side::First, 0, Action::SelectTactic { index: 1 }).unwrap();
        battle.submit(Side::Second, 2, Action::flag(40, 10)).unwrap();
    }
    left.submit(Side::First, 5, Action::flag(20, 30)).unwrap();
    right.submit(Side::First, 5, Action::SelectTactic { index: 4 }).unwrap();

    for _ in 0..=5 {
        left.advance().unwrap();
        right.advance().unwrap();
        assert_eq!(left.digest(), right.digest());
    }

    left.advance().unwrap();
    right.advance().unwrap();
    assert_ne!(left.state(), right.state());
}

#[test]
fn unparseable_lines_are_dropped() {
    let mut battle = small_battle();
    let before = battle.clone();
    assert!(battle.submit_line(Side::First, 0, "flag here").is_err());
    battle.advance().unwrap();
    let report = battle.advance().unwrap();
    assert_eq!(report.resolved, [None, None]);

    let mut control = before;
    control.advance().unwrap();
    control.advance().unwrap();
    assert_eq!(control.digest(), battle.digest());
}
