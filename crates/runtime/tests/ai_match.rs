use proptest::prelude::*;
use skirmish_core::{Action, Battle, BattleConfig, BattleSetup, Battleground, Position, Side};
use skirmish_runtime::{AiConfig, AiController, Runtime, RuntimeConfig};

fn setup(minions: i32) -> BattleSetup {
    BattleSetup::new(BattleConfig::new().with_starting_minions(minions))
        .with_ai(Side::First)
        .with_ai(Side::Second)
}

/// Plays AI against AI directly on the engine and returns every order each
/// side issued, in order.
fn play(minions: i32, seed: u64, turns: u64) -> [Vec<Action>; 2] {
    let mut battle = Battle::new(setup(minions)).unwrap();
    let mut controllers = [
        AiController::new(Side::First, AiConfig::default(), seed),
        AiController::new(Side::Second, AiConfig::default(), seed.wrapping_add(1)),
    ];
    let mut issued = [Vec::new(), Vec::new()];

    for _ in 0..turns {
        if battle.outcome().is_some() {
            break;
        }
        let turn = battle.turn();
        let mut orders = [None, None];
        for (slot, controller) in controllers.iter_mut().enumerate() {
            orders[slot] = controller.decide_action(battle.state(), turn).map(|decision| decision.action);
        }
        for (slot, order) in orders.into_iter().enumerate() {
            if let Some(action) = order {
                issued[slot].push(action);
                battle.submit(Side::from_index(slot), turn, action).unwrap();
            }
        }
        battle.advance().unwrap();
    }
    issued
}

fn flags(actions: &[Action]) -> impl Iterator<Item = (usize, Position)> + '_ {
    actions.iter().enumerate().filter_map(|(at, action)| match *action {
        Action::PlaceFlag { target } => Some((at, target)),
        _ => None,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn ai_never_spams_flags(seed in any::<u64>(), minions in 0..16i32) {
        for actions in play(minions, seed, 120) {
            for window in actions.windows(15) {
                let count = window.iter().filter(|action| action.is_flag()).count();
                prop_assert!(count <= 2, "{count} flags in one window");
            }

            let placed: Vec<(usize, Position)> = flags(&actions).collect();
            for (index, &(at, target)) in placed.iter().enumerate() {
                for &(_, earlier) in placed[index.saturating_sub(8)..index].iter() {
                    prop_assert!(
                        earlier.chebyshev(target) > 2,
                        "order {at}: flag at {target} too close to {earlier}"
                    );
                }
            }
        }
    }

    #[test]
    fn ai_acts_every_turn_while_its_general_stands(seed in any::<u64>(), minions in 0..16i32) {
        let mut battle = Battle::new(setup(minions)).unwrap();
        let mut ai = AiController::new(Side::Second, AiConfig::default(), seed);
        for _ in 0..60 {
            if battle.outcome().is_some() {
                break;
            }
            let turn = battle.turn();
            let decision = ai.decide_action(battle.state(), turn);
            prop_assert!(decision.is_some(), "no order on turn {turn}");
            let action = decision.unwrap().action;
            prop_assert_eq!(action.to_string().parse::<Action>(), Ok(action));
            battle.submit(Side::Second, turn, action).unwrap();
            battle.advance().unwrap();
        }
    }
}

#[test]
fn walled_in_general_still_acts() {
    let grid = Battleground::parse(
        "#########\n\
         #.......#\n\
         #..###..#\n\
         #..#.#..#\n\
         #..###..#\n\
         #.......#\n\
         #########\n",
    )
    .unwrap();
    let config = BattleConfig::with_dimensions(9, 7)
        .with_general_starts(Position::new(4, 3), Position::new(1, 1))
        .with_starting_minions(0);
    let battle = Battle::new(BattleSetup::new(config).with_grid(grid)).unwrap();

    let mut ai = AiController::new(Side::First, AiConfig::default(), 3);
    for turn in 0..40 {
        let decision = ai.decide_action(battle.state(), turn).expect("general is on the board");
        let text = decision.action.to_string();
        assert_eq!(text.parse::<Action>(), Ok(decision.action));
    }
}

#[tokio::test]
async fn ai_match_ends_or_reaches_the_cap() {
    let config = RuntimeConfig {
        max_turns: 600,
        seeds: [21, 22],
        ..RuntimeConfig::default()
    };
    let mut runtime = Runtime::builder()
        .config(config)
        .setup(BattleSetup::new(BattleConfig::new().with_starting_minions(6)))
        .ai(Side::First)
        .ai(Side::Second)
        .build()
        .await
        .unwrap();

    let summary = runtime.run().await.unwrap();
    match summary.outcome {
        Some(outcome) => assert!(outcome.turn < summary.turns),
        None => assert_eq!(summary.turns, 600),
    }

    let log = runtime.handle().replay_log().await.unwrap();
    assert!(!log.is_empty());
    runtime.shutdown().await.unwrap();
}
