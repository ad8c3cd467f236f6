//! Explorer integration tests.

use rust_2048::board::{Environment, Game2048, StateId};
use rust_2048::core::{Action, GameConfig, GameRng};
use rust_2048::explore::{ExplorationPolicy, ExploreConfig, Explorer, StateTable};

fn explore(seed: u64, bound: usize) -> (StateTable, Game2048) {
    let mut env = Game2048::new(GameConfig::default()).unwrap();
    let mut rng = GameRng::new(seed);
    let mut table = StateTable::new();
    Explorer::new(ExploreConfig::default().with_bound(bound))
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();
    (table, env)
}

// =============================================================================
// Table Invariants
// =============================================================================

#[test]
fn test_no_self_loops() {
    let (table, _) = explore(42, 200);
    for (id, record) in table.iter() {
        for edge in record.all_edges() {
            assert_ne!(&edge.next, id, "self loop at {}", id);
        }
    }
}

#[test]
fn test_edges_point_to_known_states() {
    let (table, _) = explore(42, 200);
    for (_, record) in table.iter() {
        for edge in record.all_edges() {
            assert!(table.contains(&edge.next));
        }
    }
}

#[test]
fn test_edges_increase_board_value() {
    let (table, env) = explore(7, 150);
    let config = env.config();
    for (id, record) in table.iter() {
        let before = id.decode(config.rows, config.cols).unwrap().sum();
        for edge in record.all_edges() {
            let after = edge.next.decode(config.rows, config.cols).unwrap().sum();
            let delta = after - before;
            assert!(delta == 2 || delta == 4, "delta {} from {}", delta, id);
        }
    }
}

#[test]
fn test_edge_probabilities_match_spawn_model() {
    let (table, env) = explore(3, 150);
    let config = env.config();
    for (id, record) in table.iter() {
        let before = id.decode(config.rows, config.cols).unwrap().sum();
        for edge in record.all_edges() {
            let next = edge.next.decode(config.rows, config.cols).unwrap();
            let location = 1.0 / (next.free_cells() as f64 + 1.0);
            let expected = match next.sum() - before {
                2 => location * config.prob_of_2,
                _ => location * config.prob_of_4,
            };
            assert!((edge.probability - expected).abs() < 1e-12);
        }
    }
}

#[test]
fn test_win_states_carry_reward_and_no_edges() {
    let (table, env) = explore(42, 300);
    let config = env.config();
    for (id, record) in table.iter() {
        let board = id.decode(config.rows, config.cols).unwrap();
        if board.max_tile() == config.target {
            assert_eq!(record.reward, config.win_reward);
            assert_eq!(record.edge_count(), 0);
        } else {
            assert_eq!(record.reward, 0.0);
        }
    }
}

// =============================================================================
// Determinism and Growth
// =============================================================================

#[test]
fn test_same_seed_same_table() {
    let (a, _) = explore(1234, 120);
    let (b, _) = explore(1234, 120);
    assert_eq!(a, b);
}

#[test]
fn test_second_run_extends_table() {
    let mut env = Game2048::new(GameConfig::default()).unwrap();
    let mut rng = GameRng::new(42);
    let mut table = StateTable::new();

    Explorer::new(ExploreConfig::default().with_bound(40))
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();
    let start = env.canonical_start_state().cloned().unwrap();
    let first = table.len();

    let stats = Explorer::new(ExploreConfig::default().with_bound(100))
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();

    assert!(table.len() >= 100);
    assert_eq!(stats.states_discovered, table.len() - first);
    // Later runs restart from the same canonical start.
    assert_eq!(env.canonical_start_state(), Some(&start));
}

#[test]
fn test_already_full_table_is_untouched() {
    let (mut table, mut env) = explore(42, 30);
    let before = table.clone();
    let mut rng = GameRng::new(0);

    let stats = Explorer::new(ExploreConfig::default().with_bound(10))
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();

    assert_eq!(stats.episodes, 0);
    assert_eq!(table, before);
}

// =============================================================================
// Custom Policies
// =============================================================================

/// Only ever slides left or down. A full board where both are no-ops has
/// no merge at all, so episodes still end.
struct LeftOrDown;

impl ExplorationPolicy for LeftOrDown {
    fn choose(&self, _state: &StateId, rng: &mut GameRng) -> Action {
        if rng.gen_bool(0.5) {
            Action::Left
        } else {
            Action::Down
        }
    }
}

#[test]
fn test_custom_policy_only_records_its_action() {
    let mut env = Game2048::new(GameConfig::default()).unwrap();
    let mut rng = GameRng::new(8);
    let mut table = StateTable::new();

    let stats = Explorer::new(ExploreConfig::default().with_bound(15).with_max_episodes(50))
        .with_policy(LeftOrDown)
        .explore(&mut table, &mut env, &mut rng)
        .unwrap();

    assert!(stats.episodes > 0);
    for (_, record) in table.iter() {
        for action in [Action::Up, Action::Right] {
            assert!(record.edges(action).is_empty());
        }
    }
}
