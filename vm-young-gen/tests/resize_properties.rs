//! Young Generation Property-Based Tests
//!
//! Random sequences of resizes, scavenges, eden allocations and balloon
//! changes. After every step the partition must tile the committed range,
//! the committed size must stay in bounds, and live survivor data must stay
//! where it was.

mod common;

use proptest::prelude::*;

use common::{A, MIB, SimulatedMemory, scavenge, scenario_config, simulated_gen};
use vm_young_gen::{HEAP_WORD_SIZE, YoungGeneration};

// ============================================================================
// Test Data Structures
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Resize { eden: usize, survivor: usize },
    /// Copy this per-mille share of the to-space and swap
    Scavenge { permille: usize },
    Allocate { words: usize },
    Balloon { bytes: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..300 * MIB, 0..40 * MIB).prop_map(|(eden, survivor)| Op::Resize { eden, survivor }),
        3 => (0..=1000usize).prop_map(|permille| Op::Scavenge { permille }),
        1 => (1..4096usize).prop_map(|words| Op::Allocate { words }),
        1 => (0..300 * MIB).prop_map(|bytes| Op::Balloon { bytes }),
    ]
}

fn apply(young: &mut YoungGeneration<SimulatedMemory>, op: &Op) {
    match *op {
        Op::Resize { eden, survivor } => {
            let live = young.from_space().used_region();
            let eden_used = young.eden_space().used_region();
            let outcome = young.resize(eden, survivor).unwrap();
            // eden 非空时边界不动，对象不丢
            if !eden_used.is_empty() {
                assert!(!outcome.changed());
                assert_eq!(young.eden_space().used_region(), eden_used);
            }
            // 存活数据原地保留
            if !live.is_empty() {
                assert_eq!(young.from_space().used_region(), live);
            }
            assert!(young.from_space().capacity_in_bytes() >= live.byte_size());
        }
        Op::Scavenge { permille } => {
            let words = young.to_space().capacity_in_words() * permille / 1000;
            scavenge(young, words);
        }
        Op::Allocate { words } => {
            let _ = young.allocate(words);
        }
        Op::Balloon { bytes } => young.set_balloon_size(bytes),
    }
}

fn check_invariants(young: &YoungGeneration<SimulatedMemory>) {
    young.verify().unwrap();

    let committed = young.committed_size();
    assert!(committed >= young.min_gen_size());
    assert!(committed <= young.true_max());
    assert_eq!(committed % A, 0);
    assert!(young.max_size() <= young.true_max());
    assert!(young.balloon_size() <= young.true_max());

    let sum = young.eden_space().capacity_in_bytes()
        + young.from_space().capacity_in_bytes()
        + young.to_space().capacity_in_bytes();
    assert_eq!(sum, committed);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invariants_hold_over_random_cycles(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (mut young, _) = simulated_gen(&scenario_config());
        for op in &ops {
            apply(&mut young, op);
            check_invariants(&young);
        }
    }

    #[test]
    fn prop_unballooned_committed_within_max_size(
        ops in prop::collection::vec(op_strategy(), 1..30),
    ) {
        let (mut young, _) = simulated_gen(&scenario_config());
        for op in ops.iter().filter(|op| !matches!(op, Op::Balloon { .. })) {
            apply(&mut young, op);
            prop_assert!(young.committed_size() <= young.max_size());
            prop_assert_eq!(young.max_size(), young.true_max());
        }
    }

    #[test]
    fn prop_resize_to_current_sizes_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..20),
        survivor in A..20 * MIB,
    ) {
        let (mut young, _) = simulated_gen(&scenario_config());
        for op in &ops {
            apply(&mut young, op);
        }
        young.eden_space().reset();
        // 先把两个 survivor 调成相同大小
        let committed = young.committed_size();
        young.resize(committed.saturating_sub(2 * survivor), survivor).unwrap();
        prop_assume!(
            young.from_space().capacity_in_bytes() == young.to_space().capacity_in_bytes()
        );

        let before = young.snapshot();
        let outcome = young
            .resize(
                young.eden_space().capacity_in_bytes(),
                young.from_space().capacity_in_bytes(),
            )
            .unwrap();
        prop_assert!(!outcome.changed());
        prop_assert_eq!(young.snapshot(), before);
    }

    #[test]
    fn prop_balloon_lowers_and_restores_ceiling(
        ops in prop::collection::vec(op_strategy(), 0..20),
        balloon in 0..256 * MIB,
    ) {
        let (mut young, _) = simulated_gen(&scenario_config());
        for op in ops.iter().filter(|op| !matches!(op, Op::Balloon { .. })) {
            apply(&mut young, op);
        }
        let ceiling = young.max_size();

        young.set_balloon_size(balloon);
        let withheld = young.balloon_size();
        prop_assert!(withheld <= balloon && balloon - withheld < A);

        // 可见上限要么是 true_max - B，要么是 resize 实际能收缩到的大小
        let floor = young.committed_size() - young.planner().limit_gen_shrink(withheld);
        let max_size = young.max_size();
        prop_assert!(max_size <= (young.true_max() - withheld).max(floor));
        prop_assert!(max_size >= floor);

        young.set_balloon_size(0);
        prop_assert_eq!(young.max_size(), ceiling);
    }

    #[test]
    fn prop_allocations_stay_in_eden(words in prop::collection::vec(1..512usize, 1..64)) {
        let (young, _) = simulated_gen(&scenario_config());
        let eden = young.eden_space().region();
        let mut granted = 0;
        for w in words {
            if let Some(ptr) = young.allocate(w) {
                let addr = ptr.as_ptr().addr();
                prop_assert!(eden.contains(addr));
                prop_assert!(addr + w * HEAP_WORD_SIZE <= eden.end());
                granted += w * HEAP_WORD_SIZE;
            }
        }
        prop_assert_eq!(granted, young.eden_space().used_in_bytes());
    }
}
