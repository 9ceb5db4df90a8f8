use proptest::prelude::*;

/// Property-based suite for the selection core's invariants under random
/// inputs.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basin::BasinRegistry;
    use crate::config::SchedulerConfig;
    use crate::scheduler::CycleScheduler;
    use crate::scorer::FreeEnergyScorer;
    use crate::seed::{AttractorRef, Observation, SeedId, ThoughtSeed, ThoughtSeedState};

    fn seed(id: String, core: f64, subs: Vec<f64>) -> ThoughtSeed {
        ThoughtSeed {
            id: SeedId::new(id),
            core_attractor: AttractorRef(0),
            sub_attractors: subs.iter().map(|_| AttractorRef(1)).collect(),
            activation_core: core,
            activation_sub: subs,
            valence: 0.0,
            arousal: 0.5,
            state: ThoughtSeedState::Active,
        }
    }

    prop_compose! {
        fn arb_seed(tag: &'static str)(
            idx in 0usize..8,
            core in 0.0f64..=1.0,
            subs in prop::collection::vec(0.0f64..=1.0, 0..4),
        ) -> ThoughtSeed {
            seed(format!("{tag}{idx}"), core, subs)
        }
    }

    // =========================================================================
    // Monotonic stability: an uncontested incumbent only deepens its basin,
    // and the barrier never exceeds the cap.
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn barrier_monotone_and_capped(
            base in 0.0f64..2.0,
            gain in 0.0f64..1.0,
            headroom in 0.0f64..4.0,
            wins in 1u64..60,
            score in -3.0f64..3.0,
        ) {
            let cap = base + headroom;
            let mut reg = BasinRegistry::new(base, gain, cap);
            let id = SeedId::from("w");
            reg.apply(1, &id, score);
            let mut last = reg.current().unwrap().activation_energy;
            for tick in 2..=(1 + wins) {
                reg.apply(tick, &id, score);
                let barrier = reg.current().unwrap().activation_energy;
                prop_assert!(barrier >= last);
                prop_assert!(barrier <= cap + 1e-12);
                last = barrier;
            }
        }
    }

    // =========================================================================
    // Displacement happens iff the challenger clears the barrier, strictly.
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn displacement_iff_barrier_cleared(
            incumbent_f in -5.0f64..5.0,
            challenger_f in -5.0f64..5.0,
            barrier in 0.0f64..3.0,
        ) {
            let mut reg = BasinRegistry::new(barrier, 0.0, barrier + 10.0);
            reg.apply(1, &SeedId::from("w"), incumbent_f);
            let delta_f = challenger_f - incumbent_f;
            let (reported, transition) = reg.apply(2, &SeedId::from("c"), challenger_f);
            prop_assert_eq!(reported.to_bits(), delta_f.to_bits());
            let displaced = transition.is_some();
            prop_assert_eq!(displaced, delta_f < -barrier);
            let basin = reg.current().unwrap();
            if displaced {
                prop_assert_eq!(&basin.dominant_id, &SeedId::from("c"));
                prop_assert_eq!(basin.stability, 0.0);
            } else {
                prop_assert_eq!(&basin.dominant_id, &SeedId::from("w"));
                prop_assert_eq!(basin.stability, 1.0);
            }
        }
    }

    // =========================================================================
    // Scoring is total for validated candidates.
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn score_is_total_for_valid_seeds(
            s in arb_seed("s"),
            evidence in prop::collection::vec(0.0f64..=1.0, 0..6),
        ) {
            prop_assume!(s.validate().is_ok());
            let obs = Observation::new(evidence);
            match FreeEnergyScorer::new().score(&s, &obs) {
                Ok(f) => prop_assert!(f.is_finite()),
                Err(e) => prop_assert_eq!(e.code(), "INVALID_DISTRIBUTION"),
            }
        }
    }

    // =========================================================================
    // Full-tick determinism under random candidate sets.
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn ticks_are_deterministic(
            rounds in prop::collection::vec(
                (
                    prop::collection::vec(arb_seed("r"), 0..6),
                    prop::collection::vec(0.0f64..=1.0, 0..4),
                ),
                1..12,
            ),
        ) {
            let mut s1 = CycleScheduler::new(SchedulerConfig::default()).unwrap();
            let mut s2 = CycleScheduler::new(SchedulerConfig::default()).unwrap();
            for (candidates, evidence) in rounds {
                let obs = Observation::new(evidence);
                let r1 = s1.tick(&candidates, &obs);
                let r2 = s2.tick(&candidates, &obs);
                prop_assert_eq!(r1, r2);
            }
            prop_assert_eq!(s1.diagnostics(), s2.diagnostics());
        }
    }

    // =========================================================================
    // An empty tick only ever increments stability.
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn empty_ticks_only_increment_stability(
            core in 0.5f64..=1.0,
            empty_ticks in 1u64..20,
        ) {
            let mut s = CycleScheduler::new(SchedulerConfig::default()).unwrap();
            let obs = Observation::new(vec![0.7, 0.3]);
            s.tick(&[seed("a".to_string(), core, vec![1.0 - core])], &obs);
            let before = s.current_basin().unwrap().clone();
            for _ in 0..empty_ticks {
                s.tick(&[], &obs);
            }
            let after = s.current_basin().unwrap();
            prop_assert_eq!(&after.dominant_id, &before.dominant_id);
            prop_assert_eq!(after.stability, before.stability + empty_ticks as f64);
            prop_assert_eq!(after.activation_energy.to_bits(), before.activation_energy.to_bits());
            prop_assert_eq!(after.free_energy.to_bits(), before.free_energy.to_bits());
        }
    }
}
