//! Property-based tests for backoff, history and guard evaluation.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use proptest::prelude::*;
use std::time::Duration;
use waypoint::core::{Guard, State, StateHistory, StateTransition};
use waypoint::guard::{GuardCheck, GuardEvaluator};
use waypoint::machine::{Event, StateMachine};
use waypoint::retry::{Backoff, LinearBackoff, RetryStrategy};
use waypoint::state_enum;

state_enum! {
    enum Stage {
        Initial,
        Processing,
        Complete,
        Failed,
    }
    final: [Complete, Failed]
    error: [Failed]
}

prop_compose! {
    fn arbitrary_stage()(variant in 0..4u8) -> Stage {
        match variant {
            0 => Stage::Initial,
            1 => Stage::Processing,
            2 => Stage::Complete,
            _ => Stage::Failed,
        }
    }
}

prop_compose! {
    fn arbitrary_strategy()(
        max_attempts in 1usize..12,
        initial_ms in 0u64..500,
        extra_ms in 0u64..5_000,
        multiplier in 1.0f64..4.0,
    ) -> RetryStrategy {
        RetryStrategy::new(
            max_attempts,
            Duration::from_millis(initial_ms),
            Duration::from_millis(initial_ms + extra_ms),
            multiplier,
        )
        .unwrap()
    }
}

struct Step(u8);

impl Event for Step {
    type Kind = u8;

    fn kind(&self) -> u8 {
        self.0
    }
}

proptest! {
    #[test]
    fn delay_sequence_has_one_entry_per_retry(strategy in arbitrary_strategy()) {
        prop_assert_eq!(strategy.delays().count(), strategy.max_attempts - 1);
    }

    #[test]
    fn delays_start_at_initial_and_never_exceed_max(strategy in arbitrary_strategy()) {
        let delays: Vec<_> = strategy.delays().collect();
        if let Some(first) = delays.first() {
            prop_assert_eq!(*first, strategy.initial_delay);
        }
        for delay in &delays {
            prop_assert!(*delay <= strategy.max_delay);
        }
    }

    #[test]
    fn delays_never_shrink(strategy in arbitrary_strategy()) {
        let delays: Vec<_> = strategy.delays().collect();
        for pair in delays.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn linear_backoff_is_proportional(unit_ms in 0u64..10_000, attempt in 1usize..100) {
        let backoff = LinearBackoff::new(Duration::from_millis(unit_ms));
        prop_assert_eq!(
            backoff.delay_after(attempt),
            Duration::from_millis(unit_ms * attempt as u64)
        );
    }

    #[test]
    fn guard_is_deterministic(state in arbitrary_stage()) {
        let guard = Guard::new(|s: &Stage| !s.is_final());
        prop_assert_eq!(guard.check(&state), guard.check(&state));
    }

    #[test]
    fn recorded_history_length_is_transitions_plus_one(
        states in prop::collection::vec(arbitrary_stage(), 1..30)
    ) {
        let mut history = StateHistory::new(Stage::Initial);
        let mut from = Stage::Initial;
        for to in &states {
            history = history.record(StateTransition {
                from: from.clone(),
                to: to.clone(),
                event: "Advance".to_string(),
                timestamp: Utc::now(),
            });
            from = to.clone();
        }

        prop_assert_eq!(history.len(), states.len() + 1);
        prop_assert_eq!(history.current(), states.last().unwrap());
        prop_assert!(history.is_contiguous());
    }

    #[test]
    fn machine_history_counts_only_committed_transitions(
        events in prop::collection::vec(0u8..3, 0..40)
    ) {
        // Kind 0 toggles, kind 1 only fires from Processing, kind 2 is unregistered.
        let mut machine: StateMachine<Stage, Step> = StateMachine::new(Stage::Initial);
        machine.add_transition(Stage::Initial, 0, Stage::Processing);
        machine.add_transition(Stage::Processing, 0, Stage::Initial);
        machine.add_transition(Stage::Processing, 1, Stage::Initial);

        let mut committed = 0;
        for kind in events {
            if machine.transition(&Step(kind)).is_ok() {
                committed += 1;
            }
        }

        prop_assert_eq!(machine.history().len(), committed + 1);
        prop_assert_eq!(machine.history().current(), machine.current_state());
    }

    #[test]
    fn guard_failures_keep_declared_order(outcomes in prop::collection::vec(any::<bool>(), 0..12)) {
        let checks: Vec<GuardCheck<()>> = outcomes
            .iter()
            .enumerate()
            .map(|(i, passes)| {
                let passes = *passes;
                GuardCheck::new(format!("check_{i}"), move |_: &()| passes, format!("failure {i}"))
            })
            .collect();

        let result = GuardEvaluator::new().check(&(), &checks);

        let expected: Vec<String> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, passes)| !**passes)
            .map(|(i, _)| format!("failure {i}"))
            .collect();
        let actual: Vec<String> = result.messages().into_iter().map(str::to_string).collect();

        prop_assert_eq!(result.can_proceed, expected.is_empty());
        prop_assert_eq!(actual, expected);
    }
}
