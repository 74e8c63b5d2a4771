//! Property-based tests for the lifecycle guard and core types.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use passive_fsm::core::{Guard, StateHistory, StateTransition};
use passive_fsm::{Checkpoint, MachineError, MachineLoader, MachineStatus, StateMachineBuilder};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
enum TestState {
    Initial,
    Processing,
    Complete,
    Failed,
}

#[derive(Clone, Debug)]
enum Call {
    Initialize(TestState),
    Load(TestState),
    Start,
    Fire(u8),
}

prop_compose! {
    fn arbitrary_state()(variant in 0..4u8) -> TestState {
        match variant {
            0 => TestState::Initial,
            1 => TestState::Processing,
            2 => TestState::Complete,
            _ => TestState::Failed,
        }
    }
}

fn arbitrary_call() -> impl Strategy<Value = Call> {
    prop_oneof![
        arbitrary_state().prop_map(Call::Initialize),
        arbitrary_state().prop_map(Call::Load),
        Just(Call::Start),
        any::<u8>().prop_map(Call::Fire),
    ]
}

/// What the lifecycle guard should answer, given the calls so far.
#[derive(Default)]
struct Model {
    status: MachineStatus,
    current_state: Option<TestState>,
}

impl Model {
    fn apply(&mut self, call: &Call) -> Result<(), MachineError> {
        match call {
            Call::Initialize(state) | Call::Load(state) => {
                if self.status != MachineStatus::Uninitialized {
                    return Err(MachineError::AlreadyInitialized);
                }
                self.status = MachineStatus::Initialized;
                self.current_state = Some(*state);
                Ok(())
            }
            Call::Start => match self.status {
                MachineStatus::Uninitialized => Err(MachineError::NotInitialized),
                _ => {
                    self.status = MachineStatus::Started;
                    Ok(())
                }
            },
            Call::Fire(_) => match self.status {
                MachineStatus::Started => Ok(()),
                _ => Err(MachineError::NotStarted),
            },
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn lifecycle_matches_model(calls in prop::collection::vec(arbitrary_call(), 0..12)) {
        let rt = runtime();
        let (actual, final_status, final_state) = rt.block_on(async {
            let machine = StateMachineBuilder::<TestState, u8>::new().build().unwrap();
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = match call {
                    Call::Initialize(state) => machine.initialize(*state).await,
                    Call::Load(state) => {
                        let mut loader = MachineLoader::<TestState>::new();
                        loader.set_current_state(*state);
                        machine.load(&loader).await
                    }
                    Call::Start => machine.start().await,
                    Call::Fire(event) => machine.fire(*event).await,
                };
                results.push(result);
            }
            (results, machine.status(), machine.current_state().await)
        });

        let mut model = Model::default();
        let expected: Vec<_> = calls.iter().map(|call| model.apply(call)).collect();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(final_status, model.status);
        prop_assert_eq!(final_state, Ok(model.current_state));
    }

    #[test]
    fn only_the_first_initialization_wins(
        first in arbitrary_state(),
        rest in prop::collection::vec(arbitrary_state(), 1..5),
    ) {
        let rt = runtime();
        let (rejected, current) = rt.block_on(async {
            let machine = StateMachineBuilder::<TestState, u8>::new().build().unwrap();
            let accepted = machine.initialize(first);
            let pending: Vec<_> = rest.iter().map(|state| machine.initialize(*state)).collect();
            accepted.await.unwrap();

            let mut rejected = 0;
            for handle in pending {
                if handle.await == Err(MachineError::AlreadyInitialized) {
                    rejected += 1;
                }
            }
            (rejected, machine.current_state().await)
        });

        prop_assert_eq!(rejected, rest.len());
        prop_assert_eq!(current, Ok(Some(first)));
    }

    #[test]
    fn guard_is_deterministic(state in arbitrary_state(), event in any::<u8>()) {
        let guard = Guard::new(|s: &TestState, e: &u8| *s != TestState::Failed && e % 2 == 0);
        let result1 = guard.check(&state, &event);
        let result2 = guard.check(&state, &event);
        prop_assert_eq!(result1, result2);
    }

    #[test]
    fn history_preserves_order(
        transitions in prop::collection::vec(arbitrary_state(), 1..10)
    ) {
        let mut history = StateHistory::new();
        let mut expected_path = vec![TestState::Initial];

        for (i, to_state) in transitions.iter().enumerate() {
            let from_state = if i == 0 {
                TestState::Initial
            } else {
                transitions[i - 1]
            };

            history = history.record(StateTransition {
                from: from_state,
                to: *to_state,
                event: i,
                timestamp: Utc::now(),
            });
            expected_path.push(*to_state);
        }

        let path = history.get_path();
        prop_assert_eq!(path.len(), expected_path.len());

        for (i, state) in path.iter().enumerate() {
            prop_assert_eq!(*state, &expected_path[i]);
        }
    }

    #[test]
    fn history_record_is_pure(state1 in arbitrary_state(), state2 in arbitrary_state()) {
        let history = StateHistory::new();

        let new_history = history.record(StateTransition {
            from: state1,
            to: state2,
            event: (),
            timestamp: Utc::now(),
        });

        // Original history unchanged
        prop_assert_eq!(history.transitions().len(), 0);
        prop_assert_eq!(new_history.transitions().len(), 1);
    }

    #[test]
    fn checkpoint_json_keeps_state_and_history(
        current in proptest::option::of(arbitrary_state()),
        entries in prop::collection::hash_map(arbitrary_state(), arbitrary_state(), 0..4),
    ) {
        let checkpoint = Checkpoint::new("prop", current, &entries);

        let json = checkpoint.to_json().unwrap();
        let restored: Checkpoint<TestState> = Checkpoint::from_json(&json).unwrap();

        prop_assert_eq!(restored.current_state, current);
        prop_assert_eq!(restored.history_map(), entries);
    }

    #[test]
    fn loaded_history_is_returned_unchanged(
        entries in prop::collection::hash_map(arbitrary_state(), arbitrary_state(), 0..4),
    ) {
        let rt = runtime();
        let expected: HashMap<TestState, TestState> = entries.clone();
        let loaded = rt.block_on(async {
            let machine = StateMachineBuilder::<TestState, u8>::new().build().unwrap();
            let mut loader = MachineLoader::<TestState>::new();
            loader.set_current_state(TestState::Processing);
            loader.set_history_states(entries);
            machine.load(&loader).await.unwrap();
            machine.history_states().await
        });

        prop_assert_eq!(loaded, Ok(expected));
    }
}
