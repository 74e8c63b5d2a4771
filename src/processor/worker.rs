//! The single worker draining a machine's operation queue.
//!
//! The worker owns the current state, the history map and the transition
//! log. Only one operation is processed at a time and each runs to
//! completion, actions and notifications included, before the next is
//! dequeued. That serialization is what makes the unsynchronized state
//! here safe; it is not guarded by any lock.

use super::operation::Operation;
use crate::config::MachineConfig;
use crate::core::{Event, MachineStatus, State, StateHistory, StateTransition};
use crate::definition::{Action, StateDefinitions};
use crate::error::{ActionError, MachineError};
use crate::extension::{Extension, ExtensionRegistry};
use crate::persistence::Checkpoint;
use chrono::Utc;
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Machine data mutated by queued operations.
pub(crate) struct MachineCore<S: State, E: Event> {
    name: String,
    definitions: StateDefinitions<S, E>,
    extensions: Arc<ExtensionRegistry<S, E>>,
    propagate_action_errors: bool,
    history_limit: usize,
    current_state: Option<S>,
    history_states: HashMap<S, S>,
    transitions: VecDeque<StateTransition<S, E>>,
}

pub(crate) struct Processor<S: State, E: Event> {
    operations: mpsc::UnboundedReceiver<Operation<S, E>>,
    core: MachineCore<S, E>,
}

impl<S: State, E: Event> Processor<S, E> {
    pub(crate) fn new(
        operations: mpsc::UnboundedReceiver<Operation<S, E>>,
        core: MachineCore<S, E>,
    ) -> Self {
        Self { operations, core }
    }

    pub(crate) async fn run(mut self) {
        while let Some(operation) = self.operations.recv().await {
            trace!(operation = operation.kind(), "processing operation");
            self.core.process(operation).await;
        }
        debug!("operation queue closed, processor stopping");
    }
}

impl<S: State, E: Event> MachineCore<S, E> {
    pub(crate) fn new(
        config: &MachineConfig,
        definitions: StateDefinitions<S, E>,
        extensions: Arc<ExtensionRegistry<S, E>>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            definitions,
            extensions,
            propagate_action_errors: config.propagate_action_errors,
            history_limit: config.transition_history_limit,
            current_state: None,
            history_states: HashMap::new(),
            transitions: VecDeque::new(),
        }
    }

    pub(crate) async fn process(&mut self, operation: Operation<S, E>) {
        // A caller that dropped its handle no longer cares about the reply.
        match operation {
            Operation::Initialize { state, reply } => {
                self.initialize(state);
                let _ = reply.send(Ok(()));
            }
            Operation::Load {
                current_state,
                history_states,
                reply,
            } => {
                self.load(current_state, history_states);
                let _ = reply.send(Ok(()));
            }
            Operation::Start { reply } => {
                let result = self.start().await;
                let _ = reply.send(result);
            }
            Operation::Fire { event, reply } => {
                let result = self.fire(event).await;
                let _ = reply.send(result);
            }
            Operation::CurrentState { reply } => {
                let _ = reply.send(Ok(self.current_state.clone()));
            }
            Operation::HistoryStates { reply } => {
                let _ = reply.send(Ok(self.history_states.clone()));
            }
            Operation::TransitionHistory { reply } => {
                let history: StateHistory<S, E> = self.transitions.iter().cloned().collect();
                let _ = reply.send(Ok(history));
            }
            Operation::Save { reply } => {
                let checkpoint = Checkpoint::new(
                    self.name.clone(),
                    self.current_state.clone(),
                    &self.history_states,
                );
                debug!(checkpoint = %checkpoint.id, "saved machine");
                let _ = reply.send(Ok(checkpoint));
            }
        }
    }

    fn initialize(&mut self, state: S) {
        info!(state = ?state, "initialized");
        self.history_states.clear();
        self.notify(|ext, name| ext.initialized(name, &state));
        self.switch_to(state);
        self.notify(|ext, name| ext.status_changed(name, MachineStatus::Initialized));
    }

    fn load(&mut self, current_state: Option<S>, history_states: HashMap<S, S>) {
        info!(
            state = ?current_state,
            history_entries = history_states.len(),
            "loaded"
        );
        self.current_state = current_state;
        self.history_states = history_states;
        self.notify(|ext, name| {
            ext.loaded(name, self.current_state.as_ref(), &self.history_states)
        });
        if let Some(state) = &self.current_state {
            self.notify(|ext, name| ext.switched_state(name, None, state));
        }
        self.notify(|ext, name| ext.status_changed(name, MachineStatus::Initialized));
    }

    async fn start(&mut self) -> Result<(), MachineError> {
        info!(state = ?self.current_state, "starting");
        self.notify(|ext, name| ext.status_changed(name, MachineStatus::Started));
        let Some(state) = self.current_state.clone() else {
            warn!("started without a current state, nothing to enter");
            return Ok(());
        };
        self.enter(&state).await
    }

    async fn fire(&mut self, event: E) -> Result<(), MachineError> {
        self.notify(|ext, name| ext.firing_event(name, &event));
        let result = self.execute_transition(&event).await;
        self.notify(|ext, name| ext.fired_event(name, &event));
        result
    }

    async fn execute_transition(&mut self, event: &E) -> Result<(), MachineError> {
        let Some(current) = self.current_state.clone() else {
            warn!(event = ?event, "event fired without a current state");
            return Ok(());
        };
        let Some(transition) = self.definitions.select_transition(&current, event).cloned() else {
            debug!(state = ?current, event = ?event, "transition declined");
            self.notify(|ext, name| ext.transition_declined(name, &current, event));
            return Ok(());
        };

        let Some(target) = transition.target else {
            trace!(state = ?current, event = ?event, "internal transition");
            return self.run_actions(&current, &transition.actions).await;
        };

        self.notify(|ext, name| ext.exiting_state(name, &current));
        let exited = self
            .run_actions(&current, self.definitions.exit_actions(&current))
            .await;
        let acted = self.run_actions(&current, &transition.actions).await;

        self.switch_to(target.clone());
        self.record(StateTransition {
            from: current,
            to: target.clone(),
            event: event.clone(),
            timestamp: Utc::now(),
        });

        let entered = self.enter(&target).await;
        exited.and(acted).and(entered)
    }

    async fn enter(&self, state: &S) -> Result<(), MachineError> {
        self.notify(|ext, name| ext.entering_state(name, state));
        self.run_actions(state, self.definitions.entry_actions(state))
            .await
    }

    /// Run every action, even after a failure.
    ///
    /// Returns the first failure only when failures propagate.
    async fn run_actions(&self, state: &S, actions: &[Action]) -> Result<(), MachineError> {
        let mut first_failure = None;
        for action in actions {
            let outcome = AssertUnwindSafe(async { action.run().await })
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ActionError::new("action panicked")));
            let Err(error) = outcome else {
                continue;
            };

            warn!(state = ?state, %error, "action failed");
            self.notify(|ext, name| ext.action_failed(name, state, &error));
            if self.propagate_action_errors && first_failure.is_none() {
                first_failure = Some(MachineError::ActionFailed {
                    state: format!("{state:?}"),
                    message: error.message().to_string(),
                });
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    /// Append to the transition log, dropping the oldest entries past the
    /// configured limit.
    fn record(&mut self, transition: StateTransition<S, E>) {
        if self.history_limit == 0 {
            return;
        }
        while self.transitions.len() >= self.history_limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    fn switch_to(&mut self, state: S) {
        let old = self.current_state.replace(state.clone());
        debug!(from = ?old, to = ?state, "switched state");
        self.notify(|ext, name| ext.switched_state(name, old.as_ref(), &state));
    }

    fn notify<F>(&self, notify: F)
    where
        F: Fn(&dyn Extension<S, E>, &str),
    {
        self.extensions.notify(|ext| notify(ext, &self.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TransitionDefinition;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
    }

    impl Journal {
        fn push(&self, entry: String) {
            self.entries.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl Extension<i32, char> for Journal {
        fn switched_state(&self, _machine: &str, old: Option<&i32>, new: &i32) {
            self.push(format!("switch {old:?}->{new}"));
        }

        fn entering_state(&self, _machine: &str, state: &i32) {
            self.push(format!("enter {state}"));
        }

        fn exiting_state(&self, _machine: &str, state: &i32) {
            self.push(format!("exit {state}"));
        }

        fn transition_declined(&self, _machine: &str, state: &i32, event: &char) {
            self.push(format!("declined {state} {event}"));
        }

        fn action_failed(&self, _machine: &str, state: &i32, error: &ActionError) {
            self.push(format!("failed {state}: {error}"));
        }
    }

    fn core_with(
        definitions: StateDefinitions<i32, char>,
        propagate: bool,
    ) -> (MachineCore<i32, char>, Arc<Journal>) {
        let config = MachineConfig {
            propagate_action_errors: propagate,
            ..MachineConfig::named("test")
        };
        core_with_config(definitions, &config)
    }

    fn core_with_config(
        definitions: StateDefinitions<i32, char>,
        config: &MachineConfig,
    ) -> (MachineCore<i32, char>, Arc<Journal>) {
        let journal = Arc::new(Journal::default());
        let extensions: Arc<ExtensionRegistry<i32, char>> = Arc::new(ExtensionRegistry::new());
        extensions.add(journal.clone());
        (MachineCore::new(config, definitions, extensions), journal)
    }

    fn swing_definitions() -> StateDefinitions<i32, char> {
        let mut definitions = door_definitions();
        let mut close = TransitionDefinition::new(2, 'c');
        close.target = Some(1);
        definitions.declare(2).transitions.push(close);
        definitions
    }

    fn door_definitions() -> StateDefinitions<i32, char> {
        let mut definitions = StateDefinitions::new();
        let mut open = TransitionDefinition::new(1, 'o');
        open.target = Some(2);
        definitions.declare(1).transitions.push(open);
        definitions
    }

    #[tokio::test]
    async fn initialize_switches_without_entering() {
        let (mut core, journal) = core_with(door_definitions(), false);

        core.initialize(1);

        assert_eq!(core.current_state, Some(1));
        assert_eq!(journal.entries(), vec!["switch None->1"]);
    }

    #[tokio::test]
    async fn start_enters_current_state() {
        let (mut core, journal) = core_with(door_definitions(), false);
        core.initialize(1);

        core.start().await.unwrap();

        assert_eq!(journal.entries(), vec!["switch None->1", "enter 1"]);
    }

    #[tokio::test]
    async fn fire_exits_switches_and_enters() {
        let (mut core, journal) = core_with(door_definitions(), false);
        core.initialize(1);

        core.fire('o').await.unwrap();

        assert_eq!(core.current_state, Some(2));
        assert_eq!(core.transitions.len(), 1);
        assert_eq!((core.transitions[0].from, core.transitions[0].to), (1, 2));
        assert_eq!(
            journal.entries(),
            vec!["switch None->1", "exit 1", "switch Some(1)->2", "enter 2"]
        );
    }

    #[tokio::test]
    async fn unmatched_event_is_declined() {
        let (mut core, journal) = core_with(door_definitions(), false);
        core.initialize(1);

        core.fire('x').await.unwrap();

        assert_eq!(core.current_state, Some(1));
        assert!(core.transitions.is_empty());
        assert_eq!(journal.entries().last().unwrap(), "declined 1 x");
    }

    #[tokio::test]
    async fn transition_log_keeps_most_recent_entries() {
        let config = MachineConfig {
            transition_history_limit: 2,
            ..MachineConfig::named("test")
        };
        let (mut core, _journal) = core_with_config(swing_definitions(), &config);
        core.initialize(1);

        for event in ['o', 'c', 'o'] {
            core.fire(event).await.unwrap();
        }

        let events: Vec<_> = core.transitions.iter().map(|t| t.event).collect();
        assert_eq!(events, vec!['c', 'o']);
        assert_eq!(core.current_state, Some(2));
    }

    #[tokio::test]
    async fn zero_limit_disables_the_transition_log() {
        let config = MachineConfig {
            transition_history_limit: 0,
            ..MachineConfig::named("test")
        };
        let (mut core, _journal) = core_with_config(swing_definitions(), &config);
        core.initialize(1);

        core.fire('o').await.unwrap();

        assert!(core.transitions.is_empty());
        assert_eq!(core.current_state, Some(2));
    }

    #[tokio::test]
    async fn transition_history_query_snapshots_the_log() {
        let (mut core, _journal) = core_with(swing_definitions(), false);
        core.initialize(1);
        core.fire('o').await.unwrap();
        core.fire('c').await.unwrap();

        let (reply, snapshot) = oneshot::channel();
        core.process(Operation::TransitionHistory { reply }).await;
        let history = snapshot.await.unwrap().unwrap();

        assert_eq!(history.get_path(), vec![&1, &2, &1]);
        assert_eq!(core.transitions.len(), 2);
    }

    #[tokio::test]
    async fn internal_transition_keeps_state() {
        let mut definitions = door_definitions();
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let mut internal = TransitionDefinition::new(1, 'i');
        internal.actions.push(Action::from_fn(move || {
            *flag.lock().unwrap() = true;
            Ok(())
        }));
        definitions.declare(1).transitions.push(internal);
        let (mut core, journal) = core_with(definitions, false);
        core.initialize(1);

        core.fire('i').await.unwrap();

        assert!(*ran.lock().unwrap());
        assert_eq!(core.current_state, Some(1));
        assert_eq!(journal.entries(), vec!["switch None->1"]);
    }

    #[tokio::test]
    async fn action_failure_is_reported_not_propagated_by_default() {
        let mut definitions = door_definitions();
        definitions
            .declare(1)
            .entry_actions
            .push(Action::from_fn(|| Err("jammed".into())));
        let (mut core, journal) = core_with(definitions, false);
        core.initialize(1);

        assert_eq!(core.start().await, Ok(()));
        assert_eq!(journal.entries().last().unwrap(), "failed 1: jammed");
    }

    #[tokio::test]
    async fn action_failure_propagates_when_configured() {
        let mut definitions = door_definitions();
        let later_ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&later_ran);
        let entry = &mut definitions.declare(1).entry_actions;
        entry.push(Action::from_fn(|| Err("jammed".into())));
        entry.push(Action::from_fn(move || {
            *flag.lock().unwrap() = true;
            Ok(())
        }));
        let (mut core, _journal) = core_with(definitions, true);
        core.initialize(1);

        let result = core.start().await;

        assert_eq!(
            result,
            Err(MachineError::ActionFailed {
                state: "1".to_string(),
                message: "jammed".to_string(),
            })
        );
        assert!(*later_ran.lock().unwrap());
    }

    #[tokio::test]
    async fn panicking_action_is_contained() {
        let mut definitions = door_definitions();
        definitions
            .declare(1)
            .entry_actions
            .push(Action::from_fn(|| panic!("boom")));
        let (mut core, journal) = core_with(definitions, false);
        core.initialize(1);

        assert_eq!(core.start().await, Ok(()));
        assert_eq!(
            journal.entries().last().unwrap(),
            "failed 1: action panicked"
        );
    }

    #[tokio::test]
    async fn load_installs_history_without_entering() {
        let (mut core, journal) = core_with(door_definitions(), false);

        core.load(Some(2), HashMap::from([(10, 11)]));

        assert_eq!(core.current_state, Some(2));
        assert_eq!(core.history_states.get(&10), Some(&11));
        assert_eq!(journal.entries(), vec!["switch None->2"]);
    }

    #[tokio::test]
    async fn initialize_clears_history_map() {
        let (mut core, _journal) = core_with(door_definitions(), false);
        core.history_states.insert(10, 11);

        core.initialize(1);

        assert!(core.history_states.is_empty());
    }

    #[tokio::test]
    async fn processor_replies_in_submission_order() {
        let (core, _journal) = core_with(door_definitions(), false);
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(Processor::new(receiver, core).run());

        let (init_reply, init_done) = oneshot::channel();
        let (query_reply, query_done) = oneshot::channel();
        sender
            .send(Operation::Initialize {
                state: 1,
                reply: init_reply,
            })
            .unwrap();
        sender
            .send(Operation::CurrentState { reply: query_reply })
            .unwrap();
        drop(sender);

        assert_eq!(init_done.await.unwrap(), Ok(()));
        assert_eq!(query_done.await.unwrap(), Ok(Some(1)));
        worker.await.unwrap();
    }
}
