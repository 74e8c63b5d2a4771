//! Machine configuration.

/// Default name given to machines that are not named explicitly.
pub const DEFAULT_MACHINE_NAME: &str = "state machine";

/// Default number of executed transitions kept for `transition_history`.
pub const DEFAULT_TRANSITION_HISTORY_LIMIT: usize = 1024;

/// Settings applied when a machine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Name used in log spans and passed to extensions.
    pub name: String,
    /// When `true`, a failing action fails the operation that ran it.
    /// Otherwise the failure is logged and reported to extensions only.
    pub propagate_action_errors: bool,
    /// Most recent transitions kept in the transition log; older ones are
    /// discarded.
    pub transition_history_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MACHINE_NAME.to_string(),
            propagate_action_errors: false,
            transition_history_limit: DEFAULT_TRANSITION_HISTORY_LIMIT,
        }
    }
}

impl MachineConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
