//! First-start gating of `once` commands.
//!
//! A container is either [`StartState::NeverStarted`] or
//! [`StartState::Started`]. `once` commands run only on the transition out
//! of `NeverStarted`; `always` commands run on every start. The runtime only
//! understands a shell string, so [`OnceGuard`] compiles the transition into
//! a sentinel-file check: the sentinel's absence means `NeverStarted`, and
//! creating it is the transition.

use devyard_common::layout::Layout;
use devyard_spec::Commands;

/// Whether a container has completed a start before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartState {
    /// The sentinel is absent.
    NeverStarted,
    /// The sentinel is present.
    Started,
}

impl StartState {
    /// State implied by the presence of the sentinel file.
    #[must_use]
    pub const fn from_sentinel(present: bool) -> Self {
        if present { Self::Started } else { Self::NeverStarted }
    }

    /// State after a start has run.
    #[must_use]
    pub const fn after_start(self) -> Self {
        Self::Started
    }

    /// `once` commands a start in this state runs.
    #[must_use]
    pub fn once_commands(self, commands: &Commands) -> &[String] {
        match self {
            Self::NeverStarted => commands.once.as_slice(),
            Self::Started => &[],
        }
    }

    /// Instructions a start in this state executes, in order.
    #[must_use]
    pub fn instructions(self, commands: &Commands) -> Vec<&str> {
        self.once_commands(commands)
            .iter()
            .chain(&commands.always)
            .map(String::as_str)
            .collect()
    }
}

/// Shell rendering of the `NeverStarted -> Started` transition.
#[derive(Debug, Clone)]
pub struct OnceGuard {
    run_state_dir: String,
    sentinel: String,
}

impl OnceGuard {
    /// Guard using the run-state paths of `layout`.
    #[must_use]
    pub fn new(layout: &Layout) -> Self {
        Self {
            run_state_dir: layout.run_state_dir.clone(),
            sentinel: layout.sentinel_path(),
        }
    }

    /// Shell steps running `commands` according to [`StartState`].
    ///
    /// The guarded block holds what only a `NeverStarted` container runs and
    /// creates the sentinel, so it is emitted even when `once` is empty. After
    /// the block every container is `Started`, and the remaining steps are
    /// that state's instructions.
    #[must_use]
    pub fn steps(&self, commands: &Commands) -> Vec<String> {
        let once = StartState::NeverStarted.once_commands(commands);
        let mut steps = Vec::with_capacity(once.len() + commands.always.len() + 4);
        steps.push(format!("if [ ! -f {} ]", self.sentinel));
        steps.push(format!("then mkdir -p {}", self.run_state_dir));
        steps.push(format!("touch {}", self.sentinel));
        steps.extend(once.iter().cloned());
        steps.push("fi".to_string());
        steps.extend(
            StartState::NeverStarted
                .after_start()
                .instructions(commands)
                .into_iter()
                .map(str::to_string),
        );
        steps
    }
}
