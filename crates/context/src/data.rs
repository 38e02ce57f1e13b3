// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// The phase a context document is being validated against. Required
/// fields accumulate monotonically: `Reproducer` requires everything
/// `RepoSetup` requires, plus its own; `Ship` requires everything
/// `Reproducer` requires, plus its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPhase {
    RepoSetup,
    Reproducer,
    Ship,
}

/// The progressively-filled JSON payload threaded through `panic_context.md`
/// across phases. Every field beyond the three set at generation time is
/// optional because it simply hasn't been written yet at earlier phases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanicContextData {
    pub panic_location: Option<String>,
    pub panic_message: Option<String>,
    pub tcl_test_file: Option<String>,
    #[serde(default)]
    pub failing_seed: Option<String>,
    #[serde(default)]
    pub why_simulator_missed: Option<String>,
    #[serde(default)]
    pub simulator_changes: Option<String>,
    #[serde(default)]
    pub bug_description: Option<String>,
    #[serde(default)]
    pub fix_description: Option<String>,
}

impl PanicContextData {
    /// A field is "present" iff it is neither absent, null, nor an empty
    /// string.
    fn is_present(field: &Option<String>) -> bool {
        matches!(field, Some(s) if !s.is_empty())
    }

    /// Every field required by `phase`, accumulated from earlier phases,
    /// not yet satisfied by `self`. Empty iff `self` satisfies `phase`.
    pub fn missing_fields(&self, phase: ValidationPhase) -> Vec<String> {
        let mut missing = Vec::new();
        let mut check = |present: bool, name: &str| {
            if !present {
                missing.push(name.to_string());
            }
        };

        check(Self::is_present(&self.panic_location), "panic_location");
        check(Self::is_present(&self.panic_message), "panic_message");
        check(Self::is_present(&self.tcl_test_file), "tcl_test_file");

        if matches!(phase, ValidationPhase::Reproducer | ValidationPhase::Ship) {
            check(Self::is_present(&self.failing_seed), "failing_seed");
            check(Self::is_present(&self.why_simulator_missed), "why_simulator_missed");
            check(Self::is_present(&self.simulator_changes), "simulator_changes");
        }

        if matches!(phase, ValidationPhase::Ship) {
            check(Self::is_present(&self.bug_description), "bug_description");
            check(Self::is_present(&self.fix_description), "fix_description");
        }

        missing
    }

    pub fn is_valid_for(&self, phase: ValidationPhase) -> bool {
        self.missing_fields(phase).is_empty()
    }
}
