//! Subcommand handlers. Each one plays the part of a single app screen.

pub mod auth;
pub mod completions;
pub mod group;
pub mod profile;
pub mod ranking;
pub mod tasks;
pub mod week;

use serde::Serialize;
use std::io::{self, Write};

use crate::output::{OutputMode, pretty_kv};
use whizzy_core::session::OnboardingState;
use whizzy_core::store::Backend;

/// What every handler gets: the backend opened once in `main`, and how to print.
pub struct Context<'a> {
    pub backend: &'a dyn Backend,
    pub output: OutputMode,
}

/// Onboarding state after a command, in the shape every command prints it.
#[derive(Debug, Serialize)]
pub struct NextStep {
    pub next: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl From<&OnboardingState> for NextStep {
    fn from(state: &OnboardingState) -> Self {
        Self {
            next: state.label(),
            group_id: state.group_id().map(ToString::to_string),
        }
    }
}

/// Human hint for what to run next.
pub const fn next_command(state: &OnboardingState) -> &'static str {
    match state {
        OnboardingState::SignedOut => "wz login | wz signup",
        OnboardingState::ProfileSetup => "wz profile setup --name <NAME> --avatar <0-15>",
        OnboardingState::GroupSelection => "wz group create | wz group join <CODE> | wz group list",
        OnboardingState::GroupSetup { .. } => {
            "wz group configure --name <NAME> --week-start <DAY>"
        }
        OnboardingState::TaskSelection { .. } => "wz tasks schedule <ID>...",
        OnboardingState::Home { .. } => "wz week",
    }
}

/// Write the `next:` lines shared by every onboarding command.
pub fn write_next(w: &mut dyn Write, state: &OnboardingState) -> io::Result<()> {
    pretty_kv(w, "next", state.label())?;
    pretty_kv(w, "run", next_command(state))
}
