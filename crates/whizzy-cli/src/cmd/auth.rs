//! `wz signup`, `wz login`, `wz logout`, `wz status`.

use clap::Args;
use serde::Serialize;

use super::{Context, NextStep, write_next};
use crate::output::{pretty_kv, render};
use whizzy_core::session::{self, OnboardingState};

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    /// Account email.
    #[arg(long, default_value = "")]
    pub email: String,

    /// Account password.
    #[arg(long, default_value = "")]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthOutput {
    user_id: Option<String>,
    email: Option<String>,
    #[serde(flatten)]
    step: NextStep,
    #[serde(skip)]
    state: OnboardingState,
}

fn print(ctx: &Context<'_>, output: &AuthOutput) -> anyhow::Result<()> {
    render(ctx.output, output, |o, w| {
        if let Some(email) = &o.email {
            pretty_kv(w, "signed in", email)?;
        } else {
            pretty_kv(w, "signed in", "-")?;
        }
        write_next(w, &o.state)
    })
}

/// Create an account; the next step is always profile setup.
pub fn run_signup(args: &CredentialsArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let (user, state) = session::sign_up(ctx.backend, &args.email, &args.password)?;
    print(
        ctx,
        &AuthOutput {
            user_id: Some(user.id.to_string()),
            email: Some(user.email),
            step: NextStep::from(&state),
            state,
        },
    )
}

/// Sign in and report where the user resumes.
pub fn run_login(args: &CredentialsArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let signed_in = session::sign_in(ctx.backend, &args.email, &args.password)?;
    let state = signed_in.state();
    print(
        ctx,
        &AuthOutput {
            user_id: Some(signed_in.user.id.to_string()),
            email: Some(signed_in.user.email),
            step: NextStep::from(&state),
            state,
        },
    )
}

pub fn run_logout(ctx: &Context<'_>) -> anyhow::Result<()> {
    session::sign_out(ctx.backend)?;
    let state = OnboardingState::SignedOut;
    print(
        ctx,
        &AuthOutput {
            user_id: None,
            email: None,
            step: NextStep::from(&state),
            state,
        },
    )
}

/// Who is signed in and which screen they are on.
pub fn run_status(ctx: &Context<'_>) -> anyhow::Result<()> {
    let current = session::current(ctx.backend)?;
    let output = match current {
        Some(session) => {
            let state = session.state();
            AuthOutput {
                user_id: Some(session.user.id.to_string()),
                email: Some(session.user.email),
                step: NextStep::from(&state),
                state,
            }
        }
        None => {
            let state = OnboardingState::SignedOut;
            AuthOutput {
                user_id: None,
                email: None,
                step: NextStep::from(&state),
                state,
            }
        }
    };
    print(ctx, &output)
}
