//! `wz profile setup` and `wz profile show`.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};

use super::{Context, NextStep, write_next};
use crate::output::{pretty_kv, pretty_section, render};
use whizzy_core::groups::{self, GroupSummary, ProfileOverview};
use whizzy_core::session::{self, OnboardingState};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    #[command(
        about = "Set display name and avatar",
        after_help = "EXAMPLES:\n    # Finish profile setup\n    wz profile setup --name Ana --avatar 2"
    )]
    Setup(SetupArgs),

    #[command(
        about = "Show profile and groups",
        after_help = "EXAMPLES:\n    # Show profile, current group and invite code\n    wz profile show"
    )]
    Show,
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Display name.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Avatar index (0-15).
    #[arg(long)]
    pub avatar: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SetupOutput {
    name: String,
    avatar: Option<u32>,
    #[serde(flatten)]
    step: NextStep,
    #[serde(skip)]
    state: OnboardingState,
}

pub fn run(command: &ProfileCommand, ctx: &Context<'_>) -> anyhow::Result<()> {
    match command {
        ProfileCommand::Setup(args) => run_setup(args, ctx),
        ProfileCommand::Show => run_show(ctx),
    }
}

fn run_setup(args: &SetupArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let state = session::complete_profile(ctx.backend, &user.id, &args.name, args.avatar)?;
    let output = SetupOutput {
        name: args.name.trim().to_string(),
        avatar: args.avatar,
        step: NextStep::from(&state),
        state,
    };
    render(ctx.output, &output, |o, w| {
        pretty_kv(w, "name", &o.name)?;
        pretty_kv(w, "avatar", o.avatar.map(|a| a.to_string()).unwrap_or_default())?;
        write_next(w, &o.state)
    })
}

fn write_group(w: &mut dyn Write, group: &GroupSummary) -> io::Result<()> {
    pretty_kv(w, "group", &group.name)?;
    pretty_kv(w, "id", group.id.as_str())?;
    pretty_kv(w, "invite code", &group.invite_code)?;
    pretty_kv(w, "members", group.members.to_string())
}

fn run_show(ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let overview: ProfileOverview = groups::profile_overview(ctx.backend, &user.id)?;
    render(ctx.output, &overview, |o, w| {
        pretty_section(w, "Perfil")?;
        pretty_kv(w, "name", &o.name)?;
        pretty_kv(w, "email", &o.email)?;
        pretty_kv(w, "avatar", o.avatar.to_string())?;
        writeln!(w)?;
        pretty_section(w, "Grupo actual")?;
        match &o.current_group {
            Some(group) => write_group(w, group)?,
            None => writeln!(w, "No estás en ningún grupo actualmente.")?,
        }
        if !o.other_groups.is_empty() {
            writeln!(w)?;
            pretty_section(w, "Otros grupos")?;
            for group in &o.other_groups {
                write_group(w, group)?;
            }
        }
        Ok(())
    })
}
