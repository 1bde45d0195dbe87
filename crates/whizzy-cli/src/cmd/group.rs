//! `wz group ...`: create, configure, join, list, select, rotate-code.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::io::{self, Write};

use super::{Context, NextStep, write_next};
use crate::output::{Renderable, pretty_kv, render, render_list};
use whizzy_core::groups;
use whizzy_core::model::{Group, GroupId};
use whizzy_core::session;

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    #[command(
        about = "Create a group",
        long_about = "Create a group with you as its only member and a fresh invite code.",
        after_help = "EXAMPLES:\n    # Start a new household\n    wz group create"
    )]
    Create,

    #[command(
        about = "Name the group and pick its week-start day",
        after_help = "EXAMPLES:\n    # Set name and first day of the week\n    wz group configure --name \"Casa Ana\" --week-start Lunes"
    )]
    Configure(ConfigureArgs),

    #[command(
        about = "Join a group by invite code",
        after_help = "EXAMPLES:\n    # Join with a code shared by a member\n    wz group join k3x9qa"
    )]
    Join(JoinArgs),

    #[command(
        about = "List your groups",
        long_about = "List groups you belong to. Groups that were never finished (no name, \
                      no week-start day or no tasks) are deleted on the way.",
        after_help = "EXAMPLES:\n    # List existing groups\n    wz group list\n\n    # Emit machine-readable output\n    wz group list --json"
    )]
    List,

    #[command(
        about = "Switch to one of your groups",
        after_help = "EXAMPLES:\n    # Make a group current\n    wz group select Xq3Lh0bT2mPz8sKd1VwA"
    )]
    Select(SelectArgs),

    #[command(
        about = "Issue a new invite code",
        long_about = "Replace the current group's invite code. Codes shared earlier stop working.",
        after_help = "EXAMPLES:\n    # Rotate the invite code\n    wz group rotate-code"
    )]
    RotateCode,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Group name.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Week-start day (Lunes, Martes, Miércoles, Jueves, Viernes, Sábado, Domingo).
    #[arg(long)]
    pub week_start: Option<String>,
}

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Invite code.
    #[arg(default_value = "")]
    pub code: String,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Group id, as shown by `wz group list`.
    pub group_id: String,
}

/// A group as printed by the group commands.
#[derive(Debug, Serialize)]
struct GroupRow {
    id: String,
    name: String,
    invite_code: String,
    week_start: Option<String>,
    members: usize,
    tasks: usize,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.display_name().to_string(),
            invite_code: group.invite_code.clone(),
            week_start: group.week_start.map(|d| d.as_str().to_string()),
            members: group.members.len(),
            tasks: group.tasks.len(),
        }
    }
}

impl GroupRow {
    fn write_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_kv(w, "group", &self.name)?;
        pretty_kv(w, "id", &self.id)?;
        pretty_kv(w, "invite code", &self.invite_code)?;
        pretty_kv(w, "week start", self.week_start.as_deref().unwrap_or("-"))?;
        pretty_kv(w, "members", self.members.to_string())?;
        pretty_kv(w, "tasks", self.tasks.to_string())
    }
}

impl Renderable for GroupRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        self.write_human(w)?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id,
            self.name,
            self.invite_code,
            self.week_start.as_deref().unwrap_or("-"),
            self.members
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "NAME", "CODE", "WEEK_START", "MEMBERS"]
    }
}

#[derive(Debug, Serialize)]
struct GroupOutput {
    group: GroupRow,
    #[serde(flatten)]
    step: NextStep,
    #[serde(skip)]
    state: session::OnboardingState,
}

pub fn run(command: &GroupCommand, ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let group = match command {
        GroupCommand::Create => groups::create_group(ctx.backend, &user.id)?,
        GroupCommand::Configure(args) => {
            let (name, week_start) =
                groups::parse_group_settings(&args.name, args.week_start.as_deref())?;
            groups::configure_group(ctx.backend, &user.id, &name, Some(week_start))?
        }
        GroupCommand::Join(args) => groups::join_by_code(ctx.backend, &user.id, &args.code)?,
        GroupCommand::Select(args) => {
            groups::select_group(ctx.backend, &user.id, &GroupId::new(args.group_id.trim()))?
        }
        GroupCommand::RotateCode => groups::rotate_invite_code(ctx.backend, &user.id)?,
        GroupCommand::List => {
            let listed = groups::list_and_prune_user_groups(ctx.backend, &user.id)?;
            let rows: Vec<GroupRow> = listed.iter().map(GroupRow::from).collect();
            if rows.is_empty() && !ctx.output.is_json() {
                println!("No tienes grupos. Crea uno con `wz group create` o únete con `wz group join`.");
                return Ok(());
            }
            render_list(&rows, ctx.output)?;
            return Ok(());
        }
    };

    let state = session::resolve(ctx.backend)?;
    let output = GroupOutput {
        group: GroupRow::from(&group),
        step: NextStep::from(&state),
        state,
    };
    render(ctx.output, &output, |o, w| {
        o.group.write_human(w)?;
        write_next(w, &o.state)
    })
}
