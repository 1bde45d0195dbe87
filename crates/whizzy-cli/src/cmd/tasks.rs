//! `wz tasks catalog` and `wz tasks schedule`.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};

use super::{Context, NextStep, write_next};
use crate::output::{OutputMode, Renderable, pretty_kv, pretty_section, render, render_list};
use whizzy_core::catalog::{CatalogMode, SIMPLE_SECTIONS};
use whizzy_core::groups;
use whizzy_core::model::{CatalogTask, ScheduledTask};
use whizzy_core::selection::{TaskSelection, submit_selection};
use whizzy_core::session::{self, OnboardingState};
use whizzy_core::weekly::parse_day;

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    #[command(
        about = "Show the chore catalog",
        long_about = "Show the chore catalog. `simple` groups chores by room, `detailed` is one flat list.",
        after_help = "EXAMPLES:\n    # Chores grouped by room\n    wz tasks catalog\n\n    # The detailed list\n    wz tasks catalog --mode detailed"
    )]
    Catalog(CatalogArgs),

    #[command(
        about = "Replace the group's chores with a selection",
        long_about = "Replace the current group's task list with the given chores, all on one day. \
                      Chores scheduled earlier are dropped. The day defaults to the group's \
                      week-start day.",
        after_help = "EXAMPLES:\n    # Dishes and laundry on the group's first day\n    wz tasks schedule 1 7\n\n    # Same chores on Martes\n    wz tasks schedule --day Martes 1 7"
    )]
    Schedule(ScheduleArgs),
}

/// Catalog tab, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    #[default]
    Simple,
    Detailed,
}

impl From<ModeArg> for CatalogMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simple => Self::Simple,
            ModeArg::Detailed => Self::Detailed,
        }
    }
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Which catalog to show.
    #[arg(long, value_enum, default_value_t = ModeArg::Simple)]
    pub mode: ModeArg,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Day the chores go on (e.g. Lunes). Defaults to the group's week-start day.
    #[arg(long)]
    pub day: Option<String>,

    /// Catalog ids to schedule.
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CatalogRow {
    id: &'static str,
    title: &'static str,
    points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'static str>,
}

impl CatalogRow {
    const fn new(task: &CatalogTask, section: Option<&'static str>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            points: task.points,
            section,
        }
    }
}

impl Renderable for CatalogRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "  {:>3}  {:<32} {:>3} pts", self.id, self.title, self.points)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.id,
            self.title,
            self.points,
            self.section.unwrap_or("-")
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "TITLE", "POINTS", "SECTION"]
    }
}

fn catalog_rows(mode: CatalogMode) -> Vec<CatalogRow> {
    match mode {
        CatalogMode::Simple => SIMPLE_SECTIONS
            .iter()
            .flat_map(|section| {
                section
                    .tasks
                    .iter()
                    .map(|task| CatalogRow::new(task, Some(section.title)))
            })
            .collect(),
        CatalogMode::Detailed => mode
            .tasks()
            .into_iter()
            .map(|task| CatalogRow::new(task, None))
            .collect(),
    }
}

#[derive(Debug, Serialize)]
struct ScheduleOutput {
    group_id: String,
    day: &'static str,
    tasks: Vec<ScheduledTask>,
    #[serde(flatten)]
    step: NextStep,
    #[serde(skip)]
    state: OnboardingState,
}

pub fn run(command: &TasksCommand, ctx: &Context<'_>) -> anyhow::Result<()> {
    match command {
        TasksCommand::Catalog(args) => run_catalog(args, ctx),
        TasksCommand::Schedule(args) => run_schedule(args, ctx),
    }
}

fn run_catalog(args: &CatalogArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let rows = catalog_rows(args.mode.into());
    if ctx.output != OutputMode::Pretty {
        render_list(&rows, ctx.output)?;
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut current_section = None;
    for row in &rows {
        if row.section != current_section {
            if current_section.is_some() {
                writeln!(out)?;
            }
            if let Some(title) = row.section {
                pretty_section(&mut out, title)?;
            }
            current_section = row.section;
        }
        row.render_human(&mut out)?;
    }
    Ok(())
}

fn run_schedule(args: &ScheduleArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let explicit_day = args.day.as_deref().map(parse_day).transpose()?;

    let mut selection = TaskSelection::new(explicit_day.unwrap_or_default());
    for id in &args.ids {
        let id = id.trim();
        if !selection.is_selected(id) {
            selection.toggle(id);
        }
    }
    // Reject bad input before touching the group.
    selection.to_scheduled()?;

    if explicit_day.is_none() {
        let group = groups::active_group(ctx.backend, &user.id)?;
        selection.day = group.week_start.unwrap_or_default();
    }

    let group = submit_selection(ctx.backend, &user.id, &selection)?;
    let state = session::resolve(ctx.backend)?;
    let output = ScheduleOutput {
        group_id: group.id.to_string(),
        day: selection.day.as_str(),
        tasks: group.tasks,
        step: NextStep::from(&state),
        state,
    };
    render(ctx.output, &output, |o, w| {
        pretty_kv(w, "day", o.day)?;
        pretty_kv(w, "scheduled", o.tasks.len().to_string())?;
        for task in &o.tasks {
            writeln!(w, "  {:>3}  {}", task.id, task.title)?;
        }
        write_next(w, &o.state)
    })
}

#[cfg(test)]
mod tests {
    use super::catalog_rows;
    use whizzy_core::catalog::CatalogMode;

    #[test]
    fn simple_rows_carry_their_room() {
        let rows = catalog_rows(CatalogMode::Simple);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.section.is_some()));
        assert_eq!(rows[0].section, Some("Cocina"));
    }

    #[test]
    fn detailed_rows_have_no_room() {
        let rows = catalog_rows(CatalogMode::Detailed);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.section.is_none()));
    }
}
