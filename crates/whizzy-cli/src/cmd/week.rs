//! `wz week`: the home screen.
//!
//! Done marks given with `--done` only apply to this invocation. They are
//! never written back to the group.

use clap::Args;
use serde::Serialize;
use std::io::Write;

use super::Context;
use crate::output::{pretty_kv, pretty_rule, render};
use whizzy_core::model::Weekday;
use whizzy_core::session;
use whizzy_core::weekly::{WeeklyEntry, load_week, parse_day};

#[derive(Args, Debug)]
pub struct WeekArgs {
    /// Day to show (e.g. Miércoles). Defaults to the group's week-start day.
    #[arg(long)]
    pub day: Option<String>,

    /// Mark a chore as done for this view. Repeat for several chores.
    #[arg(long = "done", value_name = "ID")]
    pub done: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WeekOutput<'a> {
    group_id: String,
    group: String,
    day: &'static str,
    days: Vec<&'static str>,
    tasks: Vec<WeeklyEntry<'a>>,
}

pub fn run(args: &WeekArgs, ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let day = args.day.as_deref().map(parse_day).transpose()?;
    let (group, mut view) = load_week(ctx.backend, &user.id)?;
    if let Some(day) = day {
        view.select_day(day);
    }
    for id in &args.done {
        if !view.is_done(id) {
            view.toggle_done(id);
        }
    }

    let output = WeekOutput {
        group_id: group.id.to_string(),
        group: group.display_name().to_string(),
        day: view.day().as_str(),
        days: Weekday::ALL.iter().map(|d| d.as_str()).collect(),
        tasks: view.entries(&group.tasks),
    };
    render(ctx.output, &output, |o, w| {
        pretty_kv(w, "group", &o.group)?;
        let strip: Vec<String> = Weekday::ALL
            .iter()
            .map(|d| {
                if d.as_str() == o.day {
                    format!("[{}]", d.short())
                } else {
                    d.short().to_string()
                }
            })
            .collect();
        writeln!(w, "{}", strip.join(" "))?;
        pretty_rule(w)?;
        if o.tasks.is_empty() {
            writeln!(w, "No hay tareas para {}.", o.day)?;
        }
        for entry in &o.tasks {
            let mark = if entry.done { "x" } else { " " };
            writeln!(
                w,
                "[{mark}] {:<32} {:>3} pts",
                entry.task.title, entry.task.points
            )?;
        }
        Ok(())
    })
}
