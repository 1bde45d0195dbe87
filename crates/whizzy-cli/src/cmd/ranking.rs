//! `wz ranking`: the group's points table.

use serde::Serialize;
use std::io::{self, Write};

use super::Context;
use crate::output::{Renderable, render_list};
use whizzy_core::points::{self, Mood, RankingEntry};
use whizzy_core::session;

#[derive(Debug, Serialize)]
struct RankingRow {
    position: usize,
    user_id: String,
    name: String,
    avatar: u8,
    points: u32,
    mood: Mood,
}

impl RankingRow {
    fn new(position: usize, entry: &RankingEntry) -> Self {
        Self {
            position,
            user_id: entry.user_id.to_string(),
            name: entry.name.clone(),
            avatar: entry.avatar,
            points: entry.points,
            mood: entry.mood,
        }
    }
}

impl Renderable for RankingRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:>2}. {:<24} {:>4} pts  {}",
            self.position,
            self.name,
            self.points,
            self.mood.label()
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.position,
            self.name,
            self.points,
            self.mood.label()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["POS", "NAME", "POINTS", "MOOD"]
    }
}

pub fn run(ctx: &Context<'_>) -> anyhow::Result<()> {
    let user = session::require_user(ctx.backend)?;
    let rows: Vec<RankingRow> = points::ranking(ctx.backend, &user.id)?
        .iter()
        .enumerate()
        .map(|(i, entry)| RankingRow::new(i + 1, entry))
        .collect();
    render_list(&rows, ctx.output)?;
    Ok(())
}
