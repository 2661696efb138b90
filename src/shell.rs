use std::io::{self, BufRead, Write};

use tracing::{debug, info};

use crate::calendar;
use crate::command::{self, Command, Direction};
use crate::kv::KvStore;
use crate::model::*;
use crate::observability::command_label;
use crate::store::{AssignmentStore, StoreError};
use crate::timescale::TimescaleEngine;

/// Whether the read loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The timescale and the store, driven together by one UI loop.
pub struct Board<K: KvStore> {
    pub timescale: TimescaleEngine,
    pub store: AssignmentStore<K>,
}

impl<K: KvStore> Board<K> {
    pub fn new(timescale: TimescaleEngine, store: AssignmentStore<K>) -> Self {
        Self { timescale, store }
    }

    /// Run one command, writing its text result to `out`. Board errors are
    /// reported on `out`; only I/O errors on `out` itself are returned.
    pub fn execute(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<Flow> {
        let label = command_label(&cmd);
        let mut status = "ok";
        match cmd {
            Command::Help => writeln!(out, "{}", command::HELP)?,
            Command::Resources => {
                for r in self.store.resources() {
                    let count = self.store.list_by_resource(&r.id).len();
                    writeln!(out, "{}  {}  ({count} work orders)", r.id, r.name)?;
                }
            }
            Command::List { resource_id } => {
                let orders: Vec<&Assignment> = match &resource_id {
                    Some(rid) => self.store.list_by_resource(rid),
                    None => self.store.assignments().iter().collect(),
                };
                if orders.is_empty() {
                    writeln!(out, "no work orders")?;
                }
                for a in orders {
                    writeln!(out, "{}", format_assignment(a))?;
                }
            }
            Command::Show { id } => match self.store.assignment(&id) {
                Some(a) => {
                    writeln!(out, "{}", format_assignment(a))?;
                    writeln!(out, "  {}", self.bar_summary(a))?;
                }
                None => {
                    status = "error";
                    writeln!(out, "error: {}", StoreError::NotFound(id))?;
                }
            },
            Command::Create { data } => match self.store.create(data) {
                Ok(id) => writeln!(out, "ok {id}")?,
                Err(e) => {
                    status = "error";
                    write_outcome(out, Outcome::failed(e))?;
                }
            },
            Command::Update { id, data } => {
                let outcome = Outcome::from(self.store.update(&id, data));
                if !outcome.success {
                    status = "error";
                }
                write_outcome(out, outcome)?;
            }
            Command::Delete { id } => match self.store.delete(&id) {
                Ok(true) => writeln!(out, "ok")?,
                Ok(false) => writeln!(out, "ok (no such work order)")?,
                Err(e) => {
                    status = "error";
                    writeln!(out, "error: {e}")?;
                }
            },
            Command::Check {
                resource_id,
                start,
                end,
                exclude,
            } => {
                let name = match &exclude {
                    Some(id) => self.store.assignment(id).map(|a| a.data.name.clone()),
                    None => None,
                };
                let candidate = AssignmentData {
                    name: name.unwrap_or_else(|| "candidate".to_string()),
                    resource_id,
                    status: Status::Open,
                    start_date: start,
                    end_date: end,
                };
                let outcome = Outcome::from(self.store.check_overlap(&candidate, exclude.as_ref()));
                if !outcome.success {
                    status = "error";
                }
                write_outcome(out, outcome)?;
            }
            Command::Scale { granularity } => {
                self.timescale.set_granularity(granularity);
                writeln!(out, "{granularity} view, {} columns", self.timescale.total_columns())?;
            }
            Command::Today => {
                self.timescale.center_on_today();
                writeln!(
                    out,
                    "centered on {}: {} .. {}",
                    calendar::to_iso(self.timescale.today()),
                    calendar::to_iso(self.timescale.view_start()),
                    calendar::to_iso(self.timescale.view_end())
                )?;
            }
            Command::Columns => {
                let header: Vec<String> = self
                    .timescale
                    .columns()
                    .map(|c| if c.is_current_period { format!("*{}*", c.label) } else { c.label })
                    .collect();
                writeln!(out, "{}", header.join(" | "))?;
                writeln!(
                    out,
                    "{} columns x {}px, today at {:.1}px",
                    self.timescale.total_columns(),
                    self.timescale.column_width(),
                    self.timescale.today_position()
                )?;
            }
            Command::At { offset_x } => {
                writeln!(out, "{}", calendar::to_iso(self.timescale.date_at(offset_x)))?;
            }
            Command::Expand { direction } => match direction {
                Direction::Past => {
                    let added = self.timescale.expand_past();
                    writeln!(
                        out,
                        "added {added} columns before {}; scroll right by {:.1}px",
                        calendar::to_iso(self.timescale.view_start()),
                        self.timescale.scroll_compensation(added)
                    )?;
                }
                Direction::Future => {
                    let added = self.timescale.expand_future();
                    writeln!(
                        out,
                        "added {added} columns through {}",
                        calendar::to_iso(self.timescale.view_end())
                    )?;
                }
            },
            Command::Quit => {
                metrics::counter!(crate::observability::COMMANDS_TOTAL, "command" => label, "status" => status)
                    .increment(1);
                return Ok(Flow::Quit);
            }
        }
        metrics::counter!(crate::observability::COMMANDS_TOTAL, "command" => label, "status" => status).increment(1);
        Ok(Flow::Continue)
    }

    fn bar_summary(&self, a: &Assignment) -> String {
        let (first, last) = self.timescale.visible_range();
        let visible = a.data.start_date <= last && a.data.end_date >= first;
        format!(
            "{} to {} ({} days), left {:.1}px, width {:.1}px{}",
            calendar::display_date(a.data.start_date),
            calendar::display_date(a.data.end_date),
            a.span().days(),
            self.timescale.bar_left(a.data.start_date),
            self.timescale.bar_width(a.data.start_date, a.data.end_date),
            if visible { "" } else { " (outside window)" }
        )
    }
}

fn format_assignment(a: &Assignment) -> String {
    format!(
        "{}  {}  {}  [{}]  {}",
        a.id,
        a.data.resource_id,
        a.span(),
        a.data.status.label(),
        a.data.name
    )
}

fn write_outcome(out: &mut impl Write, outcome: Outcome) -> io::Result<()> {
    match outcome.error {
        None => writeln!(out, "ok"),
        Some(e) => writeln!(out, "error: {e}"),
    }
}

/// Read commands line by line until EOF or `quit`. `prompt` is written
/// before each line; pass `""` for scripted input. Lines that are not
/// UTF-8 are reported and skipped.
pub fn run<K: KvStore>(
    board: &mut Board<K>,
    mut input: impl BufRead,
    mut out: impl Write,
    prompt: &str,
) -> io::Result<()> {
    info!("board shell started");
    let mut buf = Vec::new();
    loop {
        if !prompt.is_empty() {
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                debug!("skipping undecodable input line: {e}");
                writeln!(out, "error: input is not valid UTF-8: {e}")?;
                out.flush()?;
                continue;
            }
        };
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match command::parse_command(line) {
            Ok(cmd) => {
                debug!(command = command_label(&cmd), "executing");
                if board.execute(cmd, &mut out)? == Flow::Quit {
                    break;
                }
            }
            Err(e) => writeln!(out, "error: {e}")?,
        }
        out.flush()?;
    }
    info!("board shell stopped");
    Ok(())
}
