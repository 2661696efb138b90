use chrono::NaiveDate;

use crate::calendar;
use crate::limits::MAX_COMMAND_LEN;
use crate::model::*;
use crate::timescale::Granularity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Past,
    Future,
}

/// Parsed board shell command.
#[derive(Debug, PartialEq)]
pub enum Command {
    Help,
    Resources,
    List {
        resource_id: Option<ResourceId>,
    },
    Show {
        id: AssignmentId,
    },
    Create {
        data: AssignmentData,
    },
    Update {
        id: AssignmentId,
        data: AssignmentData,
    },
    Delete {
        id: AssignmentId,
    },
    Check {
        resource_id: ResourceId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<AssignmentId>,
    },
    Scale {
        granularity: Granularity,
    },
    Today,
    Columns,
    At {
        offset_x: f64,
    },
    Expand {
        direction: Direction,
    },
    Quit,
}

pub const HELP: &str = "\
commands:
  resources                                         list work centers
  list [resource_id]                                list work orders
  show <id>                                         one work order with bar geometry
  create <resource_id> <start> <end> <status> <name...>
  update <id> <resource_id> <start> <end> <status> <name...>
  delete <id>
  check <resource_id> <start> <end> [exclude_id]    overlap check without saving
  scale <day|week|month>
  today                                             re-center on today
  columns                                           print the timescale header
  at <offset_x>                                     date under a pixel offset
  expand <past|future>
  quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    if line.len() > MAX_COMMAND_LEN {
        return Err(CommandError::TooLong);
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((keyword, args)) = tokens.split_first() else {
        return Err(CommandError::Empty);
    };

    match keyword.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "resources" => Ok(Command::Resources),
        "list" => Ok(Command::List {
            resource_id: args.first().map(|s| ResourceId::from(*s)),
        }),
        "show" => {
            arity("show", args, 1)?;
            Ok(Command::Show {
                id: AssignmentId::from(args[0]),
            })
        }
        "create" => {
            arity("create", args, 5)?;
            Ok(Command::Create {
                data: parse_data(args)?,
            })
        }
        "update" => {
            arity("update", args, 6)?;
            Ok(Command::Update {
                id: AssignmentId::from(args[0]),
                data: parse_data(&args[1..])?,
            })
        }
        "delete" => {
            arity("delete", args, 1)?;
            Ok(Command::Delete {
                id: AssignmentId::from(args[0]),
            })
        }
        "check" => {
            arity("check", args, 3)?;
            Ok(Command::Check {
                resource_id: ResourceId::from(args[0]),
                start: parse_date(args[1])?,
                end: parse_date(args[2])?,
                exclude: args.get(3).map(|s| AssignmentId::from(*s)),
            })
        }
        "scale" => {
            arity("scale", args, 1)?;
            let granularity = args[0].parse().map_err(CommandError::Parse)?;
            Ok(Command::Scale { granularity })
        }
        "today" => Ok(Command::Today),
        "columns" => Ok(Command::Columns),
        "at" => {
            arity("at", args, 1)?;
            let offset_x: f64 = args[0]
                .parse()
                .map_err(|_| CommandError::Parse(format!("expected pixel offset, got {:?}", args[0])))?;
            if !offset_x.is_finite() {
                return Err(CommandError::Parse(format!("offset must be finite, got {offset_x}")));
            }
            Ok(Command::At { offset_x })
        }
        "expand" => {
            arity("expand", args, 1)?;
            let direction = match args[0].to_ascii_lowercase().as_str() {
                "past" | "left" => Direction::Past,
                "future" | "right" => Direction::Future,
                other => return Err(CommandError::Parse(format!("expected past or future, got {other:?}"))),
            };
            Ok(Command::Expand { direction })
        }
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// `<resource_id> <start> <end> <status> <name...>`
fn parse_data(args: &[&str]) -> Result<AssignmentData, CommandError> {
    Ok(AssignmentData {
        resource_id: ResourceId::from(args[0]),
        start_date: parse_date(args[1])?,
        end_date: parse_date(args[2])?,
        status: args[3].parse().map_err(CommandError::Parse)?,
        name: args[4..].join(" "),
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, CommandError> {
    calendar::parse_iso(s).ok_or_else(|| CommandError::Parse(format!("expected YYYY-MM-DD, got {s:?}")))
}

fn arity(command: &'static str, args: &[&str], min: usize) -> Result<(), CommandError> {
    if args.len() < min {
        return Err(CommandError::WrongArity(command, min, args.len()));
    }
    Ok(())
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
pub enum CommandError {
    Parse(String),
    Empty,
    TooLong,
    Unknown(String),
    WrongArity(&'static str, usize, usize),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Parse(s) => write!(f, "parse error: {s}"),
            CommandError::Empty => write!(f, "empty command"),
            CommandError::TooLong => write!(f, "command longer than {MAX_COMMAND_LEN} bytes"),
            CommandError::Unknown(c) => write!(f, "unknown command: {c} (try `help`)"),
            CommandError::WrongArity(c, expected, got) => {
                write!(f, "{c}: expected at least {expected} arguments, got {got}")
            }
        }
    }
}

impl std::error::Error for CommandError {}
