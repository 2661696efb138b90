use std::net::SocketAddr;

use crate::command::Command;

// ── Store metrics ───────────────────────────────────────────────

/// Counter: work orders created.
pub const ASSIGNMENTS_CREATED_TOTAL: &str = "workboard_assignments_created_total";

/// Counter: work orders replaced through `update`.
pub const ASSIGNMENTS_UPDATED_TOTAL: &str = "workboard_assignments_updated_total";

/// Counter: work orders removed.
pub const ASSIGNMENTS_DELETED_TOTAL: &str = "workboard_assignments_deleted_total";

/// Counter: rejected create/update calls. Labels: reason.
pub const ASSIGNMENTS_REJECTED_TOTAL: &str = "workboard_assignments_rejected_total";

/// Counter: restores that fell back to the seed dataset.
pub const STORE_RESEEDS_TOTAL: &str = "workboard_store_reseeds_total";

/// Histogram: time to serialize and write a collection, in seconds.
pub const PERSIST_DURATION_SECONDS: &str = "workboard_persist_duration_seconds";

// ── Timescale metrics ───────────────────────────────────────────

/// Counter: window expansions. Labels: direction.
pub const WINDOW_EXPANSIONS_TOTAL: &str = "workboard_window_expansions_total";

/// Counter: granularity switches. Labels: granularity.
pub const GRANULARITY_CHANGES_TOTAL: &str = "workboard_granularity_changes_total";

// ── Shell metrics ───────────────────────────────────────────────

/// Counter: shell commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "workboard_commands_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Help => "help",
        Command::Resources => "resources",
        Command::List { .. } => "list",
        Command::Show { .. } => "show",
        Command::Create { .. } => "create",
        Command::Update { .. } => "update",
        Command::Delete { .. } => "delete",
        Command::Check { .. } => "check",
        Command::Scale { .. } => "scale",
        Command::Today => "today",
        Command::Columns => "columns",
        Command::At { .. } => "at",
        Command::Expand { .. } => "expand",
        Command::Quit => "quit",
    }
}
