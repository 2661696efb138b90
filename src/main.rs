use std::io::{self, IsTerminal};

use tracing::info;

use workboard::calendar::{Clock, LocalClock};
use workboard::config::Config;
use workboard::kv::FileKv;
use workboard::shell::{self, Board};
use workboard::store::AssignmentStore;
use workboard::timescale::TimescaleEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let config = Config::from_env();
    workboard::observability::init(config.metrics_port)?;

    let kv = FileKv::open(&config.data_dir)?;
    let data_dir = kv.dir().display().to_string();
    let today = LocalClock.today();
    let store = AssignmentStore::open(kv, today, config.overlap_rule)?;
    let timescale = TimescaleEngine::new(config.timescale, LocalClock);

    info!("workboard ready");
    info!("  data_dir: {data_dir}");
    info!("  overlap rule: {:?}", store.rule());
    let window = timescale.config();
    info!(
        "  timescale: {} view, {} columns, expand by {}, min bar {}px",
        timescale.granularity(),
        window.initial_columns,
        window.expand_buffer,
        window.min_bar_width
    );
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let mut board = Board::new(timescale, store);
    let stdin = io::stdin();
    let prompt = if stdin.is_terminal() { "workboard> " } else { "" };
    shell::run(&mut board, stdin.lock(), io::stdout().lock(), prompt)?;

    info!("workboard stopped");
    Ok(())
}
