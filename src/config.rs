use std::path::PathBuf;
use std::str::FromStr;

use crate::limits::{MAX_EXPAND_BUFFER, MAX_INITIAL_COLUMNS};
use crate::model::BoundaryRule;
use crate::timescale::{ColumnWidths, TimescaleConfig};

/// Process configuration, read from `WORKBOARD_*` environment variables.
/// Missing or unparseable values fall back to the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub metrics_port: Option<u16>,
    pub overlap_rule: BoundaryRule,
    pub timescale: TimescaleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            metrics_port: None,
            overlap_rule: BoundaryRule::default(),
            timescale: TimescaleConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any `key -> value` source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let parsed = |key: &str| -> Option<String> { lookup(key).map(|v| v.trim().to_string()) };

        let column_width = parse(&parsed, "WORKBOARD_COLUMN_WIDTH")
            .filter(|w: &f64| *w > 0.0)
            .unwrap_or(ColumnWidths::DEFAULT_WIDTH);
        let width_for = |key: &str| {
            parse(&parsed, key)
                .filter(|w: &f64| *w > 0.0)
                .unwrap_or(column_width)
        };

        let timescale = TimescaleConfig {
            initial_columns: parse(&parsed, "WORKBOARD_INITIAL_COLUMNS")
                .filter(|n: &u32| *n > 0)
                .map(|n| n.min(MAX_INITIAL_COLUMNS))
                .unwrap_or(defaults.timescale.initial_columns),
            expand_buffer: parse(&parsed, "WORKBOARD_EXPAND_BUFFER")
                .filter(|n: &u32| *n > 0)
                .map(|n| n.min(MAX_EXPAND_BUFFER))
                .unwrap_or(defaults.timescale.expand_buffer),
            min_bar_width: parse(&parsed, "WORKBOARD_MIN_BAR_WIDTH")
                .filter(|w: &f64| *w >= 0.0)
                .unwrap_or(defaults.timescale.min_bar_width),
            column_widths: ColumnWidths {
                day: width_for("WORKBOARD_DAY_COLUMN_WIDTH"),
                week: width_for("WORKBOARD_WEEK_COLUMN_WIDTH"),
                month: width_for("WORKBOARD_MONTH_COLUMN_WIDTH"),
            },
        };

        Self {
            data_dir: parsed("WORKBOARD_DATA_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            metrics_port: parse(&parsed, "WORKBOARD_METRICS_PORT"),
            overlap_rule: parse(&parsed, "WORKBOARD_OVERLAP_RULE").unwrap_or(defaults.overlap_rule),
            timescale,
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let c = config(&[
            ("WORKBOARD_DATA_DIR", "/var/lib/workboard"),
            ("WORKBOARD_METRICS_PORT", "9100"),
            ("WORKBOARD_OVERLAP_RULE", "inclusive"),
            ("WORKBOARD_INITIAL_COLUMNS", "30"),
            ("WORKBOARD_EXPAND_BUFFER", "10"),
            ("WORKBOARD_MIN_BAR_WIDTH", "40"),
            ("WORKBOARD_COLUMN_WIDTH", "110"),
            ("WORKBOARD_DAY_COLUMN_WIDTH", "120"),
        ]);
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/workboard"));
        assert_eq!(c.metrics_port, Some(9100));
        assert_eq!(c.overlap_rule, BoundaryRule::Inclusive);
        assert_eq!(c.timescale.initial_columns, 30);
        assert_eq!(c.timescale.expand_buffer, 10);
        assert_eq!(c.timescale.min_bar_width, 40.0);
        assert_eq!(c.timescale.column_widths.day, 120.0);
        assert_eq!(c.timescale.column_widths.week, 110.0);
        assert_eq!(c.timescale.column_widths.month, 110.0);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let c = config(&[
            ("WORKBOARD_METRICS_PORT", "ninety"),
            ("WORKBOARD_OVERLAP_RULE", "sometimes"),
            ("WORKBOARD_INITIAL_COLUMNS", "0"),
            ("WORKBOARD_COLUMN_WIDTH", "-5"),
            ("WORKBOARD_DATA_DIR", "  "),
        ]);
        assert_eq!(c, Config::default());
    }

    #[test]
    fn window_sizes_are_capped() {
        let c = config(&[
            ("WORKBOARD_INITIAL_COLUMNS", "4000000000"),
            ("WORKBOARD_EXPAND_BUFFER", "4000000000"),
        ]);
        assert_eq!(c.timescale.initial_columns, MAX_INITIAL_COLUMNS);
        assert_eq!(c.timescale.expand_buffer, MAX_EXPAND_BUFFER);
    }
}
