/// Max bytes in a work order name.
pub const MAX_NAME_LEN: usize = 256;

/// Max work orders across the whole board.
pub const MAX_ASSIGNMENTS: usize = 100_000;

/// Max bytes in a single shell input line.
pub const MAX_COMMAND_LEN: usize = 4096;

/// Max columns materialized by a re-center.
pub const MAX_INITIAL_COLUMNS: u32 = 1_000;

/// Max units added by a single window expansion.
pub const MAX_EXPAND_BUFFER: u32 = 1_000;
