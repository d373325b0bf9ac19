/// Default length of the sync window, counted forward from the start of a run.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Grace applied to start-boundary comparisons when matching busy blocks.
pub const OVERLAP_TOLERANCE_SECS: i64 = 60;

/// Subject given to every busy block created on the target calendar.
pub const BUSY_SUBJECT: &str = "Busy";

/// Location marker identifying blocks created by this tool.
pub const BUSY_LOCATION: &str = "Reserved by Automation";

/// Prefix of the body annotation pointing back at the source event.
pub const BUSY_BODY_PREFIX: &str = "Blocked due to event: ";
