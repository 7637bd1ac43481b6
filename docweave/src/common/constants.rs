/// Name of the primary key field of every document.
pub const DOC_ID: &str = "_id";

/// Separator of nested field paths and of embed-prefixed filter keys.
pub const FIELD_SEPARATOR: char = '.';

/// Page size used when a query does not name one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page size a query may request.
pub const MAX_LIMIT: u64 = 200;

/// Field holding the expiry timestamp (unix seconds) swept by the expiry cleaner.
pub const EXPIRY_FIELD: &str = "exp";

/// Default interval between two expiry sweeps, in seconds.
pub const DEFAULT_CLEANER_INTERVAL_SECS: u64 = 5 * 60;

/// Field name the count stage writes its result to.
pub const TOTAL_COUNT_FIELD: &str = "total_count";
