/// Placeholder substituted for string fields the extraction service did not deliver.
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum number of reviews submitted for classification per run.
pub const DEFAULT_REVIEW_CAP: usize = 50;

/// Number of classification calls allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Extra attempts for a classification call that failed with a transient error.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Output token budget for one verdict. Leaves room for models that reason
/// before answering.
pub const VERDICT_MAX_TOKENS: u32 = 256;
