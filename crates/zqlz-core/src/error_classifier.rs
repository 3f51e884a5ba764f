//! Dialect-specific interpretation of database error messages
//!
//! The restore engine makes two decisions based on what the server said:
//! whether a whole-dump failure means "payload too big" (switch to batches)
//! and whether a batch failure is a harmless re-run conflict. Both depend on
//! the wording of one database engine, so they sit behind this trait.

/// Decides what a database error message means for a restore.
///
/// Contract:
/// - Implementations only look at the message text; they never retry or
///   touch the connection.
/// - `is_capacity_error` is consulted once, for the whole-dump attempt. A
///   `true` answer must only be given for payload/size/memory limits, since
///   it makes the engine replay the dump in batches.
/// - `is_benign_conflict` is consulted for every failed batch. A `true`
///   answer means the batch failed because its objects already exist in the
///   target, and the failure does not count towards the abort threshold.
pub trait ErrorClassifier: Send + Sync {
    /// The whole-dump request exceeded a server execution limit
    fn is_capacity_error(&self, message: &str) -> bool;

    /// The batch failed only because its objects are already present
    fn is_benign_conflict(&self, message: &str) -> bool;
}

/// Case-sensitive substring matching against fixed pattern lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternClassifier {
    capacity_patterns: Vec<String>,
    benign_patterns: Vec<String>,
}

impl PatternClassifier {
    pub fn new<C, B>(capacity_patterns: C, benign_patterns: B) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            capacity_patterns: capacity_patterns.into_iter().map(Into::into).collect(),
            benign_patterns: benign_patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// PostgreSQL wording for capacity failures and re-run conflicts
    pub fn postgres() -> Self {
        Self::new(
            ["too large", "memory", "size"],
            ["already exists", "duplicate key"],
        )
    }

    pub fn capacity_patterns(&self) -> &[String] {
        &self.capacity_patterns
    }

    pub fn benign_patterns(&self) -> &[String] {
        &self.benign_patterns
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::postgres()
    }
}

impl ErrorClassifier for PatternClassifier {
    fn is_capacity_error(&self, message: &str) -> bool {
        self.capacity_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }

    fn is_benign_conflict(&self, message: &str) -> bool {
        self.benign_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }
}
