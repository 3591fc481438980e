//! Memoizer configuration.

/// Configuration shared by [`Memo`][crate::memo::Memo] and [`SyncMemo`][crate::sync::SyncMemo].
///
/// Use `MemoConfig::default()` for standard settings.
///
/// # Examples
///
/// ```
/// use memo_rs::config::MemoConfig;
/// use memo_rs::memo::Memo;
///
/// let config = MemoConfig {
///     capacity_bits: 10,
///     max_key_depth: 4,
/// };
/// let memo = Memo::with_config(|n: &u64| n + 1, config);
/// assert_eq!(memo.call(1), Ok(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoConfig {
    /// Initial cache capacity is `2^capacity_bits` entries (default: 4).
    /// The cache still grows past it. Must be at most 31: constructors panic
    /// otherwise.
    pub capacity_bits: usize,
    /// Maximum list nesting accepted in [`Value`][crate::value::Value]
    /// arguments (default: 32).
    pub max_key_depth: usize,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            capacity_bits: 4,
            max_key_depth: 32,
        }
    }
}
