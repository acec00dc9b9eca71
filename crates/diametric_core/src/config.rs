//! Mapper configuration.

use diametric_edn::Keyword;

/// What the query builder does with a filter key that names no attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Emit the input variable silently. It binds nothing in the query.
    Bind,
    /// Emit the input variable and log a warning.
    #[default]
    Warn,
    /// Fail with [`CoreError::UnknownFilterParameter`](crate::CoreError::UnknownFilterParameter).
    Reject,
}

/// Configuration for a [`Mapper`](crate::Mapper).
#[derive(Debug, Clone)]
pub struct Config {
    /// Starting value of the temporary id counter; the first id handed
    /// out is one below it.
    pub temp_id_seed: i64,

    /// Partition assigned to entity types defined through the mapper.
    pub default_partition: Keyword,

    /// Partition schema attributes are installed into.
    pub schema_partition: Keyword,

    /// Handling of filter keys that match no declared attribute.
    pub filter_policy: FilterPolicy,
}

/// Seed of the temporary id counter.
pub const DEFAULT_TEMP_ID_SEED: i64 = -1000;

/// The store's built-in schema partition, `:db.part/db`.
pub fn db_partition() -> Keyword {
    Keyword::namespaced("db.part", "db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            temp_id_seed: DEFAULT_TEMP_ID_SEED,
            default_partition: db_partition(),
            schema_partition: db_partition(),
            filter_policy: FilterPolicy::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the temporary id seed.
    #[must_use]
    pub const fn temp_id_seed(mut self, seed: i64) -> Self {
        self.temp_id_seed = seed;
        self
    }

    /// Sets the partition for newly defined entity types.
    #[must_use]
    pub fn default_partition(mut self, partition: &str) -> Self {
        self.default_partition = Keyword::parse(partition);
        self
    }

    /// Sets the partition schema attributes are installed into.
    #[must_use]
    pub fn schema_partition(mut self, partition: &str) -> Self {
        self.schema_partition = Keyword::parse(partition);
        self
    }

    /// Sets the unknown filter key policy.
    #[must_use]
    pub const fn filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }
}
