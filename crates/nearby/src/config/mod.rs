use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NearbyError, Result};

pub const DEFAULT_THRESHOLD_MILES: f64 = 1.5;
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_SUGGESTION_TYPE_COUNT: usize = 3;

pub const THRESHOLD_ENV_VAR: &str = "NEARBY_THRESHOLD_MILES";
pub const EXTRACTION_TIMEOUT_ENV_VAR: &str = "NEARBY_EXTRACTION_TIMEOUT_MS";

/// Settings for query processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Maximum distance between a target and a nearby POI, in miles
    pub threshold_miles: f64,
    /// Budget for intent extraction
    pub extraction_timeout: Duration,
    /// How many supported types to use when building example queries
    pub suggestion_type_count: usize,
    /// Cap on POIs (simple queries) or groups (proximity queries) returned
    pub max_results: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            threshold_miles: DEFAULT_THRESHOLD_MILES,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            suggestion_type_count: DEFAULT_SUGGESTION_TYPE_COUNT,
            max_results: None,
        }
    }
}

impl QueryConfig {
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::new()
    }

    /// Defaults overridden by `NEARBY_THRESHOLD_MILES` and
    /// `NEARBY_EXTRACTION_TIMEOUT_MS` when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = QueryConfigBuilder::new();

        if let Some(value) = lookup(THRESHOLD_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            let miles = value.trim().parse::<f64>().map_err(|e| {
                NearbyError::ConfigError(format!("{THRESHOLD_ENV_VAR}={value:?}: {e}"))
            })?;
            builder = builder.try_threshold_miles(miles)?;
        }
        if let Some(value) = lookup(EXTRACTION_TIMEOUT_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            let millis = value.trim().parse::<u64>().map_err(|e| {
                NearbyError::ConfigError(format!("{EXTRACTION_TIMEOUT_ENV_VAR}={value:?}: {e}"))
            })?;
            builder = builder.extraction_timeout_ms(millis);
        }

        builder.try_build()
    }

    /// Check the invariants a hand-built config might violate.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold_miles)?;
        if self.extraction_timeout.is_zero() {
            return Err(NearbyError::ConfigError(
                "Extraction timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_threshold(miles: f64) -> Result<()> {
    if miles.is_finite() && miles > 0.0 {
        Ok(())
    } else {
        Err(NearbyError::ConfigError(format!(
            "Distance threshold must be a positive number of miles, got {miles}"
        )))
    }
}

/// Builder for creating query configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: QueryConfig::default(),
        }
    }

    /// Create a builder for walking distance (0.5 mile threshold)
    pub fn walking() -> Self {
        let mut builder = Self::new();
        builder.config.threshold_miles = 0.5;
        builder
    }

    /// Create a builder for driving distance (5 mile threshold)
    pub fn driving() -> Self {
        let mut builder = Self::new();
        builder.config.threshold_miles = 5.0;
        builder
    }

    /// Set the proximity threshold in miles. Invalid values are caught by
    /// [`try_build`](Self::try_build).
    pub fn threshold_miles(mut self, miles: f64) -> Self {
        self.config.threshold_miles = miles;
        self
    }

    /// Set the proximity threshold, rejecting non-positive or non-finite values
    pub fn try_threshold_miles(mut self, miles: f64) -> Result<Self> {
        validate_threshold(miles)?;
        self.config.threshold_miles = miles;
        Ok(self)
    }

    pub fn extraction_timeout(mut self, timeout: Duration) -> Self {
        self.config.extraction_timeout = timeout;
        self
    }

    pub fn extraction_timeout_ms(self, millis: u64) -> Self {
        self.extraction_timeout(Duration::from_millis(millis))
    }

    /// Number of supported types used for example queries (at least 1)
    pub fn suggestion_type_count(mut self, count: usize) -> Self {
        self.config.suggestion_type_count = count.max(1);
        self
    }

    /// Limit the number of POIs or groups returned
    pub fn max_results(mut self, limit: usize) -> Self {
        self.config.max_results = Some(limit);
        self
    }

    pub fn unlimited_results(mut self) -> Self {
        self.config.max_results = None;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> QueryConfig {
        self.config
    }

    /// Build and validate the final configuration
    pub fn try_build(self) -> Result<QueryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
