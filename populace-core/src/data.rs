//! Run configuration and the per-run random source.

use crate::error::{EngineError, Result};
use crate::hints::AfterGenerate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::str::FromStr;

/// Attempts a size-constrained populator makes before giving up.
pub const DEFAULT_FAILED_ADD_THRESHOLD: usize = 50;

/// Environment variable forcing `fail_on_error`.
pub const FAIL_ON_ERROR_VAR: &str = "POPULACE_FAIL_ON_ERROR";

/// Environment variable forcing the assignment type.
pub const ASSIGNMENT_TYPE_VAR: &str = "POPULACE_ASSIGNMENT_TYPE";

/// How generated field values are written into their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentType {
    /// Write the field slot directly.
    #[default]
    Field,
    /// Call the field's setter.
    Method,
}

impl FromStr for AssignmentType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "field" => Ok(AssignmentType::Field),
            "method" => Ok(AssignmentType::Method),
            other => Err(EngineError::InvalidConfig {
                message: format!("unknown assignment type '{other}'"),
            }),
        }
    }
}

/// What method assignment does when a field has no setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnSetMethodNotFound {
    #[default]
    AssignField,
    Ignore,
    Fail,
}

/// What method assignment does when a setter returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnSetMethodError {
    AssignField,
    #[default]
    Ignore,
    Fail,
}

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Action used for values whose hints do not specify one.
    pub after_generate: AfterGenerate,

    /// Overwrite fields that already hold a value.
    pub overwrite_existing_values: bool,

    pub assignment_type: AssignmentType,

    /// Failed attempts before a collection, map or array stops trying to
    /// reach its requested size.
    pub failed_add_threshold: usize,

    /// Propagate non-fatal errors instead of recording them as warnings.
    pub fail_on_error: bool,

    /// Probability that a nullable node resolves to null.
    pub null_probability: f64,

    pub on_set_method_not_found: OnSetMethodNotFound,

    pub on_set_method_error: OnSetMethodError,

    /// Seed for the run's random source; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            after_generate: AfterGenerate::default(),
            overwrite_existing_values: true,
            assignment_type: AssignmentType::default(),
            failed_add_threshold: DEFAULT_FAILED_ADD_THRESHOLD,
            fail_on_error: false,
            null_probability: 1.0 / 6.0,
            on_set_method_not_found: OnSetMethodNotFound::default(),
            on_set_method_error: OnSetMethodError::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Set the default action for values without one.
    pub fn with_after_generate(mut self, action: AfterGenerate) -> Self {
        self.after_generate = action;
        self
    }

    /// Set whether fields that already hold a value are overwritten.
    pub fn with_overwrite_existing_values(mut self, overwrite: bool) -> Self {
        self.overwrite_existing_values = overwrite;
        self
    }

    /// Set how field values are written.
    pub fn with_assignment_type(mut self, assignment_type: AssignmentType) -> Self {
        self.assignment_type = assignment_type;
        self
    }

    /// Set the number of failed attempts tolerated per container.
    pub fn with_failed_add_threshold(mut self, threshold: usize) -> Self {
        self.failed_add_threshold = threshold;
        self
    }

    /// Set whether non-fatal errors are raised.
    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Set the probability of a nullable node resolving to null.
    pub fn with_null_probability(mut self, probability: f64) -> Self {
        self.null_probability = probability;
        self
    }

    /// Set the policy for fields without a setter.
    pub fn with_on_set_method_not_found(mut self, action: OnSetMethodNotFound) -> Self {
        self.on_set_method_not_found = action;
        self
    }

    /// Set the policy for setters that fail.
    pub fn with_on_set_method_error(mut self, action: OnSetMethodError) -> Self {
        self.on_set_method_error = action;
        self
    }

    /// Fix the seed of the run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply overrides read through `lookup`, keyed by variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(FAIL_ON_ERROR_VAR) {
            self.fail_on_error = raw.trim().parse().map_err(|_| EngineError::InvalidConfig {
                message: format!("{FAIL_ON_ERROR_VAR} must be 'true' or 'false', got '{raw}'"),
            })?;
        }
        if let Some(raw) = lookup(ASSIGNMENT_TYPE_VAR) {
            self.assignment_type = raw.parse()?;
        }
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "null probability must be within [0, 1], got {}",
                    self.null_probability
                ),
            });
        }
        Ok(())
    }
}

/// Random source owned by a single generation run.
pub struct Random {
    rng: StdRng,
    null_probability: f64,
}

impl Random {
    /// Seeded when `seed` is given, from entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Random {
            rng,
            null_probability: 1.0 / 6.0,
        }
    }

    /// Create a seeded random source.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Set the null probability, clamped to `[0, 1]`.
    pub fn with_null_probability(mut self, probability: f64) -> Self {
        self.null_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Roll for a null. Never true for non-nullable positions.
    pub fn dice_roll(&mut self, nullable: bool) -> bool {
        nullable && self.rng.gen_bool(self.null_probability)
    }

    /// Uniform integer in `min..=max`.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform size in `min..=max`.
    pub fn size_range(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Fair coin flip.
    pub fn bool(&mut self) -> bool {
        self.rng.gen()
    }

    /// Uniform float in `[0, 1)`.
    pub fn float(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Pick one element, `None` when `items` is empty.
    pub fn one_of<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Shuffle `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Random upper-case ASCII string.
    pub fn alphabetic(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'A' + self.rng.gen_range(0..26u8)))
            .collect()
    }
}
