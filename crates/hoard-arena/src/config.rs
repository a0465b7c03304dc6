//! Arena configuration parameters.

use crate::error::ArenaError;

/// What an arena does when handed an address it does not own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MisusePolicy {
    /// Panic with a diagnostic message.
    #[default]
    Panic,
    /// Log, print to stderr, then abort the process.
    Abort,
    /// Log at `error` level and return [`ArenaError::NotOwned`].
    Report,
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Alignment floor applied to every request, in bytes.
    ///
    /// Requests with a smaller (or zero) alignment are raised to this value.
    /// Must be a non-zero power of two.
    /// Default: two machine words, the guarantee of a typical `malloc`.
    pub min_align: u32,

    /// Escalation for [`ArenaError::NotOwned`].
    pub misuse: MisusePolicy,
}

impl ArenaConfig {
    /// Default alignment floor: `2 * size_of::<usize>()` bytes.
    pub const DEFAULT_MIN_ALIGN: u32 = 2 * std::mem::size_of::<usize>() as u32;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            min_align: Self::DEFAULT_MIN_ALIGN,
            misuse: MisusePolicy::default(),
        }
    }

    /// Replace the alignment floor.
    pub fn with_min_align(mut self, min_align: u32) -> Self {
        self.min_align = min_align;
        self
    }

    /// Replace the misuse policy.
    pub fn with_misuse(mut self, misuse: MisusePolicy) -> Self {
        self.misuse = misuse;
        self
    }

    /// Check that the config can be used to build an arena.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.min_align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment {
                align: self.min_align,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
