//! C-compatible enums and structs.

use hoard_arena::MisusePolicy;

use crate::status::HoardStatus;

/// Misuse policy for `hoard_arena_create_with_policy`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoardMisusePolicy {
    /// Terminate the process. Default for `hoard_arena_create`.
    Abort = 0,
    /// Panic; the call returns `Panicked` and the arena becomes unusable
    /// (`InternalError`) until destroyed.
    Panic = 1,
    /// Log and return `NotOwned`.
    Report = 2,
}

impl TryFrom<i32> for HoardMisusePolicy {
    type Error = HoardStatus;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Abort),
            1 => Ok(Self::Panic),
            2 => Ok(Self::Report),
            _ => Err(HoardStatus::InvalidArgument),
        }
    }
}

impl From<HoardMisusePolicy> for MisusePolicy {
    fn from(p: HoardMisusePolicy) -> Self {
        match p {
            HoardMisusePolicy::Abort => MisusePolicy::Abort,
            HoardMisusePolicy::Panic => MisusePolicy::Panic,
            HoardMisusePolicy::Report => MisusePolicy::Report,
        }
    }
}

/// Arena occupancy returned by `hoard_arena_stats`.
///
/// Fixed-width `u64` fields for ABI portability (not `usize`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoardArenaStats {
    /// Number of live blocks.
    pub live_blocks: u64,
    /// Total size of live blocks in bytes.
    pub live_bytes: u64,
}
