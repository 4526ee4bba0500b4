/// Engine-wide tunables shared by every agent.
///
/// Per-profile values (aggro range, attack rate, ...) live on the profile
/// prototypes; these are the fallbacks and the bookkeeping limits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    /// Sensory throttle used when a profile does not set its own interval.
    pub sense_interval_ms: u64,
    /// Aggro range used when a profile does not set its own.
    pub default_aggro_range: f32,
    /// Leash range used when a profile does not set its own. Zero disables
    /// the leash check.
    pub default_leash_range: f32,
    /// Consecutive LOS failures a MoveTo tolerates before failing.
    pub los_failure_tolerance: u32,
    /// Consecutive path failures tolerated before the target is dropped.
    pub path_failure_tolerance: u32,
    /// Extra distance added to range checks so agents at the exact edge of
    /// a power's range are not rejected because of float error.
    pub range_padding: f32,
}

impl AiConfig {
    // ===== compile-time constants =====
    /// Depth of the substate stack above the primary state slot.
    pub const MAX_SUBSTATE_DEPTH: usize = 4;
    /// Pending interrupts a controller buffers between thinks.
    pub const INTERRUPT_QUEUE_CAPACITY: usize = 4;
    /// Upper bound on power picker candidates (generic powers plus affix).
    pub const MAX_PICKER_ENTRIES: usize = 32;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SENSE_INTERVAL_MS: u64 = 500;
    pub const DEFAULT_AGGRO_RANGE: f32 = 600.0;
    pub const DEFAULT_LEASH_RANGE: f32 = 0.0;
    pub const DEFAULT_LOS_FAILURE_TOLERANCE: u32 = 3;
    pub const DEFAULT_PATH_FAILURE_TOLERANCE: u32 = 1;
    pub const DEFAULT_RANGE_PADDING: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            sense_interval_ms: Self::DEFAULT_SENSE_INTERVAL_MS,
            default_aggro_range: Self::DEFAULT_AGGRO_RANGE,
            default_leash_range: Self::DEFAULT_LEASH_RANGE,
            los_failure_tolerance: Self::DEFAULT_LOS_FAILURE_TOLERANCE,
            path_failure_tolerance: Self::DEFAULT_PATH_FAILURE_TOLERANCE,
            range_padding: Self::DEFAULT_RANGE_PADDING,
        }
    }

    pub fn with_sense_interval(sense_interval_ms: u64) -> Self {
        Self {
            sense_interval_ms,
            ..Self::new()
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}
