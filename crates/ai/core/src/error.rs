//! Common error infrastructure for the AI layers.
//!
//! Domain-specific errors (`ConfigError` for prototype validation, the
//! runtime's `RuntimeError`) live next to the code that raises them and
//! implement [`AiError`] so callers can classify them uniformly.
//!
//! Decision code itself never propagates errors across agent boundaries:
//! a failed precondition becomes a `Failed` status or a silent no-op, and
//! only API entry points (controller construction, substate bookkeeping,
//! content validation) return `Result`.

use crate::types::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the agent can keep thinking; the next tick may succeed
/// - **Validation**: malformed configuration, reject until content changes
/// - **Internal**: bookkeeping inconsistency in the runtime (repairable, but a bug)
/// - **Fatal**: the agent cannot be driven at all
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: target left the world, power on cooldown.
    Recoverable,

    /// Examples: power context without a power, inverted min/max range.
    Validation,

    /// Examples: unbalanced substate stack, executing power desync.
    Internal,

    /// Examples: profile reference that does not resolve.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all AI errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Return a stable snake_case `error_code` per variant
pub trait AiError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Agent the error concerns, when there is one.
    fn agent(&self) -> Option<EntityId> {
        None
    }

    /// Static identifier for this error variant, useful for metrics and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_includes_fatal() {
        assert!(ErrorSeverity::Fatal.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
    }
}
