//! CLI Exit Code Registry
//!
//! Single source of truth for all `fieldaudit` exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 2       | Universal | CLI usage error (bad args, unknown kind) |
//! | 60-69   | audit     | Normalize / reconcile / run codes        |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, invalid record kind.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Audit (60-69)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_AUDIT_INVALID_CONFIG: u8 = 60;

/// Runtime failure: unreadable input, unwritable output, serialization.
pub const EXIT_AUDIT_RUNTIME: u8 = 61;

/// Some normalized records could not be written to the store.
pub const EXIT_AUDIT_PARTIAL_UPLOAD: u8 = 62;

/// Fraud alerts present and `--fail-on-alerts` was given.
pub const EXIT_AUDIT_ALERTS: u8 = 63;
