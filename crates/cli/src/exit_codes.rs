//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args)               |
//! | 3-9     | report    | Reconciliation run codes                 |
//! | 10-19   | clean     | Text cleanup codes                       |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

// Usage errors (missing arguments, unknown flags) exit 2 via clap.

// =============================================================================
// Report (3-9)
// =============================================================================

/// Config failed to parse or validate.
pub const EXIT_REPORT_INVALID_CONFIG: u8 = 3;

/// A required column is missing from an input header.
pub const EXIT_REPORT_MISSING_COLUMN: u8 = 4;

/// Runtime failure: unreadable required input, unwritable output.
pub const EXIT_REPORT_RUNTIME: u8 = 5;

// =============================================================================
// Clean (10-19)
// =============================================================================

/// Cannot read the input or write the output text file.
pub const EXIT_CLEAN_IO: u8 = 10;
