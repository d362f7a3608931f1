//! Process exit codes
//!
//! The first four are the engine's own contract; `CONFIG` follows BSD sysexits.h.

/// Successful termination (also used after a graceful early exit such as `--help`)
pub const OK: i32 = 0;

/// Any fatal error that does not carry its own suggested exit code
pub const DEFAULT_ERROR: i32 = 1;

/// A command without a handler was invoked
pub const NOT_IMPLEMENTED: i32 = 2;

/// A sanity or invariant check failed
pub const ASSERTION_FAILED: i32 = 3;

/// Configuration error
pub const CONFIG: i32 = 78;
