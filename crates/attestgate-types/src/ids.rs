//! Stable identifiers shared by the CLI, reports, and tests.

/// Tool name recorded in report envelopes.
pub const TOOL_NAME: &str = "attestgate";

/// Default config file name, resolved against the root directory.
pub const DEFAULT_CONFIG_FILE: &str = "attestgate.toml";

// Exit codes
pub const EXIT_ALLOW: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_DENY: i32 = 2;
