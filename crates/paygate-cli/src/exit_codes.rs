//! Process exit codes. Part of the CLI contract; scripts branch on these.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Handler returned non-2xx, or decryption failed
pub const CONFIG_ERROR: i32 = 2; // Bad config, unreadable input, unusable store spec
pub const DENIED: i32 = 3; // Authorizer returned Deny
pub const NOT_FOUND: i32 = 4; // Record does not exist
