//! Process exit statuses.

/// Command completed.
pub const SUCCESS: i32 = 0;
/// Bad arguments or an unreadable input.
pub const ERROR_GENERAL: i32 = 1;
/// The command ran but failed: a fatal form error, or the fill failure
/// policy was triggered.
pub const ERROR_ENCOUNTERED: i32 = 6;
