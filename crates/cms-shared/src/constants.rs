//! Application-wide constants

pub const DEFAULT_API_PREFIX: &str = "api";
pub const DEFAULT_SUPER_ROLE: &str = "admin";
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const PERMISSION_GROUP_DELIMITER: char = '-';
pub const PERMISSION_GROUP_FALLBACK: &str = "other";
