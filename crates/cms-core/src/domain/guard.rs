// ============================================================================
// CMS Core - Guard
// File: crates/cms-core/src/domain/guard.rs
// Description: Authentication channel that namespaces roles and permissions
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication channel. Roles and permissions are keyed by
/// `(name, guard)`, so the same name may exist once per guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    Web,
    Api,
}

impl Guard {
    pub const ALL: [Guard; 2] = [Guard::Web, Guard::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            Guard::Web => "web",
            Guard::Api => "api",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "web" => Some(Guard::Web),
            "api" => Some(Guard::Api),
            _ => None,
        }
    }
}

impl Default for Guard {
    fn default() -> Self {
        Guard::Web
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_round_trip_and_default() {
        for guard in Guard::ALL {
            assert_eq!(Guard::from_str(guard.as_str()), Some(guard));
        }
        assert_eq!(Guard::from_str("session"), None);
        assert_eq!(Guard::default(), Guard::Web);
    }
}
