// ── Identity types ──
//
// Backend rows are keyed by integer ids. Wrapping them keeps a proxy id
// from being passed where a group id is expected.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

integer_id!(
    /// Identifier of a proxy server.
    ProxyId
);
integer_id!(
    /// Identifier of a proxy group.
    GroupId
);
integer_id!(
    /// Identifier of a persisted session record.
    SessionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_and_display() {
        let id: ProxyId = " 42 ".parse().expect("numeric id");
        assert_eq!(id, ProxyId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<GroupId>().is_err());
    }
}
