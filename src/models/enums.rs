use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serialized form is the same string as `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Patient => "patient",
    Clinician => "clinician",
});

str_enum!(LinkStatus {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

impl LinkStatus {
    /// Pending and accepted links both count against the one-link-per-pair rule.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

str_enum!(Sex {
    Female => "female",
    Male => "male",
    Pregnant => "pregnant",
});

impl Default for Sex {
    fn default() -> Self {
        Self::Female
    }
}
