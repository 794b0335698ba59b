use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Error returned when an integer does not name a variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: i32,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a closed enumeration stored and serialized as an integer, with an
/// exhaustive mapping to display labels.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $value:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i32", into = "i32")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Looks a variant up by its display label, ignoring case.
            pub fn parse(label: &str) -> Option<$name> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(label.trim()))
            }
        }

        impl TryFrom<i32> for $name {
            type Error = UnknownVariant;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> Self {
                v.as_i32()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_i32()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = i32::column_result(value)?;
                $name::try_from(raw).map_err(|_| FromSqlError::OutOfRange(i64::from(raw)))
            }
        }
    };
}

int_enum! {
    /// Coarse role flag. Ordered: a higher level implies every lower one.
    pub enum AccessLevel {
        Unconfirmed = 0 => "Unconfirmed",
        Regular = 1 => "Regular",
        Moderator = 2 => "Moderator",
        Admin = 3 => "Admin",
    }
}

int_enum! {
    pub enum Gender {
        Male = 0 => "Male",
        Female = 1 => "Female",
        Other = 2 => "Other",
    }
}

int_enum! {
    pub enum MaritalStatus {
        Single = 0 => "Single",
        Married = 1 => "Married",
        Divorced = 2 => "Divorced",
        Widowed = 3 => "Widowed",
    }
}

int_enum! {
    pub enum Category {
        Retail = 0 => "Retail",
        Grocery = 1 => "Grocery",
        Electronics = 2 => "Electronics",
        Clothing = 3 => "Clothing",
        Furniture = 4 => "Furniture",
        Pharmacy = 5 => "Pharmacy",
        Books = 6 => "Books",
        Other = 7 => "Other",
    }
}

impl AccessLevel {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, AccessLevel::Admin)
    }

    /// Moderators and admins may edit rows owned by other users.
    #[must_use]
    pub const fn can_moderate(self) -> bool {
        matches!(self, AccessLevel::Moderator | AccessLevel::Admin)
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Unconfirmed
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl Default for MaritalStatus {
    fn default() -> Self {
        MaritalStatus::Single
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Retail
    }
}
