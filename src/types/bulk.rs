use std::fmt;

/// Largest row count accepted by a single bulk operation.
pub const MAX_BULK_COUNT: i64 = 9_999_999;

/// Entity tables reachable through the admin seed/purge endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkTarget {
    Users,
    Stores,
    StoreEmployeeRoles,
    StoreEmployees,
    StoreShifts,
    ChatMessages,
}

impl BulkTarget {
    pub const ALL: &'static [BulkTarget] = &[
        BulkTarget::Users,
        BulkTarget::Stores,
        BulkTarget::StoreEmployeeRoles,
        BulkTarget::StoreEmployees,
        BulkTarget::StoreShifts,
        BulkTarget::ChatMessages,
    ];

    /// Parses the URL segment naming a target (e.g. `storeemployeeroles`).
    pub fn parse(s: &str) -> Option<BulkTarget> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.path().eq_ignore_ascii_case(s))
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            BulkTarget::Users => "users",
            BulkTarget::Stores => "stores",
            BulkTarget::StoreEmployeeRoles => "storeemployeeroles",
            BulkTarget::StoreEmployees => "storeemployees",
            BulkTarget::StoreShifts => "storeshifts",
            BulkTarget::ChatMessages => "chatmessages",
        }
    }

    /// Human readable plural used in operation messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            BulkTarget::Users => "users",
            BulkTarget::Stores => "stores",
            BulkTarget::StoreEmployeeRoles => "store employee roles",
            BulkTarget::StoreEmployees => "store employees",
            BulkTarget::StoreShifts => "store shifts",
            BulkTarget::ChatMessages => "chat messages",
        }
    }
}

impl fmt::Display for BulkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Checks a bulk row count or broadcast value against `1..=MAX_BULK_COUNT`.
pub fn validate_bulk_count(count: i64) -> Result<u32, String> {
    if (1..=MAX_BULK_COUNT).contains(&count) {
        // bounded above by MAX_BULK_COUNT
        Ok(count as u32)
    } else {
        Err(format!(
            "Please enter a valid number (0 < n <= {MAX_BULK_COUNT})"
        ))
    }
}
