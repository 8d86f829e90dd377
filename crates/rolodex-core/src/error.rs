use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TenantMissing,
    ContactNotFound,
    InvalidContact,
    InvalidPlan,
    StaleRecord,
    UnknownConflict,
    ContactExists,
    AuditOrderViolation,
    StoreWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TenantMissing => "E1003",
            Self::ContactNotFound => "E2001",
            Self::InvalidContact => "E2002",
            Self::InvalidPlan => "E2003",
            Self::StaleRecord => "E2004",
            Self::UnknownConflict => "E2005",
            Self::ContactExists => "E2006",
            Self::AuditOrderViolation => "E3001",
            Self::StoreWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Tenant store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TenantMissing => "Tenant name is empty",
            Self::ContactNotFound => "Contact not found",
            Self::InvalidContact => "Malformed contact record",
            Self::InvalidPlan => "Invalid merge plan",
            Self::StaleRecord => "Contact changed since the merge plan was built",
            Self::UnknownConflict => "No conflicting field with that key",
            Self::ContactExists => "Contact already exists",
            Self::AuditOrderViolation => "Audit event out of order",
            Self::StoreWriteFailed => "Contact store write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `rdx init --tenant <name>` first."),
            Self::ConfigParseError => Some("Fix syntax in .rolodex/config.toml and retry."),
            Self::TenantMissing => Some("Pass a non-empty `--tenant` value."),
            Self::ContactNotFound => None,
            Self::InvalidContact => Some("Every contact needs a non-empty id and unique keys."),
            Self::InvalidPlan => Some("Pick two different contacts as target and source."),
            Self::StaleRecord => Some("Re-run the diff and build a fresh merge plan."),
            Self::UnknownConflict => {
                Some("Only keys listed as conflicting in the diff can prefer the source.")
            }
            Self::ContactExists => Some("Use a different id or merge the existing record."),
            Self::AuditOrderViolation => Some("Event times must not go backwards per contact."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `rdx` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
