//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Enumerations are stored as their lowercase text form; rows are mapped
//! back through `FromStr`, and a value the domain does not recognize is
//! reported as a `DatabaseError`.

mod application_repository;
mod member_repository;
mod message_repository;
mod opportunity_repository;
mod organization_repository;
mod payment_ledger;
mod subscription_repository;

pub use application_repository::PostgresApplicationRepository;
pub use member_repository::PostgresMemberRepository;
pub use message_repository::PostgresMessageRepository;
pub use opportunity_repository::PostgresOpportunityRepository;
pub use organization_repository::PostgresOrganizationRepository;
pub use payment_ledger::PostgresPaymentLedger;
pub use subscription_repository::PostgresSubscriptionRepository;

use std::str::FromStr;

use crate::domain::foundation::{DomainError, ValidationError};

/// Wraps a driver error with the action that failed.
fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

/// Parses a text column into a domain enum.
fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ValidationError>,
{
    raw.parse::<T>().map_err(|e| {
        DomainError::database(format!("Invalid {} value '{}': {}", column, raw, e))
    })
}

/// Converts a COUNT(*) result.
fn to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Pattern for a case-insensitive substring match.
fn like_pattern(query: Option<&str>) -> Option<String> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| {
            let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{}%", escaped)
        })
}
