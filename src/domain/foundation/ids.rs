//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Identifier of a member account.
    ///
    /// Equal to the identity provider's subject claim, so the same value
    /// identifies the caller in session tokens and in storage.
    MemberId
);

uuid_id!(
    /// Identifier of an organization.
    OrganizationId
);

uuid_id!(
    /// Identifier of a speaking opportunity.
    OpportunityId
);

uuid_id!(
    /// Identifier of an application to an opportunity.
    ApplicationId
);

uuid_id!(
    /// Identifier of a message. Thread ids reuse the root message id.
    MessageId
);

uuid_id!(
    /// Local identifier of a subscription row.
    SubscriptionId
);

uuid_id!(
    /// Identifier of a payment ledger row.
    PaymentId
);

impl MemberId {
    /// Parses a member id from an identity-provider subject.
    pub fn parse_subject(subject: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(subject)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("sub", e.to_string()))
    }
}
