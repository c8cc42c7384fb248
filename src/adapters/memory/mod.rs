//! In-memory port adapters for tests and local runs without Postgres.

mod billing;
mod directory;
mod messaging;
mod workflow;

pub use billing::{InMemoryPaymentLedger, InMemorySubscriptionRepository};
pub use directory::{InMemoryMemberRepository, InMemoryOrganizationRepository};
pub use messaging::InMemoryMessageRepository;
pub use workflow::InMemoryWorkflowStore;
