//! Ports - Interfaces for external dependencies.
//!
//! Handlers depend only on these traits; `main` wires concrete adapters in.

mod application_repository;
mod member_repository;
mod message_repository;
mod opportunity_repository;
mod organization_repository;
mod payment_ledger;
mod payment_provider;
mod replay_guard;
mod session_validator;
mod subscription_repository;
mod token_refresher;

pub use application_repository::ApplicationRepository;
pub use member_repository::MemberRepository;
pub use message_repository::MessageRepository;
pub use opportunity_repository::OpportunityRepository;
pub use organization_repository::OrganizationRepository;
pub use payment_ledger::PaymentLedger;
pub use payment_provider::{
    CreateCheckoutRequest, CreateCustomerRequest, CreateSetupRequest, Customer, HostedSession,
    PaymentError, PaymentErrorCode, PaymentProvider, ProviderSubscription,
};
pub use replay_guard::ReplayGuard;
pub use session_validator::SessionValidator;
pub use subscription_repository::SubscriptionRepository;
pub use token_refresher::TokenRefresher;
