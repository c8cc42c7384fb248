//! Shared application state.
//!
//! Built once in `main` and cloned per request. Handlers are created on
//! demand from the Arc-wrapped ports.

use std::sync::Arc;

use crate::application::handlers::billing::{
    CancelSubscriptionHandler, CreateCheckoutSessionHandler, CreateSetupSessionHandler,
    GetBillingOverviewHandler, HandleWebhookHandler, ReactivateSubscriptionHandler,
};
use crate::application::handlers::directory::{
    AddOrganizationMemberHandler, CompleteProfileSetupHandler, CreateOrganizationHandler,
    GetMemberHandler, GetOrganizationHandler, ListMembersHandler, ListOrganizationsHandler,
    UpdateProfileHandler,
};
use crate::application::handlers::messaging::{
    GetThreadHandler, ListMessagesHandler, SendMessageHandler, UnreadCountHandler,
    UpdateMessageHandler,
};
use crate::application::handlers::workflow::{
    ChangeApplicationStatusHandler, CreateOpportunityHandler, GetOpportunityHandler,
    ListMyApplicationsHandler, ListOpportunitiesHandler, ListOpportunityApplicationsHandler,
    SubmitApplicationHandler, UpdateOpportunityStatusHandler,
};
use crate::config::AppConfig;
use crate::domain::billing::{PriceTable, StripeWebhookVerifier};
use crate::ports::{
    ApplicationRepository, MemberRepository, MessageRepository, OpportunityRepository,
    OrganizationRepository, PaymentLedger, PaymentProvider, ReplayGuard, SessionValidator,
    SubscriptionRepository, TokenRefresher,
};

/// Cookie and refresh behaviour of the session gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Refresh when the access token expires within this many seconds.
    pub refresh_window_secs: i64,
    /// `Max-Age` of the session cookie.
    pub max_age_secs: i64,
    /// Adds `Secure` to issued cookies.
    pub secure_cookies: bool,
}

impl SessionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            refresh_window_secs: config.auth.refresh_window_secs,
            max_age_secs: config.auth.session_max_age_secs,
            secure_cookies: config.server.is_production(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_window_secs: 300,
            max_age_secs: 3600,
            secure_cookies: false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub members: Arc<dyn MemberRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub opportunities: Arc<dyn OpportunityRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub payments: Arc<dyn PaymentProvider>,
    pub replay_guard: Arc<dyn ReplayGuard>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub token_refresher: Arc<dyn TokenRefresher>,
    pub webhook_verifier: StripeWebhookVerifier,
    pub prices: PriceTable,
    pub app_base_url: String,
    pub session: SessionSettings,
}

impl AppState {
    // Directory

    pub fn complete_profile_setup_handler(&self) -> CompleteProfileSetupHandler {
        CompleteProfileSetupHandler::new(self.members.clone())
    }

    pub fn update_profile_handler(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.members.clone())
    }

    pub fn get_member_handler(&self) -> GetMemberHandler {
        GetMemberHandler::new(self.members.clone())
    }

    pub fn list_members_handler(&self) -> ListMembersHandler {
        ListMembersHandler::new(self.members.clone())
    }

    pub fn create_organization_handler(&self) -> CreateOrganizationHandler {
        CreateOrganizationHandler::new(self.members.clone(), self.organizations.clone())
    }

    pub fn get_organization_handler(&self) -> GetOrganizationHandler {
        GetOrganizationHandler::new(self.organizations.clone())
    }

    pub fn list_organizations_handler(&self) -> ListOrganizationsHandler {
        ListOrganizationsHandler::new(self.organizations.clone())
    }

    pub fn add_organization_member_handler(&self) -> AddOrganizationMemberHandler {
        AddOrganizationMemberHandler::new(self.members.clone(), self.organizations.clone())
    }

    // Workflow

    pub fn create_opportunity_handler(&self) -> CreateOpportunityHandler {
        CreateOpportunityHandler::new(
            self.members.clone(),
            self.organizations.clone(),
            self.opportunities.clone(),
        )
    }

    pub fn update_opportunity_status_handler(&self) -> UpdateOpportunityStatusHandler {
        UpdateOpportunityStatusHandler::new(self.opportunities.clone())
    }

    pub fn get_opportunity_handler(&self) -> GetOpportunityHandler {
        GetOpportunityHandler::new(self.opportunities.clone())
    }

    pub fn list_opportunities_handler(&self) -> ListOpportunitiesHandler {
        ListOpportunitiesHandler::new(self.opportunities.clone())
    }

    pub fn submit_application_handler(&self) -> SubmitApplicationHandler {
        SubmitApplicationHandler::new(
            self.members.clone(),
            self.opportunities.clone(),
            self.applications.clone(),
        )
    }

    pub fn change_application_status_handler(&self) -> ChangeApplicationStatusHandler {
        ChangeApplicationStatusHandler::new(self.opportunities.clone(), self.applications.clone())
    }

    pub fn list_opportunity_applications_handler(&self) -> ListOpportunityApplicationsHandler {
        ListOpportunityApplicationsHandler::new(
            self.opportunities.clone(),
            self.applications.clone(),
        )
    }

    pub fn list_my_applications_handler(&self) -> ListMyApplicationsHandler {
        ListMyApplicationsHandler::new(self.applications.clone())
    }

    // Messaging

    pub fn send_message_handler(&self) -> SendMessageHandler {
        SendMessageHandler::new(
            self.members.clone(),
            self.opportunities.clone(),
            self.messages.clone(),
        )
    }

    pub fn list_messages_handler(&self) -> ListMessagesHandler {
        ListMessagesHandler::new(self.messages.clone())
    }

    pub fn get_thread_handler(&self) -> GetThreadHandler {
        GetThreadHandler::new(self.messages.clone())
    }

    pub fn unread_count_handler(&self) -> UnreadCountHandler {
        UnreadCountHandler::new(self.messages.clone())
    }

    pub fn update_message_handler(&self) -> UpdateMessageHandler {
        UpdateMessageHandler::new(self.messages.clone())
    }

    // Billing

    pub fn create_checkout_session_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.members.clone(),
            self.subscriptions.clone(),
            self.payments.clone(),
            self.prices.clone(),
            self.app_base_url.clone(),
        )
    }

    pub fn create_setup_session_handler(&self) -> CreateSetupSessionHandler {
        CreateSetupSessionHandler::new(
            self.members.clone(),
            self.payments.clone(),
            self.app_base_url.clone(),
        )
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.subscriptions.clone(), self.payments.clone())
    }

    pub fn reactivate_subscription_handler(&self) -> ReactivateSubscriptionHandler {
        ReactivateSubscriptionHandler::new(self.subscriptions.clone(), self.payments.clone())
    }

    pub fn billing_overview_handler(&self) -> GetBillingOverviewHandler {
        GetBillingOverviewHandler::new(
            self.members.clone(),
            self.subscriptions.clone(),
            self.ledger.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleWebhookHandler {
        HandleWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.replay_guard.clone(),
            self.members.clone(),
            self.subscriptions.clone(),
            self.ledger.clone(),
            self.prices.clone(),
        )
    }
}
