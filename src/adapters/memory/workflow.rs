//! In-memory opportunity and application storage.
//!
//! Both repositories share one lock so that an application write and the
//! counter refresh happen atomically, as they do in Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    ApplicationId, DomainError, ErrorCode, MemberId, OpportunityId, Page, PageResult,
};
use crate::domain::workflow::{Application, Opportunity, OpportunityFilter};
use crate::ports::{ApplicationRepository, OpportunityRepository};

#[derive(Debug, Default)]
struct WorkflowState {
    opportunities: HashMap<OpportunityId, Opportunity>,
    applications: HashMap<ApplicationId, Application>,
}

impl WorkflowState {
    fn refresh_count(&mut self, opportunity_id: &OpportunityId) {
        let count = self
            .applications
            .values()
            .filter(|a| a.opportunity_id == *opportunity_id && a.status.is_active())
            .count() as i64;
        if let Some(opp) = self.opportunities.get_mut(opportunity_id) {
            opp.application_count = count;
        }
    }
}

/// Shared store handing out both repository views.
#[derive(Debug, Default, Clone)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<WorkflowState>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OpportunityRepository for InMemoryWorkflowStore {
    async fn save(&self, opportunity: &Opportunity) -> Result<(), DomainError> {
        self.state
            .write()
            .await
            .opportunities
            .insert(opportunity.id, opportunity.clone());
        Ok(())
    }

    async fn update(&self, opportunity: &Opportunity) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state
            .opportunities
            .get_mut(&opportunity.id)
            .ok_or_else(|| DomainError::new(ErrorCode::OpportunityNotFound, "Opportunity not found"))?;
        let count = existing.application_count;
        *existing = opportunity.clone();
        existing.application_count = count;
        Ok(())
    }

    async fn find_by_id(&self, id: &OpportunityId) -> Result<Option<Opportunity>, DomainError> {
        Ok(self.state.read().await.opportunities.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &OpportunityFilter,
        viewer: &MemberId,
        page: Page,
    ) -> Result<PageResult<Opportunity>, DomainError> {
        let mut matching: Vec<Opportunity> = self
            .state
            .read()
            .await
            .opportunities
            .values()
            .filter(|o| filter.matches(o, viewer))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PageResult::from_all(matching, page))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryWorkflowStore {
    async fn submit(&self, application: &Application) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.opportunities.contains_key(&application.opportunity_id) {
            return Err(DomainError::new(
                ErrorCode::OpportunityNotFound,
                "Opportunity not found",
            ));
        }
        let duplicate = state.applications.values().any(|a| {
            a.speaker_id == application.speaker_id
                && a.opportunity_id == application.opportunity_id
                && a.status.is_active()
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::DuplicateApplication,
                "You have already applied to this opportunity",
            ));
        }
        state
            .applications
            .insert(application.id, application.clone());
        state.refresh_count(&application.opportunity_id);
        Ok(())
    }

    async fn update_status(&self, application: &Application) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let existing = state
            .applications
            .get_mut(&application.id)
            .ok_or_else(|| DomainError::new(ErrorCode::ApplicationNotFound, "Application not found"))?;
        existing.status = application.status;
        existing.updated_at = application.updated_at;
        state.refresh_count(&application.opportunity_id);
        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, DomainError> {
        Ok(self.state.read().await.applications.get(id).cloned())
    }

    async fn list_for_opportunity(
        &self,
        opportunity_id: &OpportunityId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError> {
        let mut matching: Vec<Application> = self
            .state
            .read()
            .await
            .applications
            .values()
            .filter(|a| a.opportunity_id == *opportunity_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(PageResult::from_all(matching, page))
    }

    async fn list_for_speaker(
        &self,
        speaker_id: &MemberId,
        page: Page,
    ) -> Result<PageResult<Application>, DomainError> {
        let mut matching: Vec<Application> = self
            .state
            .read()
            .await
            .applications
            .values()
            .filter(|a| a.speaker_id == *speaker_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(PageResult::from_all(matching, page))
    }
}
