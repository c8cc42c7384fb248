//! Application entity: one speaker's bid for one opportunity.

use serde::{Deserialize, Serialize};

use super::WorkflowError;
use crate::domain::foundation::{
    text_enum, ApplicationId, MemberId, OpportunityId, StateMachine, Timestamp, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

text_enum!(ApplicationStatus, "status", {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
    Withdrawn => "withdrawn",
});

impl ApplicationStatus {
    /// Counted towards the opportunity's `application_count`.
    pub fn is_active(&self) -> bool {
        !matches!(self, ApplicationStatus::Withdrawn)
    }
}

impl StateMachine for ApplicationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted) | (Pending, Rejected) | (Pending, Withdrawn)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ApplicationStatus::*;
        match self {
            Pending => vec![Accepted, Rejected, Withdrawn],
            Accepted | Rejected | Withdrawn => vec![],
        }
    }
}

/// Submission form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationForm {
    pub cover_letter: String,
    pub proposed_topic: Option<String>,
    #[serde(default)]
    pub availability_confirmed: bool,
    pub requested_fee_cents: Option<i64>,
}

impl ApplicationForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cover_letter.trim().is_empty() {
            return Err(ValidationError::empty_field("cover_letter"));
        }
        if !self.availability_confirmed {
            return Err(ValidationError::invalid_format(
                "availability_confirmed",
                "availability must be confirmed",
            ));
        }
        if let Some(fee) = self.requested_fee_cents {
            if fee < 0 {
                return Err(ValidationError::out_of_range("requested_fee_cents", 0, i64::MAX, fee));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub opportunity_id: OpportunityId,
    pub speaker_id: MemberId,
    pub cover_letter: String,
    pub proposed_topic: Option<String>,
    pub availability_confirmed: bool,
    pub requested_fee_cents: Option<i64>,
    pub status: ApplicationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Application {
    /// Builds a pending application from a validated form.
    pub fn submit(
        opportunity_id: OpportunityId,
        speaker_id: MemberId,
        form: ApplicationForm,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        form.validate()?;
        Ok(Self {
            id: ApplicationId::new(),
            opportunity_id,
            speaker_id,
            cover_letter: form.cover_letter.trim().to_string(),
            proposed_topic: form.proposed_topic,
            availability_confirmed: form.availability_confirmed,
            requested_fee_cents: form.requested_fee_cents,
            status: ApplicationStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a status change on behalf of `actor`.
    ///
    /// The poster decides (accept / reject); the speaker may only withdraw.
    pub fn change_status(
        &mut self,
        actor: &MemberId,
        poster_id: &MemberId,
        target: ApplicationStatus,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        let allowed = match target {
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => actor == poster_id,
            ApplicationStatus::Withdrawn => *actor == self.speaker_id,
            ApplicationStatus::Pending => false,
        };
        if !allowed {
            return Err(WorkflowError::Forbidden(format!(
                "Not allowed to mark this application {}",
                target
            )));
        }

        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| WorkflowError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            })?;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ApplicationForm {
        ApplicationForm {
            cover_letter: "I have given this talk at three meetups.".to_string(),
            proposed_topic: Some("Zero-cost abstractions".to_string()),
            availability_confirmed: true,
            requested_fee_cents: Some(50_000),
        }
    }

    fn pending(speaker: MemberId) -> Application {
        Application::submit(OpportunityId::new(), speaker, form(), Timestamp::now()).unwrap()
    }

    #[test]
    fn blank_cover_letter_is_rejected() {
        let mut f = form();
        f.cover_letter = "   \n".to_string();
        assert_eq!(f.validate(), Err(ValidationError::empty_field("cover_letter")));
    }

    #[test]
    fn unconfirmed_availability_is_rejected() {
        let mut f = form();
        f.availability_confirmed = false;
        let err = f.validate().unwrap_err();
        assert_eq!(err.field(), "availability_confirmed");
    }

    #[test]
    fn negative_fee_is_rejected() {
        let mut f = form();
        f.requested_fee_cents = Some(-1);
        assert!(f.validate().is_err());
    }

    #[test]
    fn poster_can_accept_pending_application() {
        let speaker = MemberId::new();
        let poster = MemberId::new();
        let mut app = pending(speaker);
        app.change_status(&poster, &poster, ApplicationStatus::Accepted, Timestamp::now())
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);
    }

    #[test]
    fn speaker_cannot_accept_own_application() {
        let speaker = MemberId::new();
        let poster = MemberId::new();
        let mut app = pending(speaker);
        let err = app
            .change_status(&speaker, &poster, ApplicationStatus::Accepted, Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[test]
    fn speaker_can_withdraw_but_poster_cannot() {
        let speaker = MemberId::new();
        let poster = MemberId::new();
        let mut app = pending(speaker);
        assert!(app
            .change_status(&poster, &poster, ApplicationStatus::Withdrawn, Timestamp::now())
            .is_err());
        app.change_status(&speaker, &poster, ApplicationStatus::Withdrawn, Timestamp::now())
            .unwrap();
        assert!(!app.status.is_active());
    }

    #[test]
    fn decided_applications_are_final() {
        let speaker = MemberId::new();
        let poster = MemberId::new();
        let mut app = pending(speaker);
        app.change_status(&poster, &poster, ApplicationStatus::Rejected, Timestamp::now())
            .unwrap();
        let err = app
            .change_status(&speaker, &poster, ApplicationStatus::Withdrawn, Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }
}
