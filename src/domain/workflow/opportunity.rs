//! Speaking opportunity entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    text_enum, MemberId, OpportunityId, OrganizationId, StateMachine, Timestamp, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Draft,
    Open,
    Closed,
    Filled,
}

text_enum!(OpportunityStatus, "status", {
    Draft => "draft",
    Open => "open",
    Closed => "closed",
    Filled => "filled",
});

impl OpportunityStatus {
    /// Statuses visible to members other than the poster.
    pub fn is_public(&self) -> bool {
        !matches!(self, OpportunityStatus::Draft)
    }
}

impl StateMachine for OpportunityStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OpportunityStatus::*;
        matches!(
            (self, target),
            (Draft, Open) | (Draft, Closed) | (Open, Closed) | (Open, Filled) | (Closed, Open)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OpportunityStatus::*;
        match self {
            Draft => vec![Open, Closed],
            Open => vec![Closed, Filled],
            Closed => vec![Open],
            Filled => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFormat {
    InPerson,
    Virtual,
    Hybrid,
}

text_enum!(EventFormat, "format", {
    InPerson => "in_person",
    Virtual => "virtual",
    Hybrid => "hybrid",
});

/// Compensation offered to the speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Compensation {
    Paid { amount_cents: i64, currency: String },
    Unpaid,
    ExpensesCovered,
    Negotiable,
}

impl Compensation {
    pub fn kind(&self) -> &'static str {
        match self {
            Compensation::Paid { .. } => "paid",
            Compensation::Unpaid => "unpaid",
            Compensation::ExpensesCovered => "expenses_covered",
            Compensation::Negotiable => "negotiable",
        }
    }

    /// Rebuilds from the stored columns.
    pub fn from_parts(
        kind: &str,
        amount_cents: Option<i64>,
        currency: Option<String>,
    ) -> Result<Self, ValidationError> {
        match kind {
            "paid" => Ok(Compensation::Paid {
                amount_cents: amount_cents
                    .ok_or_else(|| ValidationError::empty_field("compensation_amount"))?,
                currency: currency.unwrap_or_else(|| "usd".to_string()),
            }),
            "unpaid" => Ok(Compensation::Unpaid),
            "expenses_covered" => Ok(Compensation::ExpensesCovered),
            "negotiable" => Ok(Compensation::Negotiable),
            other => Err(ValidationError::invalid_format(
                "compensation",
                format!("unknown value '{}'", other),
            )),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Compensation::Paid { amount_cents, .. } = self {
            if *amount_cents <= 0 {
                return Err(ValidationError::out_of_range(
                    "compensation_amount",
                    1,
                    i64::MAX,
                    *amount_cents,
                ));
            }
        }
        Ok(())
    }
}

/// Event timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub starts_at: Timestamp,
    pub ends_at: Option<Timestamp>,
    pub application_deadline: Option<Timestamp>,
}

impl Schedule {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ends_at) = self.ends_at {
            if ends_at.is_before(&self.starts_at) {
                return Err(ValidationError::invalid_format(
                    "ends_at",
                    "must not be before the event start",
                ));
            }
        }
        if let Some(deadline) = self.application_deadline {
            if deadline.is_after(&self.starts_at) {
                return Err(ValidationError::invalid_format(
                    "application_deadline",
                    "must not be after the event start",
                ));
            }
        }
        Ok(())
    }
}

/// Fields supplied when posting an opportunity.
#[derive(Debug, Clone)]
pub struct NewOpportunity {
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    pub description: String,
    pub schedule: Schedule,
    pub format: EventFormat,
    pub location: Option<String>,
    pub topics: Vec<String>,
    pub compensation: Compensation,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: OpportunityId,
    pub poster_id: MemberId,
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    pub description: String,
    pub schedule: Schedule,
    pub format: EventFormat,
    pub location: Option<String>,
    pub topics: Vec<String>,
    pub compensation: Compensation,
    pub status: OpportunityStatus,
    /// Number of non-withdrawn applications. Maintained by storage.
    pub application_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Opportunity {
    pub fn post(
        poster_id: MemberId,
        input: NewOpportunity,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if input.description.trim().is_empty() {
            return Err(ValidationError::empty_field("description"));
        }
        if input.format != EventFormat::Virtual
            && input.location.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            return Err(ValidationError::empty_field("location"));
        }
        input.schedule.validate()?;
        input.compensation.validate()?;

        Ok(Self {
            id: OpportunityId::new(),
            poster_id,
            organization_id: input.organization_id,
            title,
            description: input.description,
            schedule: input.schedule,
            format: input.format,
            location: input.location,
            topics: input
                .topics
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            compensation: input.compensation,
            status: if input.publish {
                OpportunityStatus::Open
            } else {
                OpportunityStatus::Draft
            },
            application_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_posted_by(&self, member_id: &MemberId) -> bool {
        self.poster_id == *member_id
    }

    /// Visible to `viewer`: public statuses to everyone, drafts to the poster.
    pub fn is_visible_to(&self, viewer: &MemberId) -> bool {
        self.status.is_public() || self.is_posted_by(viewer)
    }

    pub fn accepts_applications(&self, now: Timestamp) -> bool {
        self.status == OpportunityStatus::Open
            && self
                .schedule
                .application_deadline
                .map(|d| !d.is_before(&now))
                .unwrap_or(true)
    }

    pub fn change_status(
        &mut self,
        target: OpportunityStatus,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = now;
        Ok(())
    }
}

/// Listing filters.
#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub status: Option<OpportunityStatus>,
    pub format: Option<EventFormat>,
    pub organization_id: Option<OrganizationId>,
    pub query: Option<String>,
}

impl OpportunityFilter {
    pub fn matches(&self, opp: &Opportunity, viewer: &MemberId) -> bool {
        if !opp.is_visible_to(viewer) {
            return false;
        }
        if self.status.map(|s| s != opp.status).unwrap_or(false) {
            return false;
        }
        if self.format.map(|f| f != opp.format).unwrap_or(false) {
            return false;
        }
        if self
            .organization_id
            .map(|o| Some(o) != opp.organization_id)
            .unwrap_or(false)
        {
            return false;
        }
        match &self.query {
            Some(q) => {
                let q = q.to_lowercase();
                opp.title.to_lowercase().contains(&q)
                    || opp.description.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}
