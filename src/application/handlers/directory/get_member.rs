//! Member directory queries.

use std::sync::Arc;

use crate::domain::directory::{Member, MemberFilter};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Page, PageResult};
use crate::ports::MemberRepository;

#[derive(Debug, Clone)]
pub struct GetMemberQuery {
    pub member_id: MemberId,
}

pub struct GetMemberHandler {
    members: Arc<dyn MemberRepository>,
}

impl GetMemberHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, query: GetMemberQuery) -> Result<Member, DomainError> {
        self.members
            .find_by_id(&query.member_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::MemberNotFound, "Member not found"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListMembersQuery {
    pub filter: MemberFilter,
    pub page: Page,
}

pub struct ListMembersHandler {
    members: Arc<dyn MemberRepository>,
}

impl ListMembersHandler {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn handle(&self, query: ListMembersQuery) -> Result<PageResult<Member>, DomainError> {
        self.members.list(&query.filter, query.page).await
    }
}
