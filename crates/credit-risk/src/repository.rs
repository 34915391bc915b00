//! Storage abstractions so the service can be exercised against any backend.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::accounts::{Admin, AdminId};
use crate::applications::{Application, ApplicationFields, ApplicationId};
use crate::catalog::{Group, GroupWithItems, Item, ItemId};
use crate::scoring::RiskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScoreId(pub i64);

/// Persisted score of an application. At most one exists per application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub id: ScoreId,
    pub application_id: ApplicationId,
    pub total_score: f64,
    pub status: RiskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of an upsert: the stored score and whether it was newly created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreUpsert {
    pub score: Score,
    pub created: bool,
}

/// A recorded answer joined with its item and the item's group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerDetail {
    pub id: i64,
    pub application_id: ApplicationId,
    pub item_id: ItemId,
    pub item: Item,
    pub group: Group,
}

pub trait AdminRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the email is taken.
    fn insert_admin(&self, email: &str, password_hash: &str) -> Result<Admin, RepositoryError>;
    fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, RepositoryError>;
    fn admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the application number is taken.
    fn insert_application(
        &self,
        owner: AdminId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError>;
    fn update_application(
        &self,
        id: ApplicationId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError>;
    /// Removes the application together with its answers and score.
    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Applications owned by `owner`, ordered by id.
    fn applications_for(&self, owner: AdminId) -> Result<Vec<Application>, RepositoryError>;
}

pub trait CatalogRepository: Send + Sync {
    /// Groups by ascending id, each with its items by ascending id.
    fn list_groups_with_items(&self) -> Result<Vec<GroupWithItems>, RepositoryError>;
}

pub trait ScoreRepository: Send + Sync {
    /// Discards every answer of the application and records `items` instead.
    fn replace_answers(
        &self,
        application: ApplicationId,
        items: &[ItemId],
    ) -> Result<(), RepositoryError>;
    /// Updates the existing score in place or creates it.
    fn upsert_score(
        &self,
        application: ApplicationId,
        total_score: f64,
        status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError>;
    /// [`Self::replace_answers`] and [`Self::upsert_score`] in one transaction.
    fn record_submission(
        &self,
        application: ApplicationId,
        items: &[ItemId],
        total_score: f64,
        status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError>;
    fn score(&self, application: ApplicationId) -> Result<Option<Score>, RepositoryError>;
    /// Scores of every application owned by `owner`.
    fn scores_for(&self, owner: AdminId) -> Result<Vec<Score>, RepositoryError>;
    fn answer_details(&self, application: ApplicationId)
        -> Result<Vec<AnswerDetail>, RepositoryError>;
}

/// Everything the scoring service needs from storage.
pub trait Store: AdminRepository + ApplicationRepository + CatalogRepository + ScoreRepository {}

impl<T> Store for T where
    T: AdminRepository + ApplicationRepository + CatalogRepository + ScoreRepository
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
