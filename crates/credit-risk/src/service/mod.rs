//! Service composing accounts, applications, the catalog and the scoring pipeline.

mod locks;

#[cfg(test)]
mod tests;

pub use locks::ApplicationLocks;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info};

use crate::accounts::{
    bearer_token, Admin, AuthError, BcryptPasswordHasher, Credentials, PasswordHashError,
    PasswordHasher, SessionTokens, TokenAuthority,
};
use crate::applications::{
    Application, ApplicationDetailView, ApplicationId, ApplicationInput, ApplicationSummaryView,
    ScoreSummary, ScoringDetailView, SubmissionView,
};
use crate::catalog::{Catalog, ItemId};
use crate::error::ValidationError;
use crate::repository::{RepositoryError, Store};
use crate::scoring::{classify, compute_score, validate_selection, SelectionError};

/// One selected item in a scoring submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub item_id: ItemId,
}

/// Body of a scoring submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

impl ScoringRequest {
    pub fn new(application_id: ApplicationId, items: &[ItemId]) -> Self {
        Self {
            application_id: Some(application_id),
            answers: items
                .iter()
                .map(|item_id| AnswerInput { item_id: *item_id })
                .collect(),
        }
    }
}

/// Entry point for every operation exposed over HTTP and the CLI.
pub struct RiskScoringService<S> {
    store: Arc<S>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenAuthority>,
    locks: ApplicationLocks,
}

impl<S> RiskScoringService<S>
where
    S: Store + 'static,
{
    pub fn new(
        store: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenAuthority>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            locks: ApplicationLocks::default(),
        }
    }

    /// Bcrypt passwords and in-memory session tokens.
    pub fn with_defaults(store: Arc<S>, token_ttl_minutes: i64) -> Self {
        Self::new(
            store,
            Arc::new(BcryptPasswordHasher::default()),
            Arc::new(SessionTokens::with_ttl_minutes(token_ttl_minutes)),
        )
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn register(&self, credentials: &Credentials) -> Result<Admin, ServiceError> {
        let registration = credentials.validate_registration()?;
        let hash = self.hasher.hash(&registration.password)?;
        let admin = self.store.insert_admin(&registration.email, &hash)?;
        info!(admin_id = admin.id.0, "admin registered");
        Ok(admin)
    }

    /// Verifies credentials and issues an access token.
    pub fn login(&self, credentials: &Credentials) -> Result<String, ServiceError> {
        let (email, password) = credentials.login_fields()?;
        let admin = self
            .store
            .admin_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify(password, &admin.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }
        debug!(admin_id = admin.id.0, "admin logged in");
        Ok(self.tokens.issue(admin.id))
    }

    /// Resolves an `Authorization` header value to a still-existing admin.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Admin, ServiceError> {
        let token = bearer_token(authorization)?;
        let admin_id = self.tokens.authenticate(token)?;
        let admin = self
            .store
            .admin(admin_id)?
            .ok_or(AuthError::InvalidToken)?;
        Ok(admin)
    }

    pub fn create_application(
        &self,
        owner: &Admin,
        input: ApplicationInput,
    ) -> Result<Application, ServiceError> {
        let fields = input.validate(today())?;
        let application = self.store.insert_application(owner.id, &fields)?;
        info!(
            application_id = application.id.0,
            owner_id = owner.id.0,
            "application created"
        );
        Ok(application)
    }

    pub fn list_applications(
        &self,
        owner: &Admin,
    ) -> Result<Vec<ApplicationSummaryView>, ServiceError> {
        let applications = self.store.applications_for(owner.id)?;
        let scores: HashMap<ApplicationId, ScoreSummary> = self
            .store
            .scores_for(owner.id)?
            .iter()
            .map(|score| (score.application_id, ScoreSummary::from(score)))
            .collect();

        Ok(applications
            .into_iter()
            .map(|application| ApplicationSummaryView {
                score: scores.get(&application.id).copied(),
                application,
            })
            .collect())
    }

    pub fn get_application(
        &self,
        owner: &Admin,
        id: ApplicationId,
    ) -> Result<ApplicationDetailView, ServiceError> {
        let application = self.owned_application(owner, id)?;
        let score = self.store.score(id)?;
        Ok(ApplicationDetailView { application, score })
    }

    /// Partial update: omitted fields keep their stored values.
    pub fn update_application(
        &self,
        owner: &Admin,
        id: ApplicationId,
        input: ApplicationInput,
    ) -> Result<Application, ServiceError> {
        let existing = self.owned_application(owner, id)?;
        let fields = input.merged_over(&existing).validate(today())?;
        Ok(self.store.update_application(id, &fields)?)
    }

    pub fn delete_application(&self, owner: &Admin, id: ApplicationId) -> Result<(), ServiceError> {
        self.locks.with_lock(id, || -> Result<(), ServiceError> {
            self.owned_application(owner, id)?;
            self.store.delete_application(id)?;
            info!(application_id = id.0, "application deleted");
            Ok(())
        })
    }

    /// Freshly loaded weight catalog.
    pub fn catalog(&self) -> Result<Catalog, ServiceError> {
        Ok(Catalog::new(self.store.list_groups_with_items()?))
    }

    /// Validates, scores and persists a submission for one application.
    ///
    /// The whole pipeline runs under the application's lock, the catalog is reloaded for
    /// every call, and answers and score are written in a single storage transaction, so
    /// a rejected or failed submission leaves previous answers and score untouched.
    pub fn submit_scoring(
        &self,
        owner: &Admin,
        request: ScoringRequest,
    ) -> Result<SubmissionView, ServiceError> {
        let application_id = request.application_id.ok_or_else(|| {
            ValidationError::new("applicationId", "Application ID is required")
        })?;
        let submitted: Vec<ItemId> = request.answers.iter().map(|answer| answer.item_id).collect();

        self.locks.with_lock(application_id, || -> Result<SubmissionView, ServiceError> {
            self.owned_application(owner, application_id)?;

            let catalog = self.catalog()?;
            let selection = validate_selection(&catalog, &submitted)?;
            let breakdown = compute_score(catalog.groups(), selection.items());
            let status = classify(breakdown.total_score);

            let upsert = self.store.record_submission(
                application_id,
                &selection.item_ids(),
                breakdown.total_score,
                status,
            )?;

            info!(
                application_id = application_id.0,
                total_score = upsert.score.total_score,
                status = %upsert.score.status,
                created = upsert.created,
                "scoring recorded"
            );

            Ok(SubmissionView::new(
                upsert.score.total_score,
                upsert.score.status,
                upsert.created,
            ))
        })
    }

    pub fn scoring_details(
        &self,
        owner: &Admin,
        id: ApplicationId,
    ) -> Result<ScoringDetailView, ServiceError> {
        let application = self.owned_application(owner, id)?;
        let score = self
            .store
            .score(id)?
            .ok_or(ServiceError::NotFound("Score not available yet"))?;
        let details = self.store.answer_details(id)?;
        Ok(ScoringDetailView {
            application,
            score,
            details,
        })
    }

    fn owned_application(
        &self,
        owner: &Admin,
        id: ApplicationId,
    ) -> Result<Application, ServiceError> {
        self.store
            .application(id)?
            .filter(|application| application.owner_id == owner.id)
            .ok_or(ServiceError::NotFound("Application not found"))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::Selection(_)
            | ServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) | ServiceError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Repository(RepositoryError::Unavailable(_))
            | ServiceError::Hashing(_)
            | ServiceError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Repository(RepositoryError::Unavailable(_))
            | ServiceError::Hashing(_)
            | ServiceError::Worker(_) => "Internal server error".to_string(),
            ServiceError::Repository(RepositoryError::NotFound) => "Record not found".to_string(),
            other => other.to_string(),
        }
    }
}
