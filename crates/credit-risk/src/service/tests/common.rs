use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::accounts::{Admin, AdminId, BcryptPasswordHasher, Credentials, SessionTokens};
use crate::applications::{Application, ApplicationFields, ApplicationId, ApplicationInput};
use crate::catalog::{GroupWithItems, ItemId};
use crate::repository::{
    AdminRepository, AnswerDetail, ApplicationRepository, CatalogRepository, RepositoryError,
    Score, ScoreRepository, ScoreUpsert,
};
use crate::scoring::RiskStatus;
use crate::service::{RiskScoringService, ScoringRequest};
use crate::storage::SqliteStore;

pub(super) const PASSWORD: &str = "secret1";
/// Lowest cost bcrypt accepts, keeps hashing cheap in tests.
pub(super) const FAST_BCRYPT_COST: u32 = 4;

/// Best option in each of the seven seeded categories.
pub(super) const BEST_ANSWERS: [i64; 7] = [1, 4, 7, 10, 13, 16, 19];
/// Second option in each category: 16 + 22.75 + 12 + 13.4.
pub(super) const MIDDLE_ANSWERS: [i64; 7] = [2, 5, 8, 11, 14, 17, 20];
/// Worst option in each category: 4.5 + 10.5 + 4 + 4.
pub(super) const WORST_ANSWERS: [i64; 7] = [3, 6, 9, 12, 15, 18, 21];

pub(super) fn items(ids: &[i64]) -> Vec<ItemId> {
    ids.iter().copied().map(ItemId).collect()
}

pub(super) fn build_service() -> (Arc<RiskScoringService<SqliteStore>>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
    let service = Arc::new(fast_service(store.clone()));
    (service, store)
}

pub(super) fn fast_service<S>(store: Arc<S>) -> RiskScoringService<S>
where
    S: crate::repository::Store + 'static,
{
    RiskScoringService::new(
        store,
        Arc::new(BcryptPasswordHasher::with_cost(FAST_BCRYPT_COST)),
        Arc::new(SessionTokens::with_ttl_minutes(60)),
    )
}

pub(super) fn register<S>(service: &RiskScoringService<S>, email: &str) -> Admin
where
    S: crate::repository::Store + 'static,
{
    service
        .register(&Credentials::new(email, PASSWORD))
        .expect("registration succeeds")
}

pub(super) fn login<S>(service: &RiskScoringService<S>, email: &str) -> String
where
    S: crate::repository::Store + 'static,
{
    service
        .login(&Credentials::new(email, PASSWORD))
        .expect("login succeeds")
}

pub(super) fn application_input(number: &str) -> ApplicationInput {
    ApplicationInput {
        application_number: Some(number.to_string()),
        name: Some("Siti".to_string()),
        birth_date: Some("1988-07-21".to_string()),
        birth_place: Some("Surabaya".to_string()),
        gender: Some("female".to_string()),
        address: Some("Jl. Diponegoro No. 45".to_string()),
        postal_code: Some("60241".to_string()),
    }
}

pub(super) fn create_application<S>(
    service: &RiskScoringService<S>,
    owner: &Admin,
    number: &str,
) -> Application
where
    S: crate::repository::Store + 'static,
{
    service
        .create_application(owner, application_input(number))
        .expect("application created")
}

pub(super) fn scoring_request(application: ApplicationId, answers: &[i64]) -> ScoringRequest {
    ScoringRequest::new(application, &items(answers))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// SQLite-backed store whose submission transaction always fails.
pub(super) struct OfflineScoresStore {
    pub(super) inner: SqliteStore,
}

impl OfflineScoresStore {
    pub(super) fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("in-memory store"),
        }
    }
}

impl AdminRepository for OfflineScoresStore {
    fn insert_admin(&self, email: &str, password_hash: &str) -> Result<Admin, RepositoryError> {
        self.inner.insert_admin(email, password_hash)
    }

    fn admin_by_email(&self, email: &str) -> Result<Option<Admin>, RepositoryError> {
        self.inner.admin_by_email(email)
    }

    fn admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        self.inner.admin(id)
    }
}

impl ApplicationRepository for OfflineScoresStore {
    fn insert_application(
        &self,
        owner: AdminId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError> {
        self.inner.insert_application(owner, fields)
    }

    fn update_application(
        &self,
        id: ApplicationId,
        fields: &ApplicationFields,
    ) -> Result<Application, RepositoryError> {
        self.inner.update_application(id, fields)
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.inner.delete_application(id)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.application(id)
    }

    fn applications_for(&self, owner: AdminId) -> Result<Vec<Application>, RepositoryError> {
        self.inner.applications_for(owner)
    }
}

impl CatalogRepository for OfflineScoresStore {
    fn list_groups_with_items(&self) -> Result<Vec<GroupWithItems>, RepositoryError> {
        self.inner.list_groups_with_items()
    }
}

impl ScoreRepository for OfflineScoresStore {
    fn replace_answers(
        &self,
        _application: ApplicationId,
        _items: &[ItemId],
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn upsert_score(
        &self,
        _application: ApplicationId,
        _total_score: f64,
        _status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn record_submission(
        &self,
        _application: ApplicationId,
        _items: &[ItemId],
        _total_score: f64,
        _status: RiskStatus,
    ) -> Result<ScoreUpsert, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn score(&self, application: ApplicationId) -> Result<Option<Score>, RepositoryError> {
        self.inner.score(application)
    }

    fn scores_for(&self, owner: AdminId) -> Result<Vec<Score>, RepositoryError> {
        self.inner.scores_for(owner)
    }

    fn answer_details(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<AnswerDetail>, RepositoryError> {
        self.inner.answer_details(application)
    }
}
