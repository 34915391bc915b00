use super::common::*;
use crate::accounts::{AuthError, BcryptPasswordHasher, Credentials, SessionTokens};
use crate::applications::ApplicationInput;
use crate::repository::{RepositoryError, ScoreRepository};
use crate::scoring::{RiskStatus, SelectionError};
use crate::service::{RiskScoringService, ScoringRequest, ServiceError};
use std::collections::BTreeSet;
use std::sync::Arc;

#[test]
fn first_submission_creates_and_resubmission_updates() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-100");

    let first = service
        .submit_scoring(&admin, scoring_request(application.id, &BEST_ANSWERS))
        .expect("first submission");
    assert!(first.created);
    assert_eq!(first.message, "Scoring saved");
    assert_close(first.score.total_score, 100.0);
    assert_eq!(first.score.status, RiskStatus::LowRisk);

    let stored = store.score(application.id).expect("read").expect("score");

    let second = service
        .submit_scoring(&admin, scoring_request(application.id, &WORST_ANSWERS))
        .expect("second submission");
    assert!(!second.created);
    assert_eq!(second.message, "Scoring updated");
    assert_close(second.score.total_score, 23.0);
    assert_eq!(second.score.risk_level, RiskStatus::HighRisk);

    let updated = store.score(application.id).expect("read").expect("score");
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.created_at, stored.created_at);
    assert_eq!(updated.status, RiskStatus::HighRisk);
    assert_eq!(store.scores_for(admin.id).expect("scores").len(), 1);
}

#[test]
fn identical_resubmission_is_idempotent() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-101");

    let first = service
        .submit_scoring(&admin, scoring_request(application.id, &MIDDLE_ANSWERS))
        .expect("first submission");
    let second = service
        .submit_scoring(&admin, scoring_request(application.id, &MIDDLE_ANSWERS))
        .expect("second submission");

    assert_eq!(
        first.score.total_score.to_bits(),
        second.score.total_score.to_bits()
    );
    assert_close(second.score.total_score, 64.15);
    assert_eq!(second.score.status, RiskStatus::MediumRisk);

    let details = store.answer_details(application.id).expect("details");
    assert_eq!(details.len(), MIDDLE_ANSWERS.len());
    let categories: BTreeSet<_> = details
        .iter()
        .map(|detail| detail.item.category_key())
        .collect();
    assert_eq!(categories.len(), details.len());
}

#[test]
fn incomplete_submission_leaves_previous_state_untouched() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-102");
    service
        .submit_scoring(&admin, scoring_request(application.id, &BEST_ANSWERS))
        .expect("first submission");

    let err = service
        .submit_scoring(&admin, scoring_request(application.id, &WORST_ANSWERS[..6]))
        .expect_err("incomplete selection rejected");
    assert!(matches!(
        err,
        ServiceError::Selection(SelectionError::IncompleteSelection {
            expected: 7,
            answered: 6
        })
    ));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

    let score = store.score(application.id).expect("read").expect("score");
    assert_close(score.total_score, 100.0);
    let answered: Vec<i64> = store
        .answer_details(application.id)
        .expect("details")
        .iter()
        .map(|detail| detail.item_id.0)
        .collect();
    assert_eq!(answered, BEST_ANSWERS.to_vec());
}

#[test]
fn two_answers_in_one_category_are_rejected() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-103");

    let mut answers = BEST_ANSWERS.to_vec();
    answers[1] = 2;
    let err = service
        .submit_scoring(&admin, scoring_request(application.id, &answers))
        .expect_err("duplicate category rejected");
    assert!(matches!(
        err,
        ServiceError::Selection(SelectionError::DuplicateCategory { .. })
    ));
}

#[test]
fn submission_requires_application_id() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");

    let err = service
        .submit_scoring(&admin, ScoringRequest::default())
        .expect_err("missing application id");
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(err.public_message(), "Application ID is required");
}

#[test]
fn applications_of_other_admins_are_not_found() {
    let (service, _) = build_service();
    let owner = register(&service, "owner@lender.co.id");
    let intruder = register(&service, "intruder@lender.co.id");
    let application = create_application(&service, &owner, "APP-104");

    let err = service
        .get_application(&intruder, application.id)
        .expect_err("foreign application hidden");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    assert_eq!(err.public_message(), "Application not found");

    let err = service
        .submit_scoring(&intruder, scoring_request(application.id, &BEST_ANSWERS))
        .expect_err("foreign submission rejected");
    assert!(matches!(err, ServiceError::NotFound("Application not found")));

    assert!(service
        .list_applications(&intruder)
        .expect("list")
        .is_empty());
}

#[test]
fn scoring_details_require_a_score() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-105");

    let err = service
        .scoring_details(&admin, application.id)
        .expect_err("no score yet");
    assert!(matches!(err, ServiceError::NotFound("Score not available yet")));

    service
        .submit_scoring(&admin, scoring_request(application.id, &MIDDLE_ANSWERS))
        .expect("submission");
    let view = service
        .scoring_details(&admin, application.id)
        .expect("details");
    assert_eq!(view.application.id, application.id);
    assert_eq!(view.score.status, RiskStatus::MediumRisk);
    assert_eq!(view.details.len(), 7);
    assert_eq!(view.details[0].group.name, "Character");
}

#[test]
fn listing_annotates_scored_applications_only() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let scored = create_application(&service, &admin, "APP-106");
    let pending = create_application(&service, &admin, "APP-107");
    service
        .submit_scoring(&admin, scoring_request(scored.id, &WORST_ANSWERS))
        .expect("submission");

    let listing = service.list_applications(&admin).expect("list");
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].application.id, scored.id);
    assert_eq!(
        listing[0].score.map(|score| score.status),
        Some(RiskStatus::HighRisk)
    );
    assert_eq!(listing[1].application.id, pending.id);
    assert!(listing[1].score.is_none());
}

#[test]
fn partial_update_keeps_omitted_fields() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-108");

    let updated = service
        .update_application(
            &admin,
            application.id,
            ApplicationInput {
                name: Some("Rina".to_string()),
                ..ApplicationInput::default()
            },
        )
        .expect("update");
    assert_eq!(updated.name, "Rina");
    assert_eq!(updated.address, application.address);
    assert_eq!(updated.application_number, "APP-108");

    let err = service
        .update_application(
            &admin,
            application.id,
            ApplicationInput {
                postal_code: Some("1234".to_string()),
                ..ApplicationInput::default()
            },
        )
        .expect_err("invalid merged record");
    assert_eq!(err.public_message(), "Postal code must be exactly 5 digits");
}

#[test]
fn duplicate_application_number_is_a_conflict() {
    let (service, _) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    create_application(&service, &admin, "APP-109");

    let err = service
        .create_application(&admin, application_input("APP-109"))
        .expect_err("duplicate number");
    assert!(matches!(
        err,
        ServiceError::Repository(RepositoryError::Conflict(_))
    ));
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(
        err.public_message(),
        "Application number is already registered"
    );
}

#[test]
fn deleting_an_application_removes_its_score() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-110");
    service
        .submit_scoring(&admin, scoring_request(application.id, &BEST_ANSWERS))
        .expect("submission");

    service
        .delete_application(&admin, application.id)
        .expect("delete");

    assert!(store.score(application.id).expect("read").is_none());
    assert!(store
        .answer_details(application.id)
        .expect("details")
        .is_empty());
    let err = service
        .delete_application(&admin, application.id)
        .expect_err("already deleted");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}

#[test]
fn login_and_authentication_round_trip() {
    let (service, _) = build_service();
    let admin = register(&service, "Analyst@Lender.co.id");
    assert_eq!(admin.email, "analyst@lender.co.id");

    let token = login(&service, "analyst@lender.co.id");
    let header = format!("Bearer {token}");
    let authenticated = service
        .authenticate(Some(&header))
        .expect("token accepted");
    assert_eq!(authenticated.id, admin.id);

    let err = service
        .login(&Credentials::new("analyst@lender.co.id", "wrong12"))
        .expect_err("bad password");
    assert!(matches!(
        err,
        ServiceError::Auth(AuthError::InvalidCredentials)
    ));

    let err = service
        .authenticate(Some("Bearer not-a-token"))
        .expect_err("unknown token");
    assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn duplicate_registration_is_rejected() {
    let (service, _) = build_service();
    register(&service, "analyst@lender.co.id");

    let err = service
        .register(&Credentials::new("analyst@lender.co.id", PASSWORD))
        .expect_err("email taken");
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(err.public_message(), "Email is already registered");
}

#[test]
fn failed_submission_transaction_surfaces_as_internal_error() {
    let store = Arc::new(OfflineScoresStore::new());
    let service = fast_service(store.clone());
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-111");

    let err = service
        .submit_scoring(&admin, scoring_request(application.id, &BEST_ANSWERS))
        .expect_err("storage offline");
    assert_eq!(
        err.status_code(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(err.public_message(), "Internal server error");
    assert!(store.inner.score(application.id).expect("read").is_none());
}

#[test]
fn concurrent_submissions_leave_one_score() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");
    let application = create_application(&service, &admin, "APP-112");

    let handles: Vec<_> = (0..6)
        .map(|round| {
            let service = service.clone();
            let admin = admin.clone();
            let answers = if round % 2 == 0 {
                BEST_ANSWERS
            } else {
                WORST_ANSWERS
            };
            std::thread::spawn(move || {
                service
                    .submit_scoring(&admin, scoring_request(application.id, &answers))
                    .expect("submission")
            })
        })
        .collect();
    let created = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .filter(|view| view.created)
        .count();

    assert_eq!(created, 1);
    assert_eq!(store.scores_for(admin.id).expect("scores").len(), 1);
    assert_eq!(
        store
            .answer_details(application.id)
            .expect("details")
            .len(),
        7
    );
}

#[test]
fn passwords_are_stored_as_bcrypt_hashes() {
    let (service, store) = build_service();
    let admin = register(&service, "analyst@lender.co.id");

    assert!(admin.password_hash.starts_with("$2b$"), "{}", admin.password_hash);
    assert!(!admin.password_hash.contains(PASSWORD));
    let stored = crate::repository::AdminRepository::admin(store.as_ref(), admin.id)
        .expect("read")
        .expect("admin");
    assert_eq!(stored.password_hash, admin.password_hash);
    login(&service, "analyst@lender.co.id");
}

#[test]
fn hashing_failure_is_an_internal_error_and_stores_nothing() {
    let store = Arc::new(crate::storage::SqliteStore::open_in_memory().expect("store"));
    let service = RiskScoringService::new(
        store.clone(),
        Arc::new(BcryptPasswordHasher::with_cost(2)),
        Arc::new(SessionTokens::with_ttl_minutes(60)),
    );

    let err = service
        .register(&Credentials::new("analyst@lender.co.id", PASSWORD))
        .expect_err("cost out of range");
    assert!(matches!(err, ServiceError::Hashing(_)));
    assert_eq!(
        err.status_code(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(err.public_message(), "Internal server error");
    assert!(
        crate::repository::AdminRepository::admin_by_email(store.as_ref(), "analyst@lender.co.id")
            .expect("read")
            .is_none()
    );
}
