use super::common::*;

use crate::buyers::domain::{BuyerSource, BuyerUpdate};
use crate::buyers::repository::BuyerRepository;
use crate::buyers::service::{BuyerServiceError, UpsertOutcome};

#[tokio::test]
async fn create_normalizes_email_and_trims_phone() {
    let (service, _) = build_service();

    let buyer = service
        .create(draft(), BuyerSource::ManualEntry)
        .await
        .expect("create succeeds");

    assert_eq!(buyer.email, "avery.sutton@example.com");
    assert_eq!(buyer.phone, "515-555-0101");
    assert_eq!(buyer.source, BuyerSource::ManualEntry);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (service, _) = build_service();
    service
        .create(draft(), BuyerSource::ManualEntry)
        .await
        .expect("first create succeeds");

    let mut dup = second_draft();
    dup.email = "AVERY.SUTTON@example.com".to_string();

    match service.create(dup, BuyerSource::ManualEntry).await {
        Err(BuyerServiceError::DuplicateEmail) => {}
        other => panic!("expected duplicate email rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_phone_is_rejected() {
    let (service, _) = build_service();
    service
        .create(draft(), BuyerSource::ManualEntry)
        .await
        .expect("first create succeeds");

    let mut dup = second_draft();
    dup.phone = "515-555-0101".to_string();

    match service.create(dup, BuyerSource::ManualEntry).await {
        Err(BuyerServiceError::DuplicatePhone) => {}
        other => panic!("expected duplicate phone rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_fields_are_reported_together() {
    let (service, _) = build_service();
    let mut bad = draft();
    bad.first_name = "  ".to_string();
    bad.email = String::new();

    match service.create(bad, BuyerSource::ManualEntry).await {
        Err(BuyerServiceError::MissingFields(fields)) => {
            assert!(fields.contains("first_name"));
            assert!(fields.contains("email"));
        }
        other => panic!("expected missing fields error, got {other:?}"),
    }
}

#[tokio::test]
async fn update_rejects_contact_owned_by_another_buyer() {
    let (service, _) = build_service();
    let first = service
        .create(draft(), BuyerSource::ManualEntry)
        .await
        .expect("first create");
    let second = service
        .create(second_draft(), BuyerSource::ManualEntry)
        .await
        .expect("second create");

    let update = BuyerUpdate {
        email: Some(first.email.clone()),
        ..BuyerUpdate::default()
    };

    match service.update(&second.id, update).await {
        Err(BuyerServiceError::DuplicateEmail) => {}
        other => panic!("expected duplicate email rejection, got {other:?}"),
    }

    // Re-submitting a buyer's own email is not a conflict.
    let update = BuyerUpdate {
        email: Some(first.email.clone()),
        ..BuyerUpdate::default()
    };
    service
        .update(&first.id, update)
        .await
        .expect("self-update succeeds");
}

#[tokio::test]
async fn vip_signup_creates_then_updates() {
    let (service, repository) = build_service();

    let (created, outcome) = service
        .vip_signup(crate::buyers::domain::VipSignup {
            first_name: "Avery".to_string(),
            last_name: "Sutton".to_string(),
            email: "avery.sutton@example.com".to_string(),
            phone: "515-555-0101".to_string(),
            buyer_type: crate::buyers::domain::BuyerType::Investor,
            preferred_areas: vec!["Ankeny".to_string()],
        })
        .await
        .expect("vip create succeeds");

    assert_eq!(outcome, UpsertOutcome::Created);
    assert_eq!(created.source, BuyerSource::VipBuyersList);

    let (updated, outcome) = service
        .vip_signup(crate::buyers::domain::VipSignup {
            first_name: "Avery".to_string(),
            last_name: "Sutton-Reyes".to_string(),
            email: "AVERY.SUTTON@example.com".to_string(),
            phone: "515-555-0101".to_string(),
            buyer_type: crate::buyers::domain::BuyerType::CashBuyer,
            preferred_areas: vec!["Ankeny".to_string(), "Waukee".to_string()],
        })
        .await
        .expect("vip update succeeds");

    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.last_name, "Sutton-Reyes");
    assert_eq!(updated.source, BuyerSource::VipBuyersList);
    assert_eq!(repository.list().await.expect("list").len(), 1);
}

#[tokio::test]
async fn delete_of_unknown_buyer_is_not_found() {
    let (service, _) = build_service();
    match service
        .delete(&crate::buyers::domain::BuyerId("missing".to_string()))
        .await
    {
        Err(BuyerServiceError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
