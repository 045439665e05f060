//! Scenario tests for token issuance and redemption

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::appointment::AppointmentStatus;
use crate::domain::entities::qr_token::{QrToken, TokenPurpose};
use crate::domain::value_objects::{CallerIdentity, RedemptionOutcome};
use crate::errors::{DomainError, TokenError};
use crate::repositories::qr_token::{MockQrTokenRepository, QrTokenRepository};
use crate::services::qr::{
    ActionHandler, ActionRegistry, IssueRequest, QrServiceConfig, QrTokenService,
};

use super::fixtures::{harness_at, local, seed_appointment, utc};

fn check_in_request(appointment_id: Uuid) -> IssueRequest {
    IssueRequest {
        purpose: TokenPurpose::CheckIn,
        appointment_id: Some(appointment_id),
        duration_minutes: None,
    }
}

fn ad_hoc_request(purpose: TokenPurpose, minutes: Option<i64>) -> IssueRequest {
    IssueRequest {
        purpose,
        appointment_id: None,
        duration_minutes: minutes,
    }
}

#[tokio::test]
async fn test_issue_inside_pre_window_expires_at_end_of_grace() {
    // Appointment at 14:00 local; request at 13:35 local, five minutes
    // inside the 30-minute pre-window
    let harness = harness_at(utc(11, 35));
    let appointment = seed_appointment(&harness).await;

    let issued = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    // Redeemable through 15:00 local
    assert_eq!(issued.token.expires_at, utc(13, 0));
    assert!(!issued.reused);
    assert!(issued.redeem_url.ends_with(&issued.token.token));
}

#[tokio::test]
async fn test_issue_before_window_reports_opening_time() {
    // Request at 13:20 local, ten minutes before the window opens
    let harness = harness_at(utc(11, 20));
    let appointment = seed_appointment(&harness).await;

    let err = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap_err();

    match err {
        DomainError::Token(TokenError::OutOfWindowTooEarly { available_at }) => {
            assert_eq!(available_at.naive_local(), local(13, 30));
        }
        other => panic!("expected OutOfWindowTooEarly, got {other:?}"),
    }
}

#[tokio::test]
async fn test_issue_after_window_is_rejected() {
    // Request at 15:10 local, past the 60-minute grace
    let harness = harness_at(utc(13, 10));
    let appointment = seed_appointment(&harness).await;

    let err = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap_err();

    match err {
        DomainError::Token(TokenError::OutOfWindowTooLate { closed_at }) => {
            assert_eq!(closed_at.naive_local(), local(15, 0));
        }
        other => panic!("expected OutOfWindowTooLate, got {other:?}"),
    }
}

#[tokio::test]
async fn test_check_in_issue_requires_a_subject() {
    let harness = harness_at(utc(11, 35));

    let err = harness
        .service
        .issue(
            ad_hoc_request(TokenPurpose::CheckIn, None),
            &CallerIdentity::user(Uuid::new_v4()),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Token(TokenError::SubjectRequired { .. })
    ));
}

#[tokio::test]
async fn test_issue_for_unknown_appointment_is_not_found() {
    let harness = harness_at(utc(11, 35));

    let err = harness
        .service
        .issue(
            check_in_request(Uuid::new_v4()),
            &CallerIdentity::user(Uuid::new_v4()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_only_parties_or_privileged_callers_may_issue() {
    let harness = harness_at(utc(11, 35));
    let appointment = seed_appointment(&harness).await;

    // A stranger is refused
    let err = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(Uuid::new_v4()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    // The professional is a party
    harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.professional_id),
        )
        .await
        .unwrap();

    // A privileged stranger may issue for anyone
    harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::privileged(Uuid::new_v4()),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_repeated_issue_reuses_the_same_token() {
    let harness = harness_at(utc(11, 35));
    let appointment = seed_appointment(&harness).await;
    let caller = CallerIdentity::user(appointment.client_id);

    let first = harness
        .service
        .issue(check_in_request(appointment.id), &caller)
        .await
        .unwrap();
    let second = harness
        .service
        .issue(check_in_request(appointment.id), &caller)
        .await
        .unwrap();

    assert_eq!(first.token.token, second.token.token);
    assert!(second.reused);
    assert_eq!(harness.tokens.len().await, 1);
}

#[tokio::test]
async fn test_schedule_change_discards_and_remints() {
    let harness = harness_at(utc(11, 35));
    let mut appointment = seed_appointment(&harness).await;
    let caller = CallerIdentity::user(appointment.client_id);

    let first = harness
        .service
        .issue(check_in_request(appointment.id), &caller)
        .await
        .unwrap();

    // The appointment moves from 14:00 to 16:00 local
    appointment.scheduled_at = local(16, 0);
    harness.appointments.update(appointment.clone()).await;
    harness.clock.set(utc(13, 40));

    let second = harness
        .service
        .issue(check_in_request(appointment.id), &caller)
        .await
        .unwrap();

    assert_ne!(first.token.token, second.token.token);
    assert_eq!(second.token.expires_at, utc(15, 0));
    assert_eq!(harness.tokens.len().await, 1);

    // The discarded token no longer exists
    let outcome = harness.service.redeem(&first.token.token).await.unwrap();
    assert_eq!(outcome, RedemptionOutcome::Unknown);
}

#[tokio::test]
async fn test_ad_hoc_reuse_tolerance_boundary() {
    let harness = harness_at(utc(10, 0));
    let appointment = seed_appointment(&harness).await;
    let caller = CallerIdentity::user(appointment.client_id);
    let request = IssueRequest {
        purpose: TokenPurpose::SpecialOffer,
        appointment_id: Some(appointment.id),
        duration_minutes: Some(60),
    };

    let first = harness.service.issue(request.clone(), &caller).await.unwrap();

    // 30 seconds later the recomputed expiry drifts by 30s: reuse
    harness.clock.advance(Duration::seconds(30));
    let second = harness.service.issue(request.clone(), &caller).await.unwrap();
    assert_eq!(first.token.token, second.token.token);
    assert!(second.reused);

    // Two more minutes push the drift past the 60s tolerance: remint
    harness.clock.advance(Duration::minutes(2));
    let third = harness.service.issue(request, &caller).await.unwrap();
    assert_ne!(first.token.token, third.token.token);
    assert!(!third.reused);
}

#[tokio::test]
async fn test_redeem_valid_check_in_marks_attended_exactly_once() {
    let harness = harness_at(utc(11, 35));
    let appointment = seed_appointment(&harness).await;

    let issued = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    // Scan at 14:10 local
    harness.clock.set(utc(12, 10));
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    match outcome {
        RedemptionOutcome::Success { purpose, message } => {
            assert_eq!(purpose, TokenPurpose::CheckIn);
            assert!(message.contains("Check-in confirmed"));
        }
        other => panic!("expected Success, got {other:?}"),
    }

    assert_eq!(
        harness.appointments.get(appointment.id).await.unwrap().status,
        AppointmentStatus::Attended
    );

    let stored = harness
        .tokens
        .find_by_token(&issued.token.token)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.consumed);
    assert_eq!(stored.used_at, Some(utc(12, 10)));

    // A second scan a minute later is rejected without side effects
    harness.clock.set(utc(12, 11));
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    assert_eq!(
        outcome,
        RedemptionOutcome::AlreadyUsed {
            used_at: Some(utc(12, 10))
        }
    );
    assert_eq!(
        harness.appointments.get(appointment.id).await.unwrap().status,
        AppointmentStatus::Attended
    );
}

#[tokio::test]
async fn test_redeem_unknown_token() {
    let harness = harness_at(utc(12, 0));
    let outcome = harness.service.redeem("no-such-token").await.unwrap();
    assert_eq!(outcome, RedemptionOutcome::Unknown);
}

#[tokio::test]
async fn test_expired_check_in_records_no_show_on_read() {
    let harness = harness_at(utc(11, 35));
    let appointment = seed_appointment(&harness).await;

    let issued = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    // First scan happens at 15:05 local, five minutes past the grace
    harness.clock.set(utc(13, 5));
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    match outcome {
        RedemptionOutcome::Expired {
            expired_at,
            scanned_at,
        } => {
            assert_eq!(expired_at.naive_local(), local(15, 0));
            assert_eq!(scanned_at.naive_local(), local(15, 5));
        }
        other => panic!("expected Expired, got {other:?}"),
    }

    // The missed check-in became a no-show and the token is closed
    assert_eq!(
        harness.appointments.get(appointment.id).await.unwrap().status,
        AppointmentStatus::NoShow
    );
    let stored = harness
        .tokens
        .find_by_token(&issued.token.token)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.consumed);

    // Subsequent scans see the closed token
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::AlreadyUsed { .. }));
}

#[tokio::test]
async fn test_processing_failure_leaves_token_redeemable() {
    let harness = harness_at(utc(11, 35));
    let mut appointment = seed_appointment(&harness).await;

    let issued = harness
        .service
        .issue(
            check_in_request(appointment.id),
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    // The appointment was cancelled out from under the token
    appointment.status = AppointmentStatus::Cancelled;
    harness.appointments.update(appointment.clone()).await;

    harness.clock.set(utc(12, 10));
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    match &outcome {
        RedemptionOutcome::ProcessingFailed { message } => {
            assert!(message.contains("cancelled"));
        }
        other => panic!("expected ProcessingFailed, got {other:?}"),
    }
    assert!(!outcome.is_terminal());

    // The token did not burn; once the appointment is restored the same
    // code redeems fine
    let stored = harness
        .tokens
        .find_by_token(&issued.token.token)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.consumed);

    appointment.status = AppointmentStatus::Scheduled;
    harness.appointments.update(appointment).await;

    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::Success { .. }));
}

#[tokio::test]
async fn test_ad_hoc_special_offer_scenario() {
    let harness = harness_at(utc(10, 0));
    let caller = CallerIdentity::user(Uuid::new_v4());

    let first = harness
        .service
        .issue(ad_hoc_request(TokenPurpose::SpecialOffer, Some(60)), &caller)
        .await
        .unwrap();
    assert_eq!(first.token.expires_at, utc(11, 0));

    // Scanned one minute past the hour: expired
    harness.clock.set(utc(11, 1));
    let outcome = harness.service.redeem(&first.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::Expired { .. }));

    // A fresh token scanned after 30 minutes succeeds with the fixed
    // promotional message
    let second = harness
        .service
        .issue(ad_hoc_request(TokenPurpose::SpecialOffer, Some(60)), &caller)
        .await
        .unwrap();
    harness.clock.advance(Duration::minutes(30));
    let outcome = harness.service.redeem(&second.token.token).await.unwrap();
    match outcome {
        RedemptionOutcome::Success { message, .. } => {
            assert_eq!(message, "Promotional offer applied to your next booking.");
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ad_hoc_duration_is_clamped() {
    let harness = harness_at(utc(10, 0));
    let caller = CallerIdentity::user(Uuid::new_v4());

    let capped = harness
        .service
        .issue(
            ad_hoc_request(TokenPurpose::ServiceAccess, Some(5000)),
            &caller,
        )
        .await
        .unwrap();
    assert_eq!(capped.token.expires_at, utc(10, 0) + Duration::minutes(1440));

    let floored = harness
        .service
        .issue(ad_hoc_request(TokenPurpose::ServiceAccess, Some(0)), &caller)
        .await
        .unwrap();
    assert_eq!(floored.token.expires_at, utc(10, 1));
}

#[tokio::test]
async fn test_payment_confirmation_flow() {
    let harness = harness_at(utc(10, 0));
    let appointment = seed_appointment(&harness).await;
    harness.payments.add_pending(appointment.id).await;

    let issued = harness
        .service
        .issue(
            IssueRequest {
                purpose: TokenPurpose::PaymentConfirmation,
                appointment_id: Some(appointment.id),
                duration_minutes: Some(30),
            },
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    match outcome {
        RedemptionOutcome::Success { message, .. } => {
            assert_eq!(message, "Payment confirmed. Thank you!");
        }
        other => panic!("expected Success, got {other:?}"),
    }
    assert!(harness.payments.is_confirmed(appointment.id).await);

    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::AlreadyUsed { .. }));
}

#[tokio::test]
async fn test_payment_confirmation_without_pending_payment_is_retryable() {
    let harness = harness_at(utc(10, 0));
    let appointment = seed_appointment(&harness).await;

    let issued = harness
        .service
        .issue(
            IssueRequest {
                purpose: TokenPurpose::PaymentConfirmation,
                appointment_id: Some(appointment.id),
                duration_minutes: Some(30),
            },
            &CallerIdentity::user(appointment.client_id),
        )
        .await
        .unwrap();

    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    match &outcome {
        RedemptionOutcome::ProcessingFailed { message } => {
            assert!(message.contains("no pending payment"));
        }
        other => panic!("expected ProcessingFailed, got {other:?}"),
    }

    // The token survived; settle the payment and scan again
    harness.payments.add_pending(appointment.id).await;
    let outcome = harness.service.redeem(&issued.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::Success { .. }));
}

#[tokio::test]
async fn test_token_info_returns_stored_record() {
    let harness = harness_at(utc(10, 0));
    let caller = CallerIdentity::user(Uuid::new_v4());

    let issued = harness
        .service
        .issue(ad_hoc_request(TokenPurpose::ServiceAccess, None), &caller)
        .await
        .unwrap();

    let info = harness
        .service
        .token_info(&issued.token.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info, issued.token);

    assert!(harness.service.token_info("missing").await.unwrap().is_none());
}

/// Handler standing in for the loser of a concurrent redemption: by the
/// time its effect attempt runs, the winner has already consumed the
/// token, and the attempt fails against the committed state.
struct BeatenToItHandler {
    tokens: Arc<MockQrTokenRepository>,
    winner_used_at: DateTime<Utc>,
}

#[async_trait]
impl ActionHandler for BeatenToItHandler {
    fn purpose(&self) -> TokenPurpose {
        TokenPurpose::ServiceAccess
    }

    async fn process(&self, token: &QrToken) -> Result<String, DomainError> {
        self.tokens
            .consume_if_unused(&token.token, self.winner_used_at)
            .await?;
        Err(DomainError::Validation {
            message: "access already granted".to_string(),
        })
    }
}

#[tokio::test]
async fn test_handler_failure_after_lost_race_reports_already_used() {
    let harness = harness_at(utc(10, 0));
    let caller = CallerIdentity::privileged(Uuid::new_v4());

    let issued = harness
        .service
        .issue(ad_hoc_request(TokenPurpose::ServiceAccess, None), &caller)
        .await
        .unwrap();

    let mut registry = ActionRegistry::new();
    registry.register(Arc::new(BeatenToItHandler {
        tokens: harness.tokens.clone(),
        winner_used_at: utc(10, 5),
    }));

    let racing_service = QrTokenService::new(
        harness.tokens.clone(),
        harness.appointments.clone(),
        Arc::new(registry),
        harness.clock.clone(),
        QrServiceConfig::default(),
    );

    // The loser's handler failed against state the winner committed, so
    // the scan reports the terminal outcome with the winner's instant.
    let outcome = racing_service.redeem(&issued.token.token).await.unwrap();
    assert_eq!(
        outcome,
        RedemptionOutcome::AlreadyUsed {
            used_at: Some(utc(10, 5)),
        }
    );

    // A genuine handler failure without a competing consume still comes
    // back retryable (covered above); the token here is spent for good.
    let outcome = racing_service.redeem(&issued.token.token).await.unwrap();
    assert!(matches!(outcome, RedemptionOutcome::AlreadyUsed { .. }));
}
