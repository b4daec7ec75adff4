//! Bet slip end-to-end: load, edit, submit.

use std::sync::Arc;
use tokio_test::assert_ok;

use matka::api::UserBet;
use matka::auth::StaticCredentials;
use matka::engine::slip::BetSlip;
use matka::engine::wager::WagerDraft;
use matka::types::{BetStatus, GameKind, GameSpec, Session};

use crate::mock_backend::MockBackend;

fn slip(backend: &Arc<MockBackend>, game: GameKind) -> BetSlip {
    BetSlip::new(
        backend.clone(),
        Arc::new(StaticCredentials::new("tok")),
        "KALYAN",
        GameSpec::new(game),
    )
}

#[tokio::test]
async fn test_full_slip_round() {
    let backend = Arc::new(MockBackend::new("tok", 200).reporting_status("pending"));
    let mut slip = slip(&backend, GameKind::HalfSangam);
    assert_ok!(slip.load().await);
    assert_eq!(slip.balance(), 200);

    let mut draft = WagerDraft::ank_pana("3", "145", "40");
    slip.add_wager(&mut draft, Session::Open).unwrap();
    let mut draft = WagerDraft::ank_pana("8", "279", "60");
    slip.add_wager(&mut draft, Session::Close).unwrap();

    let receipt = slip.submit_slip().await.unwrap();
    assert_eq!(receipt.placed, 2);
    assert_eq!(receipt.total_points, 100);
    assert_eq!(slip.balance(), 100);
    assert!(slip.pending().is_empty());
    assert_eq!(slip.ledger().len(), 2);
    assert!(slip.ledger().iter().all(|b| b.status == BetStatus::Pending));
    assert!(slip.ledger().iter().all(|b| b.server_id.is_some()));

    let sent: Vec<_> = backend.placed().into_iter().map(|b| b.number).collect();
    assert!(sent.contains(&"145-3".to_string()));
    assert!(sent.contains(&"8-279".to_string()));
    assert_eq!(backend.server_balance(), 100);

    // A fresh page load sees the same pending bets.
    let mut reloaded = self::slip(&backend, GameKind::HalfSangam);
    reloaded.load().await.unwrap();
    assert_eq!(reloaded.balance(), 100);
    assert_eq!(reloaded.ledger().len(), 2);
}

#[tokio::test]
async fn test_submissions_run_concurrently() {
    let backend = Arc::new(MockBackend::new("tok", 1_000));
    let mut slip = slip(&backend, GameKind::TriplePana);
    slip.load().await.unwrap();
    for n in ["111", "222", "333", "444"] {
        slip.add_wager(&mut WagerDraft::pana(n, "10"), Session::Open).unwrap();
    }

    slip.submit_slip().await.unwrap();
    assert_eq!(backend.max_in_flight(), 4);
}

#[tokio::test]
async fn test_partial_failure_leaves_local_state() {
    let backend = Arc::new(MockBackend::new("tok", 100));
    backend.reject_number("222");

    let mut slip = slip(&backend, GameKind::TriplePana);
    slip.load().await.unwrap();
    for n in ["111", "222", "333"] {
        slip.add_wager(&mut WagerDraft::pana(n, "10"), Session::Open).unwrap();
    }
    let before = slip.pending().to_vec();

    let err = slip.submit_slip().await.unwrap_err();
    assert_eq!(err.code(), "network");
    assert_eq!(slip.balance(), 100);
    assert_eq!(slip.pending(), before.as_slice());
    assert!(slip.ledger().is_empty());
    assert_eq!(slip.last_error(), Some("Failed submitting!"));
}

#[tokio::test]
async fn test_rejected_token_is_auth_error_on_load() {
    let backend = Arc::new(MockBackend::new("tok", 100));
    let mut slip = BetSlip::new(
        backend,
        Arc::new(StaticCredentials::new("expired")),
        "KALYAN",
        GameSpec::new(GameKind::TriplePana),
    );
    let err = slip.load().await.unwrap_err();
    assert!(err.needs_login());
}

#[tokio::test]
async fn test_load_only_shows_this_screen() {
    let bet = |game: &str, market: &str, status: &str| UserBet {
        id: Some("x".into()),
        game_name: game.into(),
        market_name: market.into(),
        status: Some(status.into()),
        number: "123".into(),
        amount: 10,
        bet_type: Some("Open".into()),
    };
    let backend = Arc::new(
        MockBackend::new("tok", 50)
            .with_bet(bet("Triple Pana", "KALYAN", "pending"))
            .with_bet(bet("Triple Pana", "KALYAN", "lose"))
            .with_bet(bet("Single Ank", "KALYAN", "pending"))
            .with_bet(bet("Triple Pana", "MAIN BAZAR", "pending")),
    );

    let mut slip = slip(&backend, GameKind::TriplePana);
    slip.load().await.unwrap();
    assert_eq!(slip.ledger().len(), 1);
}

#[tokio::test]
async fn test_insufficient_balance_never_calls_backend() {
    let backend = Arc::new(MockBackend::new("tok", 5));
    let mut slip = slip(&backend, GameKind::SingleAnk);
    slip.load().await.unwrap();
    slip.add_wager(&mut WagerDraft::ank("7", "10"), Session::Close).unwrap();

    let err = slip.submit_slip().await.unwrap_err();
    assert_eq!(err.code(), "insufficient-balance");
    assert!(backend.placed().is_empty());
    assert_eq!(slip.pending().len(), 1);
}
