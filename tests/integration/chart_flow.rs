//! Market chart end-to-end: id lookup, results fetch, aggregation.

use chrono::Weekday;
use std::sync::Arc;

use matka::api::ResultEntry;
use matka::auth::StaticCredentials;
use matka::engine::chart::{LoadOutcome, MarketChart};

use crate::mock_backend::MockBackend;

fn entry(date: &str, open: Option<&str>, close: Option<&str>, jodi: Option<&str>) -> ResultEntry {
    ResultEntry {
        date: date.into(),
        open_number: open.map(String::from),
        close_number: close.map(String::from),
        jodi_result: jodi.map(String::from),
    }
}

fn backend() -> Arc<MockBackend> {
    Arc::new(MockBackend::new("tok", 0).with_market(
        "KALYAN",
        "m-kalyan",
        vec![
            entry("03-04-2024", Some("000"), Some("999"), Some("8")),
            entry("garbage", Some("111"), Some("111"), Some("11")),
            entry("2024-03-31", Some("370"), None, Some("0")),
            entry("01-04-2024", Some("123"), Some("456"), Some("7")),
        ],
    ))
}

#[tokio::test]
async fn test_chart_load() {
    let mut chart = MarketChart::new(backend(), Arc::new(StaticCredentials::new("tok")), "KALYAN");
    assert_eq!(chart.refresh().await, LoadOutcome::Loaded(2));

    let weekly = chart.chart();
    assert_eq!(weekly.skipped, 1);
    assert_eq!(weekly.weeks[0].week_key, "01-04-2024 to 07-04-2024");
    assert_eq!(weekly.weeks[1].week_key, "25-03-2024 to 31-03-2024");

    let this_week = &weekly.weeks[0];
    assert_eq!(this_week.populated(), 2);
    assert_eq!(this_week.day(Weekday::Mon).unwrap().jodi, "7");
    assert_eq!(this_week.day(Weekday::Wed).unwrap().close_digits, ['9', '9', '9']);

    let sunday = weekly.weeks[1].day(Weekday::Sun).unwrap();
    assert_eq!(sunday.open_digits, ['3', '7', '0']);
    assert_eq!(sunday.close_digits, ['-', '-', '-']);
}

#[tokio::test]
async fn test_unknown_market_never_fetches_results() {
    let mut chart = MarketChart::new(backend(), Arc::new(StaticCredentials::new("tok")), "MILAN");
    assert_eq!(chart.refresh().await, LoadOutcome::NoMarket);
    assert!(chart.market_id().is_none());
    assert!(chart.chart().is_empty());
}

#[tokio::test]
async fn test_logged_out_chart() {
    let mut chart = MarketChart::new(backend(), Arc::new(StaticCredentials::anonymous()), "KALYAN");
    assert_eq!(chart.refresh().await, LoadOutcome::LoginRequired);
    // The id lookup itself is public.
    assert_eq!(chart.market_id(), Some("m-kalyan"));
}

#[tokio::test]
async fn test_results_outage_is_not_fatal() {
    let backend = backend();
    let mut chart = MarketChart::new(backend.clone(), Arc::new(StaticCredentials::new("tok")), "KALYAN");
    chart.resolve_market_id().await;
    backend.set_error("503 Service Unavailable");
    assert_eq!(chart.load_results().await, LoadOutcome::Failed);
    assert!(chart.chart().is_empty());

    backend.clear_error();
    assert_eq!(chart.load_results().await, LoadOutcome::Loaded(2));
}
