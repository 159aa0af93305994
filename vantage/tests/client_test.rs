//! Integration tests for the acquisition flows against a mock provider.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use vantage::{BookSource, Vantage, VantageConfig, VantageError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: client pointed at the mock server.
fn client_for(server: &MockServer) -> Vantage {
    Vantage::new(VantageConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
    })
}

fn daily_fixture(days: u32) -> serde_json::Value {
    let mut series = serde_json::Map::new();
    for d in 1..=days {
        series.insert(
            format!("2024-01-{d:02}"),
            json!({ "4. close": "100.0", "5. volume": format!("{}", d * 10) }),
        );
    }
    json!({
        "Meta Data": { "2. Digital Currency Code": "BTC" },
        "Time Series (Digital Currency Daily)": series,
    })
}

fn rate_fixture(rate: &str) -> serde_json::Value {
    json!({
        "Realtime Currency Exchange Rate": {
            "1. From_Currency Code": "BTC",
            "3. To_Currency Code": "USD",
            "5. Exchange Rate": rate,
        }
    })
}

#[tokio::test]
async fn test_direct_book_reshaped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "CRYPTO_ORDERBOOK"))
        .and(query_param("symbol", "ETH"))
        .and(query_param("market", "USD"))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "asks": [
                {"price": "3451.00", "quantity": "2"},
                {"price": "3450.00", "quantity": "1.5"}
            ],
            "bids": [
                {"price": "3448.00", "quantity": "1"},
                {"price": "3449.00", "quantity": "4"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = client_for(&server)
        .fetch_book(" eth ", "usd", BookSource::Direct)
        .await
        .unwrap();

    let book = update.book;
    assert_eq!(book.asks[0].price, dec!(3450));
    assert_eq!(book.asks[0].size, dec!(1.5));
    assert_eq!(book.asks[0].total, dec!(5175));
    assert_eq!(book.bids[0].price, dec!(3449));
    assert_eq!(book.spread(), Some(dec!(1)));
    assert_eq!(update.spot_price, None);
}

#[tokio::test]
async fn test_direct_book_total_overflow_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "CRYPTO_ORDERBOOK"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "asks": [{"price": "79228162514264337593543950335", "quantity": "2"}],
            "bids": [{"price": "3449.00", "quantity": "1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("ETH", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::Overflow(_)), "got {err:?}");
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn test_synthetic_book_two_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "DIGITAL_CURRENCY_DAILY"))
        .and(query_param("symbol", "BTC"))
        .and(query_param("market", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_fixture(15)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
        .and(query_param("from_currency", "BTC"))
        .and(query_param("to_currency", "USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rate_fixture("40000.00")))
        .expect(1)
        .mount(&server)
        .await;

    let update = client_for(&server)
        .fetch_book("btc", "USD", BookSource::Synthetic)
        .await
        .unwrap();

    let spot = dec!(40000);
    assert_eq!(update.spot_price, Some(spot));
    assert_eq!(update.book.asks.len(), 10);
    assert_eq!(update.book.bids.len(), 10);
    for i in 0..10 {
        let step = Decimal::from(i as u64 + 1) * dec!(0.001);
        assert_eq!(update.book.asks[i].price, spot * (Decimal::ONE + step));
        assert_eq!(update.book.bids[i].price, spot * (Decimal::ONE - step));
    }
    // Newest day (15th) first.
    assert_eq!(update.book.asks[0].size, dec!(150));
}

#[tokio::test]
async fn test_note_is_rate_limit_even_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Note": "Thank you for using our API! Our standard API call frequency is 5 calls per minute.",
            "asks": [{"price": "1", "quantity": "1"}],
            "bids": [{"price": "1", "quantity": "1"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("ETH", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    assert!(err.is_rate_limited(), "got {err:?}");
}

#[tokio::test]
async fn test_rate_limit_on_second_step_stops_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "DIGITAL_CURRENCY_DAILY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_fixture(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Note": "limit"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("BTC", "USD", BookSource::Synthetic)
        .await
        .unwrap_err();
    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn test_unknown_symbol_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Error Message": "Invalid API call. Please retry or visit the documentation."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("NOPE", "USD", BookSource::Synthetic)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::Provider(_)), "got {err:?}");
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("ETH", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    match err {
        VantageError::Http { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("ETH", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn test_non_json_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("ETH", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::Json(_)));
}

#[tokio::test]
async fn test_empty_series_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "DIGITAL_CURRENCY_DAILY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Meta Data": {},
            "Time Series (Digital Currency Daily)": {}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rate_fixture("10")))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("BTC", "USD", BookSource::Synthetic)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::EmptyResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_blank_symbol_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_book("   ", "USD", BookSource::Direct)
        .await
        .unwrap_err();
    assert!(matches!(err, VantageError::Validation(_)));
}
