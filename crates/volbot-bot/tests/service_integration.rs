//! ReportService 통합 테스트 (mockito 기반).
//!
//! 해석 → 캔들 조회 → 분석으로 이어지는 요청 흐름 전체를 검증합니다.

use std::sync::Arc;

use mockito::Matcher;
use rust_decimal_macros::dec;

use volbot_analytics::AnalyticsError;
use volbot_bot::{BotError, ReportService};
use volbot_core::MarketCategory;
use volbot_exchange::{BybitClient, BybitConfig, RetryConfig};

fn test_service(server: &mockito::Server) -> ReportService {
    let config = BybitConfig {
        base_url: server.url(),
        timeout_secs: 5,
        retry: RetryConfig::no_retry(),
    };
    let client = Arc::new(BybitClient::new(config).expect("테스트용 클라이언트 생성 실패"));
    ReportService::new(client)
}

/// 30일치 일봉 응답 본문 (Bybit 순서대로 최신 캔들부터).
fn kline_body_30d() -> String {
    let mut rows = Vec::new();
    for i in 0..30u32 {
        let ts = 1_672_531_200_000i64 + i64::from(i) * 86_400_000;
        let open = 100.0 + f64::from(i);
        // 펌프 폭을 날마다 다르게 해서 백분위가 퍼지도록 구성
        let high = open * (1.0 + 0.01 * f64::from(i % 6 + 1));
        let low = open * 0.98;
        let close = open + 0.5;
        rows.push(format!(
            r#"["{}","{:.4}","{:.4}","{:.4}","{:.4}","1000","100000"]"#,
            ts, open, high, low, close
        ));
    }
    rows.reverse();
    format!(
        r#"{{"retCode":0,"retMsg":"OK","result":{{"list":[{}]}}}}"#,
        rows.join(",")
    )
}

async fn mock_linear_btc(server: &mut mockito::Server) {
    server
        .mock("GET", "/v5/market/instruments-info")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "linear".into()),
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"retCode":0,"retMsg":"OK","result":{"list":[{"symbol":"BTCUSDT"}]}}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/v5/market/kline")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "linear".into()),
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("interval".into(), "D".into()),
        ]))
        .with_status(200)
        .with_body(kline_body_30d())
        .create_async()
        .await;
}

#[tokio::test]
async fn test_volatility_report_full_flow() {
    let mut server = mockito::Server::new_async().await;
    mock_linear_btc(&mut server).await;

    let service = test_service(&server);
    let (instrument, report) = service.volatility_report("btc").await.unwrap();

    assert_eq!(instrument.symbol, "BTCUSDT");
    assert_eq!(instrument.category, MarketCategory::Linear);
    assert_eq!(report.candle_count, 30);

    // 30개 캔들이면 ATR 14/28 모두 계산 가능
    assert!(report.atr_14.is_some());
    assert!(report.atr_28.is_some());

    assert_eq!(report.dca_levels.len(), 6);
    assert!(report.daily_vol > 0.0);
    assert!(report.weekly_vol > report.daily_vol);
}

#[tokio::test]
async fn test_dca_plan_full_flow() {
    let mut server = mockito::Server::new_async().await;
    mock_linear_btc(&mut server).await;

    let service = test_service(&server);
    let (instrument, plan) = service.dca_plan("btc", 1000.0).await.unwrap();

    assert_eq!(instrument.symbol, "BTCUSDT");
    assert_eq!(plan.steps.len(), 6);
    assert_eq!(plan.steps[0].session, 1);

    // 세션마다 누적 수량 2배
    for w in plan.steps.windows(2) {
        let ratio = w[1].cumulative_coins / w[0].cumulative_coins;
        assert!((ratio - 2.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_dca_plan_rejects_bad_cost_basis_before_network() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/v5/market/instruments-info")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = test_service(&server);
    let result = service.dca_plan("btc", -100.0).await;

    assert!(matches!(
        result,
        Err(BotError::Analytics(AnalyticsError::InvalidInput(_)))
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_negative_funding_ranked_ascending() {
    let mut server = mockito::Server::new_async().await;

    let body = r#"{"retCode":0,"retMsg":"OK","result":{"list":[
        {"symbol":"AUSDT","fundingRate":"0.0001"},
        {"symbol":"BUSDT","fundingRate":"-0.0003"},
        {"symbol":"CUSDT","fundingRate":"-0.0012"},
        {"symbol":"DUSDT","fundingRate":"-0.0007"}
    ]}}"#;

    let _mock = server
        .mock("GET", "/v5/market/tickers")
        .match_query(Matcher::UrlEncoded("category".into(), "linear".into()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let service = test_service(&server);
    let top = service.negative_funding(2).await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].symbol, "CUSDT");
    assert_eq!(top[0].rate, dec!(-0.0012));
    assert_eq!(top[1].symbol, "DUSDT");
}
