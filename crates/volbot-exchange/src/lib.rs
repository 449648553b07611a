//! Bybit 시장 데이터 연결 및 심볼 해석.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Bybit v5 공개 REST API 커넥터 (인스트루먼트 목록, 일봉, 펀딩비)
//! - 타임아웃 및 제한된 재시도 정책
//! - 카테고리 우선순위 기반 심볼 해석기
//! - 타입화된 에러 처리

pub mod bybit;
pub mod error;
pub mod resolver;
pub mod retry;

pub use bybit::{BybitClient, BybitConfig, MAX_KLINE_LIMIT};
pub use error::*;
pub use resolver::{normalize_ticker, SymbolResolver};
pub use retry::{with_retry, RetryConfig};
