//! # Volbot Core
//!
//! 변동성 분석 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 카테고리 및 인스트루먼트 정의
//! - OHLCV 캔들 데이터 구조체
//! - 펀딩비 데이터
//! - 로깅 인프라

pub mod logging;
pub mod types;

pub use logging::*;
pub use types::*;
