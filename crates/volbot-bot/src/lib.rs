//! 변동성 봇의 채팅 표면 및 서비스 계층.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `ReportService` - 심볼 해석 + 캔들 조회 + 분석을 묶는 요청 단위 파사드
//! - 텔레그램 Long polling 핸들러 및 명령어 파싱
//! - 리포트/래더/펀딩 HTML 포매터

pub mod error;
pub mod format;
pub mod handler;
pub mod service;

pub use error::{BotError, BotResult};
pub use handler::{BotCommand, TelegramBot, TelegramConfig};
pub use service::ReportService;
