//! 텔레그램 봇 명령어 핸들러.
//!
//! Long polling으로 업데이트를 수신하고 처리합니다.
//! - 티커 텍스트 (예: `BTC`) - 변동성 리포트
//! - `/dca <티커> <투입금액>` - 6단계 DCA 래더
//! - `/funding [개수]` - 음수 펀딩비 랭킹
//! - `/help` - 도움말

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{BotError, BotResult};
use crate::format::{escape_html, format_funding, format_ladder, format_report};
use crate::service::{ReportService, DEFAULT_FUNDING_COUNT};

/// 텔레그램 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 허용된 채팅 ID 목록 (비어 있으면 모든 채팅 허용)
    pub allowed_chat_ids: Vec<i64>,
}

impl TelegramConfig {
    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// `TELEGRAM_BOT_TOKEN`은 필수이며, `TELEGRAM_CHAT_ID`는 쉼표로
    /// 구분된 허용 채팅 ID 목록입니다 (선택).
    pub fn from_env() -> BotResult<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| BotError::Config("TELEGRAM_BOT_TOKEN이 필요합니다".to_string()))?;

        let allowed_chat_ids = std::env::var("TELEGRAM_CHAT_ID")
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bot_token,
            allowed_chat_ids,
        })
    }
}

// ============================================================================
// 텔레그램 API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
struct TelegramUpdates {
    ok: bool,
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

// ============================================================================
// 명령어
// ============================================================================

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    /// 티커 변동성 분석
    Analyze(String),
    /// DCA 래더 계산
    Dca { ticker: String, cost_basis: f64 },
    /// 음수 펀딩비 랭킹
    Funding { count: usize },
    /// 도움말
    Help,
    /// 잘못된 인자 (사용법 안내)
    Invalid(String),
    /// 알 수 없는 명령어
    Unknown(String),
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    ///
    /// `/`로 시작하지 않는 텍스트는 티커로 간주합니다.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if !text.starts_with('/') {
            return BotCommand::Analyze(text.to_string());
        }

        let parts: Vec<&str> = text[1..].split_whitespace().collect();
        let command = parts.first().map(|s| s.to_lowercase());

        match command.as_deref() {
            Some("dca") | Some("d") => {
                let (Some(ticker), Some(raw_basis)) = (parts.get(1), parts.get(2)) else {
                    return BotCommand::Invalid(
                        "사용법: /dca <티커> <투입금액>\n예시: /dca BTC 1000".to_string(),
                    );
                };
                match raw_basis.parse::<f64>() {
                    Ok(cost_basis) => BotCommand::Dca {
                        ticker: ticker.to_string(),
                        cost_basis,
                    },
                    Err(_) => BotCommand::Invalid(
                        "투입 금액은 숫자여야 합니다. 예시: /dca BTC 1000".to_string(),
                    ),
                }
            }
            Some("funding") | Some("f") => {
                let count = parts
                    .get(1)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_FUNDING_COUNT);
                BotCommand::Funding { count }
            }
            Some("help") | Some("h") | Some("start") => BotCommand::Help,
            _ => BotCommand::Unknown(text.to_string()),
        }
    }
}

// ============================================================================
// 텔레그램 봇
// ============================================================================

/// 텔레그램 봇.
///
/// Long polling으로 업데이트를 수신하고 `ReportService`에 위임합니다.
pub struct TelegramBot {
    config: TelegramConfig,
    client: reqwest::Client,
    service: Arc<ReportService>,
    last_update_id: RwLock<i64>,
}

impl TelegramBot {
    /// 새 봇 생성.
    pub fn new(config: TelegramConfig, service: Arc<ReportService>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            service,
            last_update_id: RwLock::new(0),
        }
    }

    /// 봇 폴링 시작.
    ///
    /// 무한 루프로 업데이트를 수신합니다.
    pub async fn start_polling(&self) {
        info!("텔레그램 봇 폴링 시작");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        if let Err(e) = self.process_update(update).await {
                            error!("업데이트 처리 실패: {}", e);
                        }
                    }
                }
                Err(e) => {
                    error!("업데이트 폴링 실패: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// 업데이트 폴링 (30초 long polling).
    async fn poll_updates(&self) -> BotResult<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;

        let url = format!(
            "https://api.telegram.org/bot{}/getUpdates",
            self.config.bot_token
        );

        let params = serde_json::json!({
            "offset": last_id + 1,
            "timeout": 30,
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .timeout(Duration::from_secs(35))
            .send()
            .await
            .map_err(|e| BotError::Telegram(e.to_string()))?;

        let updates: TelegramUpdates = response
            .json()
            .await
            .map_err(|e| BotError::Telegram(e.to_string()))?;

        if !updates.ok {
            return Err(BotError::Telegram("getUpdates 응답 실패".to_string()));
        }

        if let Some(last) = updates.result.last() {
            *self.last_update_id.write().await = last.update_id;
        }

        Ok(updates.result)
    }

    /// 개별 업데이트 처리.
    async fn process_update(&self, update: TelegramUpdate) -> BotResult<()> {
        let Some(message) = update.message else {
            return Ok(());
        };

        let chat_id = message.chat.id;

        if !self.config.allowed_chat_ids.is_empty()
            && !self.config.allowed_chat_ids.contains(&chat_id)
        {
            warn!(chat_id = chat_id, "허용되지 않은 채팅 ID에서 메시지 수신");
            return Ok(());
        }

        let Some(text) = message.text else {
            return Ok(());
        };

        debug!(chat_id = chat_id, text = %text, "명령어 수신");

        let command = BotCommand::parse(&text);
        let response = self.execute_command(command).await;

        self.send_message(chat_id, &response).await
    }

    /// 명령어 실행.
    ///
    /// 비즈니스 에러는 사용자 메시지로 변환하므로 항상 응답 텍스트를 돌려줍니다.
    async fn execute_command(&self, command: BotCommand) -> String {
        let result = match command {
            BotCommand::Analyze(ticker) => self
                .service
                .volatility_report(&ticker)
                .await
                .map(|(instrument, report)| format_report(&instrument, &report)),
            BotCommand::Dca { ticker, cost_basis } => self
                .service
                .dca_plan(&ticker, cost_basis)
                .await
                .map(|(instrument, plan)| format_ladder(&instrument, &plan)),
            BotCommand::Funding { count } => self
                .service
                .negative_funding(count)
                .await
                .map(|rates| format_funding(&rates)),
            BotCommand::Help => Ok(Self::help_message()),
            BotCommand::Invalid(usage) => Ok(usage),
            BotCommand::Unknown(text) => Ok(unknown_command_message(&text)),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "명령어 처리 실패");
            format!("⚠️ {}", e.user_message())
        })
    }

    /// 도움말 메시지.
    fn help_message() -> String {
        "🤖 <b>Bybit 변동성 분석 봇</b>\n\n\
         <b>사용법:</b>\n\n\
         티커 전송 (예: <code>BTC</code>, <code>ETHUSDT</code>) - 📊 변동성 리포트\n\
         /dca &lt;티커&gt; &lt;투입금액&gt; - 🪜 6단계 DCA 래더\n\
         /funding [개수] - 💸 음수 펀딩비 랭킹\n\
         /help (h) - ❓ 도움말\n\n\
         <i>예시: /dca BTC 1000</i>"
            .to_string()
    }

    /// 메시지 전송 (HTML).
    async fn send_message(&self, chat_id: i64, text: &str) -> BotResult<()> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );

        let params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await
            .map_err(|e| BotError::Telegram(e.to_string()))?;

        if response.status().is_success() {
            debug!(chat_id = chat_id, "응답 전송 완료");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("응답 전송 실패: {} - {}", status, body);
            Err(BotError::Telegram(format!("HTTP {}: {}", status, body)))
        }
    }
}

/// 알 수 없는 명령어 안내 메시지. 사용자 텍스트는 이스케이프해서 넣습니다.
fn unknown_command_message(text: &str) -> String {
    format!(
        "❓ <b>알 수 없는 명령어</b>\n\n\
         입력: <code>{}</code>\n\n\
         /help 명령어로 사용법을 확인하세요.",
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_ticker_is_analyze() {
        assert_eq!(
            BotCommand::parse("BTC"),
            BotCommand::Analyze("BTC".to_string())
        );
        assert_eq!(
            BotCommand::parse("  ethusdt  "),
            BotCommand::Analyze("ethusdt".to_string())
        );
    }

    #[test]
    fn test_parse_dca_command() {
        assert_eq!(
            BotCommand::parse("/dca BTC 1000"),
            BotCommand::Dca {
                ticker: "BTC".to_string(),
                cost_basis: 1000.0
            }
        );
        assert_eq!(
            BotCommand::parse("/d sol 250.5"),
            BotCommand::Dca {
                ticker: "sol".to_string(),
                cost_basis: 250.5
            }
        );
    }

    #[test]
    fn test_parse_dca_malformed_args() {
        assert!(matches!(
            BotCommand::parse("/dca BTC"),
            BotCommand::Invalid(_)
        ));
        assert!(matches!(
            BotCommand::parse("/dca BTC abc"),
            BotCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_funding_command() {
        assert_eq!(
            BotCommand::parse("/funding"),
            BotCommand::Funding {
                count: DEFAULT_FUNDING_COUNT
            }
        );
        assert_eq!(
            BotCommand::parse("/funding 5"),
            BotCommand::Funding { count: 5 }
        );
        assert_eq!(
            BotCommand::parse("/f"),
            BotCommand::Funding {
                count: DEFAULT_FUNDING_COUNT
            }
        );
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(BotCommand::parse("/help"), BotCommand::Help);
        assert_eq!(BotCommand::parse("/start"), BotCommand::Help);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(matches!(
            BotCommand::parse("/portfolio"),
            BotCommand::Unknown(_)
        ));
    }

    #[test]
    fn test_unknown_command_reply_escapes_user_text() {
        let reply = unknown_command_message("/x <b>&co");
        assert!(reply.contains("&lt;b&gt;&amp;co"));
        assert!(!reply.contains("<code>/x <b>"));
    }
}
