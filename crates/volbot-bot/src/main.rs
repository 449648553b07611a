//! Bybit 변동성 분석 봇 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 텔레그램 봇 시작 (long polling)
//! volbot run
//!
//! # 단발성 변동성 리포트
//! volbot analyze BTC
//!
//! # DCA 래더 계산 (투입금액 1000)
//! volbot dca BTC 1000
//!
//! # 음수 펀딩비 상위 5개
//! volbot funding --count 5
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use volbot_bot::{ReportService, TelegramBot, TelegramConfig};
use volbot_core::logging::init_logging_from_env;
use volbot_exchange::BybitClient;

#[derive(Parser)]
#[command(name = "volbot")]
#[command(about = "Bybit 변동성 분석 및 DCA 래더 텔레그램 봇", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 텔레그램 봇 시작 (long polling)
    Run,

    /// 티커 변동성 리포트 출력
    Analyze {
        /// 티커 (예: BTC, ETHUSDT)
        ticker: String,
    },

    /// 6단계 DCA 래더 계산
    Dca {
        /// 티커 (예: BTC, ETHUSDT)
        ticker: String,

        /// 1회차 투입 금액 (quote 통화 기준)
        cost_basis: f64,
    },

    /// 음수 펀딩비 랭킹 출력
    Funding {
        /// 표시할 심볼 개수
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging_from_env().map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let cli = Cli::parse();

    let client = Arc::new(BybitClient::from_env()?);
    let service = Arc::new(ReportService::new(client));

    match cli.command {
        Commands::Run => {
            let config = TelegramConfig::from_env()?;
            info!("볼륨 분석 봇 시작");
            let bot = TelegramBot::new(config, service);
            bot.start_polling().await;
        }
        Commands::Analyze { ticker } => {
            let (instrument, report) = service.volatility_report(&ticker).await?;
            println!("{}", strip_html(&volbot_bot::format::format_report(&instrument, &report)));
        }
        Commands::Dca { ticker, cost_basis } => {
            let (instrument, plan) = service.dca_plan(&ticker, cost_basis).await?;
            println!("{}", strip_html(&volbot_bot::format::format_ladder(&instrument, &plan)));
        }
        Commands::Funding { count } => {
            let rates = service.negative_funding(count).await?;
            println!("{}", strip_html(&volbot_bot::format::format_funding(&rates)));
        }
    }

    Ok(())
}

/// 텔레그램 HTML 태그를 제거하고 평문으로 변환.
fn strip_html(text: &str) -> String {
    text.replace("<b>", "")
        .replace("</b>", "")
        .replace("<i>", "")
        .replace("</i>", "")
        .replace("<code>", "")
        .replace("</code>", "")
}
