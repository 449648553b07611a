//! 텔레그램 응답 포매터 (HTML).

use volbot_analytics::{LadderPlan, VolatilityReport};
use volbot_core::{FundingRate, Instrument};

/// 비율을 퍼센트 문자열로 변환 (예: 0.0123 → "1.23%").
pub fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// 사용자 입력을 HTML 메시지에 넣기 전에 이스케이프합니다.
///
/// 텔레그램 parse_mode=HTML은 닫히지 않은 태그에 400을 반환하므로
/// 임의 텍스트는 반드시 이스케이프해야 합니다.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// `None`이면 "계산 불가"로 표시.
fn opt(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map(render).unwrap_or_else(|| "계산 불가 (데이터 부족)".to_string())
}

/// 변동성 리포트를 HTML 메시지로 변환합니다.
pub fn format_report(instrument: &Instrument, report: &VolatilityReport) -> String {
    let mut lines = vec![
        format!("📊 <b>변동성 분석 - {}</b>", instrument.symbol),
        format!(
            "시장: <code>{}</code> | 캔들: <code>{}</code>",
            instrument.category, report.candle_count
        ),
        String::new(),
        "<b>일간 통계</b>".to_string(),
        format!("• 변동성 (일간): <code>{}</code>", pct(report.daily_vol)),
        format!("• 변동성 (주간): <code>{}</code>", pct(report.weekly_vol)),
        format!("• 최대 일간 급등: <code>{}</code>", pct(report.max_surge)),
        format!("• 최대 일간 급락: <code>{}</code>", pct(report.max_crash)),
        String::new(),
        "<b>장중 펌프 / 덤프</b>".to_string(),
        format!(
            "• 펌프 평균 / 표준편차: <code>{}</code> / <code>{}</code>",
            pct(report.pump.avg),
            pct(report.pump.std)
        ),
        format!("• 최대 펌프: <code>{}</code>", pct(report.pump.max)),
        format!(
            "• 덤프 평균 / 표준편차: <code>{}</code> / <code>{}</code>",
            pct(report.dump.avg),
            pct(report.dump.std)
        ),
        format!("• 최대 덤프: <code>{}</code>", pct(report.dump.max)),
        String::new(),
        "<b>리스크 지표 (ATR)</b>".to_string(),
        format!(
            "• ATR(14): <code>{}</code> ({})",
            opt(report.atr_14, |v| format!("{:.6}", v)),
            opt(report.atr_14_pct, pct)
        ),
        format!(
            "• ATR(28): <code>{}</code> ({})",
            opt(report.atr_28, |v| format!("{:.6}", v)),
            opt(report.atr_28_pct, pct)
        ),
        String::new(),
        "<b>DCA 레벨 (펌프 백분위)</b>".to_string(),
    ];

    for (k, level) in &report.dca_levels {
        lines.push(format!("• P{}: <code>{}</code>", k, pct(*level)));
    }

    lines.push(String::new());
    lines.push(
        "<i>높은 백분위일수록 드문 상승 폭이며, 보수적인 DCA 구간으로 사용할 수 있습니다.</i>"
            .to_string(),
    );

    lines.join("\n")
}

/// DCA 래더를 HTML 메시지로 변환합니다.
pub fn format_ladder(instrument: &Instrument, plan: &LadderPlan) -> String {
    let mut lines = vec![
        format!("🪜 <b>6단계 DCA 래더 - {}</b>", instrument.symbol),
        format!("시장: <code>{}</code>", instrument.category),
        String::new(),
    ];

    for step in &plan.steps {
        let trigger = if step.session == 1 {
            "시장가 진입".to_string()
        } else {
            format!("+{} 도달 시", pct(step.trigger_pct))
        };
        lines.push(format!(
            "<b>세션 {}</b> - {}\n\
             • 트리거 가격: <code>{:.4}</code>\n\
             • 누적 수량: <code>{:.6}</code>\n\
             • 누적 투입: <code>{:.2}</code>\n\
             • 평균 진입가: <code>{:.4}</code>",
            step.session, trigger, step.trigger_price, step.cumulative_coins,
            step.cumulative_cost, step.average_entry
        ));
        lines.push(String::new());
    }

    lines.push("<i>세션마다 누적 수량이 2배가 되는 상승 방향 DCA 전략입니다.</i>".to_string());

    lines.join("\n")
}

/// 음수 펀딩비 랭킹을 HTML 메시지로 변환합니다.
pub fn format_funding(rates: &[FundingRate]) -> String {
    if rates.is_empty() {
        return "현재 음수 펀딩비인 심볼이 없습니다.".to_string();
    }

    let mut lines = vec![
        "💸 <b>음수 펀딩비 랭킹 (linear)</b>".to_string(),
        String::new(),
    ];

    for (i, r) in rates.iter().enumerate() {
        lines.push(format!(
            "{}. <code>{}</code> - <code>{}</code>",
            i + 1,
            r.symbol,
            r.rate
        ));
    }

    lines.join("\n")
}
