//! 펀딩비 랭킹.

use volbot_core::FundingRate;

/// 음수 펀딩비만 남겨 가장 낮은(음수가 큰) 순서로 상위 n개를 반환합니다.
///
/// 음수 펀딩비가 n개 미만이면 있는 만큼만 반환합니다.
pub fn top_negative_funding(mut rates: Vec<FundingRate>, n: usize) -> Vec<FundingRate> {
    rates.retain(|r| r.rate.is_sign_negative() && !r.rate.is_zero());
    rates.sort_by(|a, b| a.rate.cmp(&b.rate));
    rates.truncate(n);
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(symbol: &str, rate: rust_decimal::Decimal) -> FundingRate {
        FundingRate {
            symbol: symbol.to_string(),
            rate,
        }
    }

    #[test]
    fn test_sorted_ascending_most_negative_first() {
        let rates = vec![
            rate("AUSDT", dec!(-0.0001)),
            rate("BUSDT", dec!(0.0003)),
            rate("CUSDT", dec!(-0.0150)),
            rate("DUSDT", dec!(-0.0005)),
            rate("EUSDT", dec!(0)),
        ];

        let top = top_negative_funding(rates, 10);

        let symbols: Vec<&str> = top.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CUSDT", "DUSDT", "AUSDT"]);
        assert!(top.windows(2).all(|w| w[0].rate <= w[1].rate));
    }

    #[test]
    fn test_truncates_to_n() {
        let rates: Vec<FundingRate> = (1..=20)
            .map(|i| rate(&format!("S{}USDT", i), dec!(-0.0001) * rust_decimal::Decimal::from(i)))
            .collect();

        let top = top_negative_funding(rates, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].symbol, "S20USDT");
    }

    #[test]
    fn test_fewer_than_n_returns_all() {
        let rates = vec![rate("AUSDT", dec!(-0.001))];
        assert_eq!(top_negative_funding(rates, 10).len(), 1);

        assert!(top_negative_funding(vec![], 10).is_empty());
    }
}
