// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_days_only() {
        assert_eq!(
            parse_date("2025-08-30").unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 30).unwrap()
        );
        assert!(parse_date("2025/08/30").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert_eq!(parse_decimal("1234.56").unwrap(), Decimal::new(123456, 2));
        assert!(parse_decimal("12,34").is_err());
    }
}
