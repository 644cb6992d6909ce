// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Internal rate of return over irregularly dated cash flows.
//!
//! Newton-Raphson on `NPV(r) = sum(amount_i / (1+r)^years_i)` with no
//! bisection fallback. Known limitation: pathological flow shapes with
//! multiple sign changes may fail to converge, and that surfaces as `None`,
//! never as a panic or a hang (iteration is hard-capped).

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const DEFAULT_GUESS: f64 = 0.10;
const MAX_ITERATIONS: usize = 50;
const NPV_EPSILON: f64 = 1e-9;
const STEP_EPSILON: f64 = 1e-9;
const DERIVATIVE_FLOOR: f64 = 1e-15;
const DAYS_PER_YEAR: f64 = 365.25;

/// Annualized internal rate of return for the dated, signed flows, or `None`
/// when no real solution is reachable (fewer than two flows, no sign change,
/// flat derivative, or a step escaping the valid `r > -1` region).
pub fn xirr(flows: &[(NaiveDate, Decimal)]) -> Option<f64> {
    xirr_with_guess(flows, DEFAULT_GUESS)
}

pub fn xirr_with_guess(flows: &[(NaiveDate, Decimal)], guess: f64) -> Option<f64> {
    if flows.len() < 2 || guess <= -1.0 || !guess.is_finite() {
        return None;
    }
    let has_positive = flows.iter().any(|(_, a)| a.is_sign_positive() && !a.is_zero());
    let has_negative = flows.iter().any(|(_, a)| a.is_sign_negative() && !a.is_zero());
    if !has_positive || !has_negative {
        return None;
    }

    let earliest = flows.iter().map(|(d, _)| *d).min()?;
    let series: Vec<(f64, f64)> = flows
        .iter()
        .map(|(date, amount)| {
            let years = (*date - earliest).num_days() as f64 / DAYS_PER_YEAR;
            (years, amount.to_f64().unwrap_or(0.0))
        })
        .collect();

    let mut rate = guess;
    for _ in 0..MAX_ITERATIONS {
        let mut npv = 0.0;
        let mut derivative = 0.0;
        for (years, amount) in &series {
            let base = 1.0 + rate;
            npv += amount / base.powf(*years);
            derivative -= amount * years / base.powf(years + 1.0);
        }
        if npv.abs() < NPV_EPSILON {
            return Some(rate);
        }
        if derivative.abs() < DERIVATIVE_FLOOR {
            debug!("xirr: derivative underflow at r={}, giving up", rate);
            return None;
        }
        let next = rate - npv / derivative;
        if next <= -1.0 || !next.is_finite() {
            debug!("xirr: step escaped valid region (r={} -> {})", rate, next);
            return None;
        }
        if (next - rate).abs() < STEP_EPSILON {
            return Some(next);
        }
        rate = next;
    }
    debug!("xirr: no convergence after {} iterations", MAX_ITERATIONS);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn one_year_ten_percent_round_trip() {
        let flows = vec![(d(2024, 1, 1), dec("-1000")), (d(2025, 1, 1), dec("1100"))];
        let rate = xirr(&flows).unwrap();
        // 366 days here; the analytic solution is 1.1^(365.25/366) - 1.
        let expected = 1.1f64.powf(DAYS_PER_YEAR / 366.0) - 1.0;
        assert!((rate - expected).abs() < 1e-6, "rate was {}", rate);
        assert!((rate - 0.10).abs() < 1e-3);
    }

    #[test]
    fn no_sign_change_is_none() {
        let flows = vec![(d(2024, 1, 1), dec("1000")), (d(2025, 1, 1), dec("1100"))];
        assert_eq!(xirr(&flows), None);
        let flows = vec![(d(2024, 1, 1), dec("-1000")), (d(2025, 1, 1), dec("-1100"))];
        assert_eq!(xirr(&flows), None);
    }

    #[test]
    fn fewer_than_two_flows_is_none() {
        assert_eq!(xirr(&[]), None);
        assert_eq!(xirr(&[(d(2024, 1, 1), dec("-1000"))]), None);
    }

    #[test]
    fn multi_flow_schedule_solves_npv_to_zero() {
        let flows = vec![
            (d(2023, 1, 1), dec("-5000")),
            (d(2023, 7, 1), dec("-2000")),
            (d(2024, 3, 15), dec("1500")),
            (d(2025, 1, 1), dec("7000")),
        ];
        let rate = xirr(&flows).unwrap();
        let earliest = d(2023, 1, 1);
        let npv: f64 = flows
            .iter()
            .map(|(date, amount)| {
                let years = (*date - earliest).num_days() as f64 / DAYS_PER_YEAR;
                amount.to_f64().unwrap() / (1.0 + rate).powf(years)
            })
            .sum();
        assert!(npv.abs() < 1e-6, "npv was {}", npv);
    }

    #[test]
    fn losing_investment_has_negative_rate() {
        let flows = vec![(d(2024, 1, 1), dec("-1000")), (d(2025, 1, 1), dec("700"))];
        let rate = xirr(&flows).unwrap();
        assert!(rate < 0.0 && rate > -1.0);
    }

    #[test]
    fn bad_guess_is_rejected() {
        let flows = vec![(d(2024, 1, 1), dec("-1000")), (d(2025, 1, 1), dec("1100"))];
        assert_eq!(xirr_with_guess(&flows, -1.5), None);
        assert_eq!(xirr_with_guess(&flows, f64::NAN), None);
    }
}
