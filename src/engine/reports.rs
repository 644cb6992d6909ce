// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Time-bucketed rollups over the ledger. Thin consumers of the same
//! snapshot the balance aggregator folds; transfers are internal movement
//! and never count as income or expense here.

use crate::categories::effective_category;
use crate::models::{EntryKind, LedgerEntry};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFlow {
    /// `YYYY-MM` for monthly buckets, `YYYY` for yearly ones.
    pub period: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: String,
    pub amount: Decimal,
}

fn cash_flow_by(ledger: &[LedgerEntry], bucket: impl Fn(NaiveDate) -> String) -> Vec<PeriodFlow> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for e in ledger {
        let slot = map.entry(bucket(e.date)).or_default();
        match e.kind {
            EntryKind::Income => slot.0 += e.amount,
            EntryKind::Expense => slot.1 += e.amount,
            EntryKind::Transfer => {}
        }
    }
    map.into_iter()
        .map(|(period, (income, expense))| PeriodFlow {
            period,
            income,
            expense,
        })
        .collect()
}

pub fn monthly_cash_flow(ledger: &[LedgerEntry]) -> Vec<PeriodFlow> {
    cash_flow_by(ledger, |d| d.format("%Y-%m").to_string())
}

pub fn yearly_cash_flow(ledger: &[LedgerEntry]) -> Vec<PeriodFlow> {
    cash_flow_by(ledger, |d| d.format("%Y").to_string())
}

/// Expense totals per effective category for one `YYYY-MM` month, largest
/// spender first.
pub fn expense_by_category(ledger: &[LedgerEntry], month: &str) -> Vec<CategorySpend> {
    let mut agg: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in ledger {
        if e.kind != EntryKind::Expense || e.date.format("%Y-%m").to_string() != month {
            continue;
        }
        *agg.entry(effective_category(e)).or_default() += e.amount;
    }
    let mut items: Vec<CategorySpend> = agg
        .into_iter()
        .map(|(category, amount)| CategorySpend { category, amount })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    items
}

/// Signed net flow (income minus expense) per day, ascending by date.
pub fn daily_net(ledger: &[LedgerEntry]) -> Vec<(NaiveDate, Decimal)> {
    let mut map: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for e in ledger {
        match e.kind {
            EntryKind::Income => *map.entry(e.date).or_default() += e.amount,
            EntryKind::Expense => *map.entry(e.date).or_default() -= e.amount,
            EntryKind::Transfer => {}
        }
    }
    map.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(id: &str, date: &str, kind: EntryKind, category: &str, amount: &str) -> LedgerEntry {
        LedgerEntry {
            id: id.into(),
            date: crate::utils::parse_date(date).unwrap(),
            kind,
            category: category.into(),
            sub_category: None,
            from_account_id: None,
            to_account_id: None,
            amount: dec(amount),
            currency: Currency::Krw,
            description: None,
            note: None,
        }
    }

    #[test]
    fn monthly_buckets_split_income_and_expense() {
        let ledger = vec![
            entry("e1", "2025-01-05", EntryKind::Income, "급여", "3000000"),
            entry("e2", "2025-01-20", EntryKind::Expense, "식비", "450000"),
            entry("e3", "2025-02-02", EntryKind::Expense, "식비", "120000"),
            entry("e4", "2025-01-10", EntryKind::Transfer, "이체", "999999"),
        ];
        let flows = monthly_cash_flow(&ledger);
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].period, "2025-01");
        assert_eq!(flows[0].income, dec("3000000"));
        assert_eq!(flows[0].expense, dec("450000"));
        assert_eq!(flows[1].period, "2025-02");
        assert_eq!(flows[1].income, Decimal::ZERO);
    }

    #[test]
    fn yearly_buckets_roll_months_up() {
        let ledger = vec![
            entry("e1", "2024-12-31", EntryKind::Income, "급여", "100"),
            entry("e2", "2025-01-01", EntryKind::Income, "급여", "200"),
        ];
        let flows = yearly_cash_flow(&ledger);
        assert_eq!(flows[0].period, "2024");
        assert_eq!(flows[1].period, "2025");
    }

    #[test]
    fn category_spend_sorts_descending_and_resolves_wrappers() {
        let mut wrapped = entry("e1", "2025-03-01", EntryKind::Expense, "지출", "5000");
        wrapped.sub_category = Some("커피".into());
        let ledger = vec![
            wrapped,
            entry("e2", "2025-03-02", EntryKind::Expense, "식비", "80000"),
            entry("e3", "2025-03-03", EntryKind::Expense, "커피", "3000"),
            entry("e4", "2025-04-01", EntryKind::Expense, "식비", "70000"),
        ];
        let spend = expense_by_category(&ledger, "2025-03");
        assert_eq!(spend.len(), 2);
        assert_eq!(spend[0].category, "식비");
        assert_eq!(spend[0].amount, dec("80000"));
        assert_eq!(spend[1].category, "커피");
        assert_eq!(spend[1].amount, dec("8000"));
    }

    #[test]
    fn daily_net_is_signed() {
        let ledger = vec![
            entry("e1", "2025-01-01", EntryKind::Income, "급여", "100"),
            entry("e2", "2025-01-01", EntryKind::Expense, "식비", "30"),
            entry("e3", "2025-01-02", EntryKind::Expense, "식비", "40"),
        ];
        let net = daily_net(&ledger);
        assert_eq!(net[0].1, dec("70"));
        assert_eq!(net[1].1, dec("-40"));
    }
}
