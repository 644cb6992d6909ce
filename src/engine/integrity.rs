// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-cutting consistency rules over the whole dataset.
//!
//! Every rule runs on every invocation, none short-circuits another, and the
//! verifier never mutates its input: it reports, the UI repairs. Grouping is
//! done through `BTreeMap` so re-running on the same snapshot yields an
//! identical issue list.

use crate::categories;
use crate::engine::positions::compute_positions;
use crate::models::{
    Account, CategoryPresets, Currency, EntryKind, IntegrityIssue, IssueKind, LedgerEntry,
    Severity, StockTrade, TradeSide,
};
use crate::ticker;
use crate::utils;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// Runs the full rule battery against the snapshot, dating "future" records
/// against the current day.
pub fn run_integrity_check(
    accounts: &[Account],
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
    presets: Option<&CategoryPresets>,
) -> Vec<IntegrityIssue> {
    run_integrity_check_at(accounts, ledger, trades, presets, utils::today())
}

pub fn run_integrity_check_at(
    accounts: &[Account],
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
    presets: Option<&CategoryPresets>,
    today: NaiveDate,
) -> Vec<IntegrityIssue> {
    let known: HashSet<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
    let mut issues = Vec::new();

    check_duplicate_entries(ledger, &mut issues);
    check_duplicate_trades(trades, &mut issues);
    check_missing_references(&known, ledger, trades, &mut issues);
    check_future_dates(today, ledger, trades, &mut issues);
    check_trade_amounts(trades, &mut issues);
    check_transfer_zero_sum(&known, ledger, &mut issues);
    check_transfer_fields(ledger, &mut issues);
    check_usd_securities(accounts, ledger, trades, &mut issues);
    if let Some(presets) = presets {
        check_categories(presets, ledger, &mut issues);
    }
    check_oversells(trades, &mut issues);

    issues
}

fn cluster_severity(size: usize) -> Severity {
    if size > 2 {
        Severity::Error
    } else {
        Severity::Warning
    }
}

// Dedup key deliberately excludes `note`: a free-text annotation does not
// make two otherwise identical entries distinct records.
type EntryKey = (
    NaiveDate,
    EntryKind,
    Decimal,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Currency,
);

fn check_duplicate_entries(ledger: &[LedgerEntry], issues: &mut Vec<IntegrityIssue>) {
    let mut groups: BTreeMap<EntryKey, Vec<String>> = BTreeMap::new();
    for e in ledger {
        let key = (
            e.date,
            e.kind,
            e.amount,
            e.from_account_id.clone(),
            e.to_account_id.clone(),
            e.category.clone(),
            e.sub_category.clone(),
            e.description.clone(),
            e.currency,
        );
        groups.entry(key).or_default().push(e.id.clone());
    }
    for (key, ids) in groups {
        if ids.len() > 1 {
            issues.push(IntegrityIssue::new(
                IssueKind::DuplicateLedgerEntries,
                cluster_severity(ids.len()),
                format!(
                    "{} ledger entries on {} look identical ({} {} {})",
                    ids.len(),
                    key.0,
                    key.2,
                    key.8.code(),
                    key.5,
                ),
                ids,
            ));
        }
    }
}

type TradeKey = (NaiveDate, String, String, TradeSide, Decimal, Decimal);

fn check_duplicate_trades(trades: &[StockTrade], issues: &mut Vec<IntegrityIssue>) {
    let mut groups: BTreeMap<TradeKey, Vec<String>> = BTreeMap::new();
    for t in trades {
        let key = (
            t.date,
            t.account_id.clone(),
            ticker::canonicalize(&t.ticker),
            t.side,
            t.quantity,
            t.price,
        );
        groups.entry(key).or_default().push(t.id.clone());
    }
    for (key, ids) in groups {
        if ids.len() > 1 {
            issues.push(IntegrityIssue::new(
                IssueKind::DuplicateTrades,
                cluster_severity(ids.len()),
                format!(
                    "{} trades of {} on {} look identical ({} @ {})",
                    ids.len(),
                    key.2,
                    key.0,
                    key.4,
                    key.5,
                ),
                ids,
            ));
        }
    }
}

fn check_missing_references(
    known: &HashSet<&str>,
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
    issues: &mut Vec<IntegrityIssue>,
) {
    let mut dangling: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for e in ledger {
        for id in [e.from_account_id.as_deref(), e.to_account_id.as_deref()]
            .into_iter()
            .flatten()
        {
            if !known.contains(id) {
                dangling.entry(id.to_string()).or_default().push(e.id.clone());
            }
        }
    }
    for t in trades {
        if !known.contains(t.account_id.as_str()) {
            dangling
                .entry(t.account_id.clone())
                .or_default()
                .push(t.id.clone());
        }
    }
    for (account_id, records) in dangling {
        issues.push(IntegrityIssue::new(
            IssueKind::MissingAccountReference,
            Severity::Error,
            format!(
                "Account '{}' does not exist but is referenced by {} record(s)",
                account_id,
                records.len()
            ),
            records,
        ));
    }
}

fn check_future_dates(
    today: NaiveDate,
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
    issues: &mut Vec<IntegrityIssue>,
) {
    for e in ledger {
        if e.date > today {
            issues.push(IntegrityIssue::new(
                IssueKind::FutureDatedRecord,
                Severity::Warning,
                format!("Ledger entry '{}' is dated {} (in the future)", e.id, e.date),
                vec![e.id.clone()],
            ));
        }
    }
    for t in trades {
        if t.date > today {
            issues.push(IntegrityIssue::new(
                IssueKind::FutureDatedRecord,
                Severity::Warning,
                format!("Trade '{}' is dated {} (in the future)", t.id, t.date),
                vec![t.id.clone()],
            ));
        }
    }
}

fn check_trade_amounts(trades: &[StockTrade], issues: &mut Vec<IntegrityIssue>) {
    for t in trades {
        let expected = t.expected_total_amount();
        let tolerance = ticker::classify(&t.ticker).unit_tolerance();
        if (t.total_amount - expected).abs() >= tolerance {
            issues.push(IntegrityIssue::new(
                IssueKind::TradeAmountMismatch,
                Severity::Warning,
                format!(
                    "Trade '{}' stores total {} but quantity/price/fee imply {}",
                    t.id, t.total_amount, expected
                ),
                vec![t.id.clone()],
            ));
        }
    }
}

// An internal transfer contributes +amount for its resolvable `to` side and
// -amount for its resolvable `from` side, so a well-formed pair cancels and a
// leg pointing at an untracked account leaves a remainder. Card-payment
// transfers settle debt, not cash, and stay out of the sum.
fn check_transfer_zero_sum(
    known: &HashSet<&str>,
    ledger: &[LedgerEntry],
    issues: &mut Vec<IntegrityIssue>,
) {
    let mut net: BTreeMap<Currency, Decimal> = BTreeMap::new();
    for e in ledger {
        if e.kind != EntryKind::Transfer || categories::is_card_payment(e) {
            continue;
        }
        let (Some(from), Some(to)) = (e.from_account_id.as_deref(), e.to_account_id.as_deref())
        else {
            // Left to the required-fields rule.
            continue;
        };
        if known.contains(to) {
            *net.entry(e.currency).or_default() += e.amount;
        }
        if known.contains(from) {
            *net.entry(e.currency).or_default() -= e.amount;
        }
    }
    for (currency, sum) in net {
        if sum.abs() >= currency.unit_tolerance() {
            issues.push(IntegrityIssue::new(
                IssueKind::TransferPairMismatch,
                Severity::Error,
                format!(
                    "Internal transfers net to {} {} instead of zero",
                    sum,
                    currency.code()
                ),
                Vec::new(),
            ));
        }
    }
}

fn check_transfer_fields(ledger: &[LedgerEntry], issues: &mut Vec<IntegrityIssue>) {
    for e in ledger {
        if e.kind != EntryKind::Transfer {
            continue;
        }
        if e.from_account_id.is_none() || e.to_account_id.is_none() {
            issues.push(IntegrityIssue::new(
                IssueKind::TransferMissingAccount,
                Severity::Warning,
                format!("Transfer '{}' is missing a from/to account", e.id),
                vec![e.id.clone()],
            ));
        }
    }
}

fn check_usd_securities(
    accounts: &[Account],
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
    issues: &mut Vec<IntegrityIssue>,
) {
    for account in accounts {
        let Some(usd_balance) = account.usd_balance() else {
            continue;
        };
        let mut usd_transfer_net = Decimal::ZERO;
        for e in ledger {
            if e.kind != EntryKind::Transfer || e.currency != Currency::Usd {
                continue;
            }
            if e.to_account_id.as_deref() == Some(account.id.as_str()) {
                usd_transfer_net += e.amount;
            }
            if e.from_account_id.as_deref() == Some(account.id.as_str()) {
                usd_transfer_net -= e.amount;
            }
        }
        let usd_trade_net: Decimal = trades
            .iter()
            .filter(|t| {
                t.account_id == account.id && ticker::classify(&t.ticker) == Currency::Usd
            })
            .map(|t| t.cash_impact)
            .sum();
        let drift = usd_balance - (usd_transfer_net + usd_trade_net);
        if drift.abs() >= Decimal::ONE {
            issues.push(IntegrityIssue::new(
                IssueKind::UsdBalanceDrift,
                Severity::Warning,
                format!(
                    "Securities account '{}' tracks USD {} but transfers and trades imply {}",
                    account.id,
                    usd_balance,
                    usd_transfer_net + usd_trade_net
                ),
                vec![account.id.clone()],
            ));
        }
    }
}

fn check_categories(
    presets: &CategoryPresets,
    ledger: &[LedgerEntry],
    issues: &mut Vec<IntegrityIssue>,
) {
    for e in ledger {
        if !categories::conforms(e, presets) {
            issues.push(IntegrityIssue::new(
                IssueKind::UnknownCategory,
                Severity::Warning,
                format!(
                    "Entry '{}' uses category '{}' not found in the {:?} presets",
                    e.id,
                    categories::effective_category(e),
                    e.kind
                ),
                vec![e.id.clone()],
            ));
        }
    }
}

fn check_oversells(trades: &[StockTrade], issues: &mut Vec<IntegrityIssue>) {
    let report = compute_positions(trades, &[], &[], None);
    for o in report.oversells {
        issues.push(IntegrityIssue::new(
            IssueKind::OversoldPosition,
            Severity::Error,
            format!(
                "Sell '{}' of {} asks for {} but only {} was held",
                o.trade_id, o.ticker, o.requested, o.available
            ),
            vec![o.trade_id],
        ));
    }
}
