// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-account balance aggregation: one linear fold over the full ledger and
//! trade history, one output row per input account, input order preserved.

use crate::categories::is_card_payment;
use crate::models::{
    Account, AccountBalanceRow, Currency, EntryKind, LedgerEntry, StockTrade,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Default)]
struct Accumulator {
    income: Decimal,
    expense: Decimal,
    transfer_net: Decimal,
    usd_transfer_net: Decimal,
    trade_cash_impact: Decimal,
    card_usage: Decimal,
    card_payment_net: Decimal,
}

/// Folds ledger entries and trade cash impacts into per-account balances.
///
/// Records referencing an unknown account id are skipped here; the integrity
/// verifier reports them. Precondition (unchecked): account ids are unique;
/// with duplicates the last row wins the id.
pub fn compute_account_balances(
    accounts: &[Account],
    ledger: &[LedgerEntry],
    trades: &[StockTrade],
) -> Vec<AccountBalanceRow> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(accounts.len());
    for (i, account) in accounts.iter().enumerate() {
        index.insert(account.id.as_str(), i);
    }
    let mut acc: Vec<Accumulator> = (0..accounts.len()).map(|_| Accumulator::default()).collect();

    for entry in ledger {
        match entry.kind {
            EntryKind::Income => {
                if let Some(&i) = entry.to_account_id.as_deref().and_then(|id| index.get(id)) {
                    acc[i].income += entry.amount;
                }
            }
            EntryKind::Expense => {
                if let Some(&i) = entry.from_account_id.as_deref().and_then(|id| index.get(id)) {
                    acc[i].expense += entry.amount;
                    if accounts[i].is_card() {
                        acc[i].card_usage += entry.amount;
                    }
                }
            }
            EntryKind::Transfer => {
                let card_payment = is_card_payment(entry);
                if let Some(&i) = entry.to_account_id.as_deref().and_then(|id| index.get(id)) {
                    match entry.currency {
                        Currency::Usd => acc[i].usd_transfer_net += entry.amount,
                        Currency::Krw => acc[i].transfer_net += entry.amount,
                    }
                    if card_payment && accounts[i].is_card() {
                        acc[i].card_payment_net += entry.amount;
                    }
                }
                if let Some(&i) = entry.from_account_id.as_deref().and_then(|id| index.get(id)) {
                    match entry.currency {
                        Currency::Usd => acc[i].usd_transfer_net -= entry.amount,
                        Currency::Krw => acc[i].transfer_net -= entry.amount,
                    }
                    if card_payment && accounts[i].is_card() {
                        acc[i].card_payment_net -= entry.amount;
                    }
                }
            }
        }
    }

    for trade in trades {
        if let Some(&i) = index.get(trade.account_id.as_str()) {
            acc[i].trade_cash_impact += trade.cash_impact;
        }
    }

    accounts
        .iter()
        .zip(acc)
        .map(|(account, a)| {
            let current_balance = account.opening_cash()
                + account.cash_adjustment()
                + a.income
                - a.expense
                + a.transfer_net
                + a.trade_cash_impact;
            let card_debt = account
                .opening_debt()
                .map(|debt| debt - a.card_usage + a.card_payment_net);
            AccountBalanceRow {
                account_id: account.id.clone(),
                currency: account.currency,
                income_sum: a.income,
                expense_sum: a.expense,
                transfer_net: a.transfer_net,
                usd_transfer_net: a.usd_transfer_net,
                trade_cash_impact: a.trade_cash_impact,
                current_balance,
                card_debt,
            }
        })
        .collect()
}
