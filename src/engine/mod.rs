// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod balances;
pub mod integrity;
pub mod positions;
pub mod reports;
pub mod xirr;

use crate::models::{
    Account, AccountBalanceRow, CategoryPresets, IntegrityIssue, LedgerEntry, StockPrice,
    StockTrade,
};
use rust_decimal::Decimal;

/// Immutable view over the host's dataset. The UI rebuilds one of these on
/// every render and asks for whichever derived view it needs; nothing is
/// cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshot<'a> {
    pub accounts: &'a [Account],
    pub ledger: &'a [LedgerEntry],
    pub trades: &'a [StockTrade],
    pub prices: &'a [StockPrice],
    pub presets: Option<&'a CategoryPresets>,
    /// Current KRW-per-USD rate for cross-currency position reporting.
    pub fx_rate: Option<Decimal>,
}

impl Snapshot<'_> {
    pub fn account_balances(&self) -> Vec<AccountBalanceRow> {
        balances::compute_account_balances(self.accounts, self.ledger, self.trades)
    }

    pub fn positions(&self) -> positions::PositionReport {
        positions::compute_positions(self.trades, self.prices, self.accounts, self.fx_rate)
    }

    pub fn integrity(&self) -> Vec<IntegrityIssue> {
        integrity::run_integrity_check(self.accounts, self.ledger, self.trades, self.presets)
    }
}
