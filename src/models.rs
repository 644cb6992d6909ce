// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Krw,
    Usd,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Krw
    }
}

impl Currency {
    /// Smallest meaningful difference for this currency: whole won for KRW,
    /// cents for USD. Consistency rules compare against this tolerance.
    pub fn unit_tolerance(&self) -> Decimal {
        match self {
            Currency::Krw => Decimal::ONE,
            Currency::Usd => Decimal::new(1, 2),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
        }
    }
}

/// Account type and the per-type fields that only make sense for that type.
/// Securities-only fields (opening cash, manual cash adjustment, manual USD
/// float) cannot exist on any other variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AccountKind {
    Checking {
        #[serde(default)]
        initial_balance: Decimal,
    },
    Savings {
        #[serde(default)]
        initial_balance: Decimal,
    },
    Card {
        #[serde(default)]
        initial_balance: Decimal,
        /// Signed opening card liability (negative = owed).
        #[serde(default)]
        debt: Decimal,
    },
    Securities {
        #[serde(default)]
        initial_balance: Decimal,
        /// Opening brokerage cash; falls back to `initial_balance` when unset.
        #[serde(default)]
        initial_cash_balance: Option<Decimal>,
        /// Manual correction applied on top of the computed cash balance.
        #[serde(default)]
        cash_adjustment: Decimal,
        /// Manually tracked USD float, reconciled by the integrity verifier.
        #[serde(default)]
        usd_balance: Decimal,
    },
    Other {
        #[serde(default)]
        initial_balance: Decimal,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub currency: Currency,
    /// Optional savings goal carried for the UI; the engine does not use it.
    #[serde(default)]
    pub savings: Option<Decimal>,
    #[serde(flatten)]
    pub kind: AccountKind,
}

impl Account {
    pub fn initial_balance(&self) -> Decimal {
        match self.kind {
            AccountKind::Checking { initial_balance }
            | AccountKind::Savings { initial_balance }
            | AccountKind::Card {
                initial_balance, ..
            }
            | AccountKind::Securities {
                initial_balance, ..
            }
            | AccountKind::Other { initial_balance } => initial_balance,
        }
    }

    /// Opening cash used as the balance fold's base value. Securities
    /// accounts prefer their dedicated opening-cash field.
    pub fn opening_cash(&self) -> Decimal {
        match self.kind {
            AccountKind::Securities {
                initial_balance,
                initial_cash_balance,
                ..
            } => initial_cash_balance.unwrap_or(initial_balance),
            _ => self.initial_balance(),
        }
    }

    pub fn cash_adjustment(&self) -> Decimal {
        match self.kind {
            AccountKind::Securities { cash_adjustment, .. } => cash_adjustment,
            _ => Decimal::ZERO,
        }
    }

    pub fn usd_balance(&self) -> Option<Decimal> {
        match self.kind {
            AccountKind::Securities { usd_balance, .. } => Some(usd_balance),
            _ => None,
        }
    }

    pub fn opening_debt(&self) -> Option<Decimal> {
        match self.kind {
            AccountKind::Card { debt, .. } => Some(debt),
            _ => None,
        }
    }

    pub fn is_securities(&self) -> bool {
        matches!(self.kind, AccountKind::Securities { .. })
    }

    pub fn is_card(&self) -> bool {
        matches!(self.kind, AccountKind::Card { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub from_account_id: Option<String>,
    #[serde(default)]
    pub to_account_id: Option<String>,
    /// Non-negative magnitude; direction is implied by `kind` and the
    /// from/to fields, never by sign.
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTrade {
    pub id: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    /// Per-share price; currency implied by ticker classification.
    pub price: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    /// Stored, not trusted: buy = quantity*price + fee, sell = quantity*price - fee.
    pub total_amount: Decimal,
    /// Stored, not trusted: buy = -total_amount, sell = +total_amount.
    /// A buy pinned to 0 represents an opening holding that consumed no
    /// tracked cash.
    pub cash_impact: Decimal,
}

impl StockTrade {
    pub fn expected_total_amount(&self) -> Decimal {
        let gross = self.quantity * self.price;
        match self.side {
            TradeSide::Buy => gross + self.fee,
            TradeSide::Sell => gross - self.fee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrice {
    pub ticker: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPresets {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
    #[serde(default)]
    pub transfer: Vec<String>,
    /// Expense group label -> sub-category vocabulary.
    #[serde(default)]
    pub expense_groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub fixed_categories: Vec<String>,
    #[serde(default)]
    pub savings_categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceRow {
    pub account_id: String,
    pub currency: Currency,
    pub income_sum: Decimal,
    pub expense_sum: Decimal,
    pub transfer_net: Decimal,
    pub usd_transfer_net: Decimal,
    pub trade_cash_impact: Decimal,
    pub current_balance: Decimal,
    /// Card accounts only: opening debt minus card usage plus card-payment
    /// inflows. Reported beside `current_balance`, never folded into it.
    pub card_debt: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub account_id: String,
    /// Canonical ticker (see `ticker::canonicalize`).
    pub ticker: String,
    pub currency: Currency,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub cost_basis: Decimal,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub pnl_rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateLedgerEntries,
    DuplicateTrades,
    MissingAccountReference,
    FutureDatedRecord,
    TradeAmountMismatch,
    TransferPairMismatch,
    TransferMissingAccount,
    UsdBalanceDrift,
    UnknownCategory,
    OversoldPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    /// Ids of the records (or the dangling account id plus its referencing
    /// records) this issue is about.
    pub records: Vec<String>,
}

impl IntegrityIssue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        message: impl Into<String>,
        records: Vec<String>,
    ) -> Self {
        IntegrityIssue {
            kind,
            severity,
            message: message.into(),
            records,
        }
    }
}
