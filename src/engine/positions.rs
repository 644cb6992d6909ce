// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! FIFO lot bookkeeping per (account, canonical ticker).
//!
//! Trades replay in ascending date order with the original input order as the
//! tie-break for same-day trades. Buys push fee-inclusive lots to the back of
//! a deque; sells consume from the front, shrinking a partially used lot in
//! place. A sell exceeding the held quantity is clamped and recorded as an
//! oversell instead of panicking; the integrity verifier turns those into
//! issues.

use crate::models::{Account, Currency, PositionRow, StockPrice, StockTrade, TradeSide};
use crate::ticker;
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub struct Oversell {
    pub trade_id: String,
    pub account_id: String,
    pub ticker: String,
    pub requested: Decimal,
    pub available: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct PositionReport {
    pub positions: Vec<PositionRow>,
    /// Realized P&L per sell trade id (proceeds minus consumed cost basis).
    pub realized: BTreeMap<String, Decimal>,
    pub oversells: Vec<Oversell>,
}

struct Lot {
    quantity: Decimal,
    unit_cost: Decimal,
}

/// Replays all trades and returns open positions, per-trade realized P&L and
/// any oversell clamps. `fx_rate` is KRW per USD and is used to restate a
/// position in its account's reporting currency when the ticker currency
/// differs; without a rate the position stays in the ticker's currency.
pub fn compute_positions(
    trades: &[StockTrade],
    prices: &[StockPrice],
    accounts: &[Account],
    fx_rate: Option<Decimal>,
) -> PositionReport {
    let mut price_by_ticker: HashMap<String, (Decimal, Currency)> = HashMap::new();
    for p in prices {
        let canonical = ticker::canonicalize(&p.ticker);
        let currency = p.currency.unwrap_or_else(|| ticker::classify(&p.ticker));
        price_by_ticker.insert(canonical, (p.price, currency));
    }
    let mut account_currency: HashMap<&str, Currency> = HashMap::with_capacity(accounts.len());
    for a in accounts {
        account_currency.insert(a.id.as_str(), a.currency);
    }

    // BTreeMap keys give a deterministic output order; the index inside each
    // group preserves input order for the same-date tie-break.
    let mut groups: BTreeMap<(String, String), Vec<(usize, &StockTrade)>> = BTreeMap::new();
    for (i, trade) in trades.iter().enumerate() {
        let key = (trade.account_id.clone(), ticker::canonicalize(&trade.ticker));
        groups.entry(key).or_default().push((i, trade));
    }

    let mut report = PositionReport::default();

    for ((account_id, canonical), mut group) in groups {
        group.sort_by_key(|(i, t)| (t.date, *i));

        let mut lots: VecDeque<Lot> = VecDeque::new();
        for (_, trade) in &group {
            match trade.side {
                TradeSide::Buy => {
                    if trade.quantity.is_zero() {
                        continue;
                    }
                    lots.push_back(Lot {
                        quantity: trade.quantity,
                        unit_cost: trade.total_amount / trade.quantity,
                    });
                }
                TradeSide::Sell => {
                    let mut remaining = trade.quantity;
                    let mut cost_consumed = Decimal::ZERO;
                    while remaining > Decimal::ZERO {
                        let Some(front) = lots.front_mut() else {
                            break;
                        };
                        if front.quantity > remaining {
                            front.quantity -= remaining;
                            cost_consumed += front.unit_cost * remaining;
                            remaining = Decimal::ZERO;
                        } else {
                            remaining -= front.quantity;
                            cost_consumed += front.unit_cost * front.quantity;
                            lots.pop_front();
                        }
                    }
                    if remaining > Decimal::ZERO {
                        let available = trade.quantity - remaining;
                        warn!(
                            "sell {} of {} on {} exceeds held quantity ({} requested, {} available), clamping",
                            trade.id, canonical, account_id, trade.quantity, available
                        );
                        report.oversells.push(Oversell {
                            trade_id: trade.id.clone(),
                            account_id: account_id.clone(),
                            ticker: canonical.clone(),
                            requested: trade.quantity,
                            available,
                        });
                    }
                    report
                        .realized
                        .insert(trade.id.clone(), trade.total_amount - cost_consumed);
                }
            }
        }

        let quantity: Decimal = lots.iter().map(|l| l.quantity).sum();
        if quantity.is_zero() {
            continue;
        }
        let mut cost_basis: Decimal = lots.iter().map(|l| l.quantity * l.unit_cost).sum();
        let mut avg_cost = cost_basis / quantity;

        let ticker_currency = ticker::classify(&canonical);
        let (last_price, price_currency) = price_by_ticker
            .get(&canonical)
            .copied()
            .unwrap_or((Decimal::ZERO, ticker_currency));
        let mut market_value = quantity * last_price;

        let mut report_currency = price_currency;
        let account_ccy = account_currency
            .get(account_id.as_str())
            .copied()
            .unwrap_or(price_currency);
        if price_currency != account_ccy {
            if let Some(fx) = fx_rate {
                match (price_currency, account_ccy) {
                    (Currency::Usd, Currency::Krw) => {
                        market_value *= fx;
                        cost_basis *= fx;
                        avg_cost *= fx;
                        report_currency = Currency::Krw;
                    }
                    (Currency::Krw, Currency::Usd) if !fx.is_zero() => {
                        market_value /= fx;
                        cost_basis /= fx;
                        avg_cost /= fx;
                        report_currency = Currency::Usd;
                    }
                    _ => {}
                }
            }
        }

        let unrealized_pnl = market_value - cost_basis;
        let pnl_rate = if cost_basis.is_zero() {
            Decimal::ZERO
        } else {
            unrealized_pnl / cost_basis
        };

        report.positions.push(PositionRow {
            account_id,
            ticker: canonical,
            currency: report_currency,
            quantity,
            avg_cost,
            cost_basis,
            market_value,
            unrealized_pnl,
            pnl_rate,
        });
    }

    report
}
