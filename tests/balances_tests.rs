// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use wonbook::engine::balances::compute_account_balances;
use wonbook::models::{
    Account, AccountKind, Currency, EntryKind, LedgerEntry, StockTrade, TradeSide,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
}

fn checking(id: &str, opening: &str) -> Account {
    Account {
        id: id.into(),
        currency: Currency::Krw,
        savings: None,
        kind: AccountKind::Checking {
            initial_balance: dec(opening),
        },
    }
}

fn entry(
    id: &str,
    d: u32,
    kind: EntryKind,
    amount: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> LedgerEntry {
    LedgerEntry {
        id: id.into(),
        date: day(d),
        kind,
        category: "misc".into(),
        sub_category: None,
        from_account_id: from.map(Into::into),
        to_account_id: to.map(Into::into),
        amount: dec(amount),
        currency: Currency::Krw,
        description: None,
        note: None,
    }
}

fn buy(id: &str, d: u32, account: &str, qty: &str, price: &str) -> StockTrade {
    let quantity = dec(qty);
    let price = dec(price);
    let total = quantity * price;
    StockTrade {
        id: id.into(),
        date: day(d),
        account_id: account.into(),
        ticker: "005930".into(),
        side: TradeSide::Buy,
        quantity,
        price,
        fee: Decimal::ZERO,
        total_amount: total,
        cash_impact: -total,
    }
}

fn fixture() -> (Vec<Account>, Vec<LedgerEntry>, Vec<StockTrade>) {
    let accounts = vec![
        checking("check", "1000000"),
        Account {
            id: "card".into(),
            currency: Currency::Krw,
            savings: None,
            kind: AccountKind::Card {
                initial_balance: Decimal::ZERO,
                debt: dec("-100000"),
            },
        },
        Account {
            id: "sec".into(),
            currency: Currency::Krw,
            savings: None,
            kind: AccountKind::Securities {
                initial_balance: dec("500000"),
                initial_cash_balance: None,
                cash_adjustment: dec("-1000"),
                usd_balance: Decimal::ZERO,
            },
        },
    ];
    let ledger = vec![
        entry("e1", 1, EntryKind::Income, "3000000", None, Some("check")),
        entry("e2", 2, EntryKind::Expense, "45000", Some("check"), None),
        entry("e3", 3, EntryKind::Expense, "80000", Some("card"), None),
        entry("e4", 5, EntryKind::Transfer, "200000", Some("check"), Some("sec")),
        {
            let mut e = entry("e5", 6, EntryKind::Transfer, "80000", Some("check"), Some("card"));
            e.category = "카드대금".into();
            e
        },
    ];
    let trades = vec![buy("t1", 7, "sec", "2", "70000")];
    (accounts, ledger, trades)
}

#[test]
fn full_dataset_balances() {
    let (accounts, ledger, trades) = fixture();
    let rows = compute_account_balances(&accounts, &ledger, &trades);
    assert_eq!(rows.len(), 3);

    let check = &rows[0];
    // 1000000 + 3000000 - 45000 - 200000 - 80000
    assert_eq!(check.current_balance, dec("3675000"));
    assert_eq!(check.card_debt, None);

    let card = &rows[1];
    // -100000 opening - 80000 usage + 80000 payment
    assert_eq!(card.card_debt, Some(dec("-100000")));
    // The card-payment transfer still lands in the card's cash transfer net,
    // but debt is reported beside it, never folded in.
    assert_eq!(card.transfer_net, dec("80000"));

    let sec = &rows[2];
    // 500000 - 1000 adjustment + 200000 transfer - 140000 trade cash
    assert_eq!(sec.current_balance, dec("559000"));
    assert_eq!(sec.trade_cash_impact, dec("-140000"));
}

#[test]
fn record_order_does_not_change_balances() {
    let (accounts, mut ledger, mut trades) = fixture();
    let baseline = compute_account_balances(&accounts, &ledger, &trades);

    ledger.reverse();
    trades.reverse();
    let permuted = compute_account_balances(&accounts, &ledger, &trades);
    assert_eq!(baseline, permuted);

    ledger.swap(0, 2);
    let swapped = compute_account_balances(&accounts, &ledger, &trades);
    assert_eq!(baseline, swapped);
}

#[test]
fn one_row_per_account_in_input_order() {
    let (accounts, ledger, trades) = fixture();
    let rows = compute_account_balances(&accounts, &ledger, &trades);
    let ids: Vec<&str> = rows.iter().map(|r| r.account_id.as_str()).collect();
    assert_eq!(ids, vec!["check", "card", "sec"]);
}
