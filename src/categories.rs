// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category label normalization.
//!
//! The dataset has accumulated "wrapper" categories over time: an entry may
//! store the generic kind label (`수입`/`income`, `이체`/`transfer`) in
//! `category` while the real classification sits in `sub_category`, or the
//! other way around. The heuristic lives entirely in this module so the
//! balance aggregator and the integrity verifier share one definition and
//! rule changes do not leak elsewhere.

use crate::models::{CategoryPresets, EntryKind, LedgerEntry};

const INCOME_WRAPPERS: &[&str] = &["income", "수입"];
const EXPENSE_WRAPPERS: &[&str] = &["expense", "지출"];
const TRANSFER_WRAPPERS: &[&str] = &["transfer", "이체"];
const CARD_PAYMENT_LABELS: &[&str] = &["card payment", "card-payment", "카드대금", "카드결제"];

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn is_wrapper(kind: EntryKind, label: &str) -> bool {
    let wrappers = match kind {
        EntryKind::Income => INCOME_WRAPPERS,
        EntryKind::Expense => EXPENSE_WRAPPERS,
        EntryKind::Transfer => TRANSFER_WRAPPERS,
    };
    let n = normalize(label);
    wrappers.iter().any(|w| *w == n)
}

/// The label that actually classifies an entry. A generic wrapper in
/// `category` defers to a more specific `sub_category`.
pub fn effective_category(entry: &LedgerEntry) -> String {
    let cat = entry.category.trim();
    if is_wrapper(entry.kind, cat) {
        if let Some(sub) = entry.sub_category.as_deref() {
            let sub = sub.trim();
            if !sub.is_empty() && !is_wrapper(entry.kind, sub) {
                return sub.to_string();
            }
        }
    }
    cat.to_string()
}

/// Card-payment transfers are modeled as their own category and are excluded
/// from the transfer zero-sum invariant; they settle card debt instead of
/// moving cash between tracked balances.
pub fn is_card_payment(entry: &LedgerEntry) -> bool {
    if entry.kind != EntryKind::Transfer {
        return false;
    }
    let cat = normalize(&entry.category);
    let sub = entry.sub_category.as_deref().map(normalize);
    CARD_PAYMENT_LABELS
        .iter()
        .any(|l| *l == cat || sub.as_deref() == Some(*l))
}

/// Whether an entry's labels resolve against the preset vocabulary for its
/// kind. Deliberately permissive: either the effective label, the raw
/// category, or the sub-category matching is enough, and wrapper labels
/// always pass. Mismatches are low-confidence warnings, not errors.
pub fn conforms(entry: &LedgerEntry, presets: &CategoryPresets) -> bool {
    if is_card_payment(entry) {
        return true;
    }
    let mut vocab: Vec<String> = match entry.kind {
        EntryKind::Income => presets.income.iter().map(|s| normalize(s)).collect(),
        EntryKind::Transfer => presets.transfer.iter().map(|s| normalize(s)).collect(),
        EntryKind::Expense => {
            let mut v: Vec<String> = presets.expense.iter().map(|s| normalize(s)).collect();
            for (group, members) in &presets.expense_groups {
                v.push(normalize(group));
                v.extend(members.iter().map(|s| normalize(s)));
            }
            v
        }
    };
    vocab.extend(
        presets
            .fixed_categories
            .iter()
            .chain(presets.savings_categories.iter())
            .map(|s| normalize(s)),
    );

    let cat = normalize(&entry.category);
    let sub = entry.sub_category.as_deref().map(normalize);
    let eff = normalize(&effective_category(entry));

    if is_wrapper(entry.kind, &entry.category) && sub.is_none() {
        return true;
    }
    vocab.iter().any(|v| *v == eff)
        || vocab.iter().any(|v| *v == cat)
        || sub.as_ref().map_or(false, |s| vocab.iter().any(|v| v == s))
}
