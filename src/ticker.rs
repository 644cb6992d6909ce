// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ticker canonicalization and currency classification.
//!
//! Most trades carry no explicit currency field; every downstream currency
//! decision hangs off the two rules here, so they are part of the engine's
//! contract rather than an implementation detail:
//!
//! - `canonicalize` uppercases, strips Korean exchange suffixes (`.KS`,
//!   `.KQ`) and left-pads digit-leading 4-5 character tickers to the 6
//!   characters KRX uses, so `"5930"` and `"005930.KS"` compare equal.
//! - `classify` treats a canonical form of 6+ characters (or all digits) as
//!   a KRW-denominated KRX code and anything shorter as a USD ticker.

use crate::models::Currency;
use once_cell::sync::Lazy;
use regex::Regex;

static KR_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(KS|KQ)$").unwrap());
static KR_SHORT_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9A-Z]{3,4}$").unwrap());
static ALL_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

pub fn canonicalize(ticker: &str) -> String {
    let upper = ticker.trim().to_uppercase();
    let stripped = KR_SUFFIX.replace(&upper, "");
    let mut out = stripped.into_owned();
    if KR_SHORT_CODE.is_match(&out) {
        while out.len() < 6 {
            out.insert(0, '0');
        }
    }
    out
}

pub fn classify(ticker: &str) -> Currency {
    let canonical = canonicalize(ticker);
    if canonical.len() >= 6 || ALL_DIGITS.is_match(&canonical) {
        Currency::Krw
    } else {
        Currency::Usd
    }
}
