// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Kubernetes resource quantities (`16Gi`, `250m`, `1e3`, ...) as integers.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use snafu::{OptionExt, Snafu, ensure};

#[derive(Snafu, Debug, PartialEq, Eq)]
pub enum Error {
    #[snafu(display("invalid quantity '{}'", value))]
    InvalidQuantity { value: String },

    #[snafu(display("quantity '{}' is out of range", value))]
    OutOfRange { value: String },
}

const BINARY_SUFFIXES: [(&str, u32); 6] = [
    ("Ki", 1),
    ("Mi", 2),
    ("Gi", 3),
    ("Ti", 4),
    ("Pi", 5),
    ("Ei", 6),
];

const DECIMAL_SUFFIXES: [(&str, i32); 9] = [
    ("n", -9),
    ("u", -6),
    ("m", -3),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
];

/// Parses a quantity and rounds it up to the next integer, like `Quantity.Value()`.
pub fn parse(value: &str) -> Result<i64, Error> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
        .unwrap_or(trimmed.len());
    let (number, suffix) = trimmed.split_at(split);

    let (negative, number) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    };

    ensure!(
        !number.is_empty() && number.chars().all(|c| c.is_ascii_digit() || c == '.'),
        InvalidQuantitySnafu { value }
    );

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    ensure!(
        !fraction.contains('.') && !(whole.is_empty() && fraction.is_empty()),
        InvalidQuantitySnafu { value }
    );

    let digits = format!("{}{}", whole, fraction);
    let mut numerator: i128 = digits.parse().ok().context(OutOfRangeSnafu { value })?;
    let mut denominator: i128 = pow10(fraction.len() as u32).context(OutOfRangeSnafu { value })?;

    if let Some(exponent) = decimal_exponent(suffix) {
        let exponent = exponent.context(InvalidQuantitySnafu { value })?;
        scale(&mut numerator, &mut denominator, exponent).context(OutOfRangeSnafu { value })?;
    } else if let Some((_, power)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        numerator = numerator
            .checked_mul(1024_i128.pow(*power))
            .context(OutOfRangeSnafu { value })?;
    } else if let Some((_, exponent)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        scale(&mut numerator, &mut denominator, *exponent).context(OutOfRangeSnafu { value })?;
    } else {
        ensure!(suffix.is_empty(), InvalidQuantitySnafu { value });
    }

    let mut result = numerator / denominator;
    if numerator % denominator != 0 {
        result += 1;
    }
    if negative {
        result = -result;
    }

    i64::try_from(result).ok().context(OutOfRangeSnafu { value })
}

/// Parses an optional quantity, treating a missing value as zero.
pub fn parse_or_zero(quantity: Option<&Quantity>) -> i64 {
    quantity.and_then(|q| parse(&q.0).ok()).unwrap_or(0)
}

/// Plain integer quantity, e.g. for storage requests expressed in bytes.
pub fn from_bytes(bytes: i64) -> Quantity {
    Quantity(bytes.to_string())
}

// `e3`, `E-2`: scientific notation. `E` and `Ei` are suffixes.
fn decimal_exponent(suffix: &str) -> Option<Option<i32>> {
    let rest = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))?;
    if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
        return None;
    }
    Some(rest.parse().ok())
}

fn pow10(exponent: u32) -> Option<i128> {
    10_i128.checked_pow(exponent)
}

fn scale(numerator: &mut i128, denominator: &mut i128, exponent: i32) -> Option<()> {
    if exponent >= 0 {
        *numerator = numerator.checked_mul(pow10(exponent.unsigned_abs())?)?;
    } else {
        *denominator = denominator.checked_mul(pow10(exponent.unsigned_abs())?)?;
    }
    Some(())
}
