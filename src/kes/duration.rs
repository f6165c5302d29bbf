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

//! Durations in the notation KES reads: `5m0s`, `20s`, `1h30m0s`, `250ms`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

const UNITS: [(&str, u128); 7] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct KesDuration(pub Duration);

impl KesDuration {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

fn with_fraction(whole: u128, fraction: u128, digits: usize, unit: &str) -> String {
    if fraction == 0 {
        return format!("{}{}", whole, unit);
    }
    let fraction = format!("{:0width$}", fraction, width = digits);
    format!("{}.{}{}", whole, fraction.trim_end_matches('0'), unit)
}

impl fmt::Display for KesDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        let rendered = match nanos {
            0 => "0s".to_string(),
            n if n < 1_000 => format!("{}ns", n),
            n if n < 1_000_000 => with_fraction(n / 1_000, n % 1_000, 3, "µs"),
            n if n < 1_000_000_000 => with_fraction(n / 1_000_000, n % 1_000_000, 6, "ms"),
            n => {
                let secs = n / 1_000_000_000;
                let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
                let mut out = String::new();
                if hours > 0 {
                    out.push_str(&format!("{}h", hours));
                }
                if hours > 0 || minutes > 0 {
                    out.push_str(&format!("{}m", minutes));
                }
                out.push_str(&with_fraction(seconds, n % 1_000_000_000, 9, "s"));
                out
            }
        };
        f.write_str(&rendered)
    }
}

/// Parses a sequence of `<number><unit>` terms; a bare `0` is accepted.
pub fn parse(value: &str) -> Option<KesDuration> {
    let value = value.trim();
    if value == "0" {
        return Some(KesDuration::default());
    }
    if value.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    let mut rest = value;
    while !rest.is_empty() {
        let split = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(split);
        if number.is_empty() {
            return None;
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let (_, scale) = UNITS.iter().find(|(name, _)| *name == unit)?;

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        total = total.checked_add(whole.checked_mul(*scale)?)?;
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().ok()?;
            let divisor = 10u128.checked_pow(fraction.len() as u32)?;
            total = total.checked_add(digits.checked_mul(*scale)? / divisor)?;
        }
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000).ok()?;
    let nanos = u32::try_from(total % 1_000_000_000).ok()?;
    Some(KesDuration(Duration::new(secs, nanos)))
}

impl Serialize for KesDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct KesDurationVisitor;

impl Visitor<'_> for KesDurationVisitor {
    type Value = KesDuration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as 5m0s, or an integer number of nanoseconds")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<KesDuration, E> {
        parse(value).ok_or_else(|| E::custom(format!("invalid duration '{}'", value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<KesDuration, E> {
        Ok(KesDuration(Duration::from_nanos(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<KesDuration, E> {
        u64::try_from(value)
            .map(|v| KesDuration(Duration::from_nanos(v)))
            .map_err(|_| E::custom("negative duration"))
    }
}

impl<'de> Deserialize<'de> for KesDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KesDurationVisitor)
    }
}
