//! Human-readable link rates
//!
//! Rates are written as plain bits per second or with a decimal `K`, `M` or
//! `G` suffix (`1G`, `2.5M`). Display uses the largest suffix that divides
//! the rate exactly.

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DENOMINATIONS: [(u64, char); 3] = [(1_000_000_000, 'G'), (1_000_000, 'M'), (1_000, 'K')];

/// A rate in bits per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u64);

impl Rate {
    pub const fn from_bps(bps: u64) -> Self {
        Self(bps)
    }

    pub fn bps(&self) -> u64 {
        self.0
    }

    /// Normalized rate consumed by the analyzers
    pub fn as_gbps(&self) -> f64 {
        self.0 as f64 / 1e9
    }

    /// Display form with a space before the suffix, e.g. `10 G`
    pub fn pretty(&self) -> String {
        match self.denomination() {
            Some((value, suffix)) => format!("{value} {suffix}"),
            None => self.0.to_string(),
        }
    }

    fn denomination(&self) -> Option<(u64, char)> {
        DENOMINATIONS
            .iter()
            .find(|(unit, _)| self.0 >= *unit && self.0 % unit == 0)
            .map(|(unit, suffix)| (self.0 / unit, *suffix))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.denomination() {
            Some((value, suffix)) => write!(f, "{value}{suffix}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for Rate {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || AnalyzerError::InvalidRate(s.to_string());
        if text.is_empty() {
            return Err(invalid());
        }

        let suffix = text.chars().last().and_then(|c| {
            DENOMINATIONS
                .iter()
                .find(|(_, symbol)| *symbol == c)
                .map(|(unit, _)| *unit)
        });

        match suffix {
            Some(unit) => {
                let value: f64 = text[..text.len() - 1].parse().map_err(|_| invalid())?;
                if !value.is_finite() || value < 0.0 {
                    return Err(invalid());
                }
                Ok(Self((value * unit as f64) as u64))
            }
            None => text.parse().map(Self).map_err(|_| invalid()),
        }
    }
}

/// Parse a comma-separated list, skipping blanks and dropping duplicates
pub fn parse_list<T>(text: &str) -> Result<Vec<T>>
where
    T: FromStr<Err = AnalyzerError> + PartialEq,
{
    let mut items = Vec::new();
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let item: T = part.parse()?;
        if !items.contains(&item) {
            items.push(item);
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_suffixed() {
        assert_eq!("1000".parse::<Rate>().unwrap().bps(), 1000);
        assert_eq!("1K".parse::<Rate>().unwrap().bps(), 1_000);
        assert_eq!("2.5M".parse::<Rate>().unwrap().bps(), 2_500_000);
        assert_eq!("10G".parse::<Rate>().unwrap().bps(), 10_000_000_000);
        assert_eq!(" 0 ".parse::<Rate>().unwrap().bps(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Rate>().is_err());
        assert!("G".parse::<Rate>().is_err());
        assert!("fast".parse::<Rate>().is_err());
        assert!("-1M".parse::<Rate>().is_err());
        assert!("1T".parse::<Rate>().is_err());
    }

    #[test]
    fn test_canonical_display() {
        assert_eq!(Rate::from_bps(1_000_000).to_string(), "1M");
        assert_eq!("1000K".parse::<Rate>().unwrap().to_string(), "1M");
        assert_eq!(Rate::from_bps(1_500_000).to_string(), "1500K");
        assert_eq!(Rate::from_bps(1234).to_string(), "1234");
        assert_eq!(Rate::from_bps(0).to_string(), "0");
        assert_eq!(Rate::from_bps(40_000_000_000).pretty(), "40 G");
    }

    #[test]
    fn test_as_gbps() {
        assert_eq!("10G".parse::<Rate>().unwrap().as_gbps(), 10.0);
        assert_eq!("500M".parse::<Rate>().unwrap().as_gbps(), 0.5);
    }

    #[test]
    fn test_parse_list_dedups_canonical_forms() {
        let rates: Vec<Rate> = parse_list("1G, 1000M,,500M ,1G").unwrap();
        assert_eq!(rates, vec![Rate::from_bps(1_000_000_000), Rate::from_bps(500_000_000)]);
        assert!(parse_list::<Rate>("").unwrap().is_empty());
        assert!(parse_list::<Rate>("1G,oops").is_err());
    }
}
