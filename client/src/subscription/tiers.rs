use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::Period;

/// Fixed-point scale of tier amounts.
pub const TOKEN_DECIMALS: u8 = 18;
const WEI_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierUnit {
    Week,
    #[default]
    Month,
    Year,
}

impl From<TierUnit> for Period {
    fn from(unit: TierUnit) -> Self {
        match unit {
            TierUnit::Week => Period::Week,
            TierUnit::Month => Period::Month,
            TierUnit::Year => Period::Year,
        }
    }
}

impl fmt::Display for TierUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Period::from(*self), f)
    }
}

#[derive(Debug, Error)]
#[error("unknown tier unit {0:?}, expected week, month or year")]
pub struct ParseTierUnitError(String);

impl FromStr for TierUnit {
    type Err = ParseTierUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TierUnit::Week),
            "month" => Ok(TierUnit::Month),
            "year" => Ok(TierUnit::Year),
            _ => Err(ParseTierUnitError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub amount: U256,
    pub unit: TierUnit,
}

impl Tier {
    fn whole_tokens(tokens: u64, unit: TierUnit) -> Self {
        Self {
            amount: U256::from(tokens) * U256::from(WEI_PER_TOKEN),
            unit,
        }
    }
}

/// The three plans on offer, cheapest first.
pub fn catalog() -> [Tier; 3] {
    [
        Tier::whole_tokens(2, TierUnit::Week),
        Tier::whole_tokens(7, TierUnit::Month),
        Tier::whole_tokens(75, TierUnit::Year),
    ]
}

pub fn tier_for(unit: TierUnit) -> Tier {
    catalog()[position_of(unit)]
}

fn position_of(unit: TierUnit) -> usize {
    match unit {
        TierUnit::Week => 0,
        TierUnit::Month => 1,
        TierUnit::Year => 2,
    }
}

/// Catalog position of the tier billed every `period`, if any.
pub fn tier_index(period: Period) -> Option<usize> {
    catalog()
        .iter()
        .position(|tier| Period::from(tier.unit) == period)
}

/// "Tier I", "Tier II", ...
pub fn tier_label(index: usize) -> String {
    format!("Tier {}", "I".repeat(index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ascending() {
        let tiers = catalog();
        assert!(tiers.windows(2).all(|pair| pair[0].amount < pair[1].amount));
        assert_eq!(
            tiers.map(|tier| tier.unit),
            [TierUnit::Week, TierUnit::Month, TierUnit::Year]
        );
    }

    #[test]
    fn year_costs_75_tokens() {
        let tier = tier_for(TierUnit::Year);
        assert_eq!(tier.amount, U256::from(75u64) * U256::from(WEI_PER_TOKEN));
    }

    #[test]
    fn only_catalog_periods_have_an_index() {
        assert_eq!(tier_index(Period::Week), Some(0));
        assert_eq!(tier_index(Period::Month), Some(1));
        assert_eq!(tier_index(Period::Year), Some(2));
        assert_eq!(tier_index(Period::Day), None);
        assert_eq!(tier_index(Period::Minute), None);
    }

    #[test]
    fn labels() {
        assert_eq!(tier_label(0), "Tier I");
        assert_eq!(tier_label(2), "Tier III");
    }

    #[test]
    fn parse_units() {
        assert_eq!("Year".parse::<TierUnit>().unwrap(), TierUnit::Year);
        assert_eq!(TierUnit::default(), TierUnit::Month);
        assert!("day".parse::<TierUnit>().is_err());
    }
}
