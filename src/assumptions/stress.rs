//! Stress case table
//!
//! Each stress case scales the growth, margin and opex drivers before a
//! projection runs. The table is fixed; unknown case names are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Named stress case applied on top of the scenario drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressCase {
    Base,
    Upside,
    Downside,
}

/// Multiplicative adjustments for one stress case
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressAdjustment {
    /// Multiplier on the annual revenue growth rate
    pub growth_multiplier: f64,
    /// Multiplier on gross margin
    pub margin_multiplier: f64,
    /// Multiplier on the opex ratio
    pub opex_multiplier: f64,
    pub display_label: &'static str,
}

const BASE: StressAdjustment = StressAdjustment {
    growth_multiplier: 1.0,
    margin_multiplier: 1.0,
    opex_multiplier: 1.0,
    display_label: "Balanced outlook",
};

const UPSIDE: StressAdjustment = StressAdjustment {
    growth_multiplier: 1.2,
    margin_multiplier: 1.05,
    opex_multiplier: 0.92,
    display_label: "Optimistic demand",
};

const DOWNSIDE: StressAdjustment = StressAdjustment {
    growth_multiplier: 0.7,
    margin_multiplier: 0.9,
    opex_multiplier: 1.12,
    display_label: "Conservative stress",
};

impl StressCase {
    pub const ALL: [StressCase; 3] = [StressCase::Base, StressCase::Upside, StressCase::Downside];

    pub fn adjustment(&self) -> StressAdjustment {
        match self {
            StressCase::Base => BASE,
            StressCase::Upside => UPSIDE,
            StressCase::Downside => DOWNSIDE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressCase::Base => "Base",
            StressCase::Upside => "Upside",
            StressCase::Downside => "Downside",
        }
    }
}

impl fmt::Display for StressCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressCase {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(StressCase::Base),
            "upside" => Ok(StressCase::Upside),
            "downside" => Ok(StressCase::Downside),
            _ => Err(ModelError::UnknownStressCase(s.to_string())),
        }
    }
}

/// Look up the adjustment for a case by name.
///
/// Names come from code, not from users, so an unknown name is a bug and
/// panics. Use `StressCase::from_str` for untrusted input.
pub fn lookup(name: &str) -> StressAdjustment {
    match name.parse::<StressCase>() {
        Ok(case) => case.adjustment(),
        Err(err) => panic!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_values() {
        let base = StressCase::Base.adjustment();
        assert_eq!(
            (base.growth_multiplier, base.margin_multiplier, base.opex_multiplier),
            (1.0, 1.0, 1.0)
        );

        let up = StressCase::Upside.adjustment();
        assert_eq!(
            (up.growth_multiplier, up.margin_multiplier, up.opex_multiplier),
            (1.2, 1.05, 0.92)
        );

        let down = StressCase::Downside.adjustment();
        assert_eq!(
            (down.growth_multiplier, down.margin_multiplier, down.opex_multiplier),
            (0.7, 0.9, 1.12)
        );
        assert_eq!(down.display_label, "Conservative stress");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("upside".parse::<StressCase>().unwrap(), StressCase::Upside);
        assert_eq!(" Downside ".parse::<StressCase>().unwrap(), StressCase::Downside);
    }

    #[test]
    fn test_unknown_case_rejected() {
        let err = "Sideways".parse::<StressCase>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownStressCase(ref name) if name == "Sideways"));
    }

    #[test]
    #[should_panic(expected = "Unknown stress case")]
    fn test_lookup_unknown_panics() {
        lookup("Catastrophe");
    }

    #[test]
    fn test_lookup_known() {
        assert_eq!(lookup("Upside"), StressCase::Upside.adjustment());
    }
}
