//! Unit types and conversion constants
//!
//! The set of units is closed: liters, kilograms, grams and counted items.
//! Boundary tags are `"L"`, `"Kg"`, `"g"` and `"un"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PricingError;

/// Grams per kilogram
pub const GRAMS_PER_KILOGRAM: f64 = 1000.0;

/// Category of units that convert into one another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Volume,
    Mass,
    Discrete,
}

impl Dimension {
    /// Canonical unit used for price comparison within this dimension
    pub fn base_unit(&self) -> Unit {
        match self {
            Dimension::Volume => Unit::Liter,
            Dimension::Mass => Unit::Kilogram,
            Dimension::Discrete => Unit::Count,
        }
    }
}

/// A measurement unit for shopping and comparison items.
/// Deserialization goes through `FromStr`, so it is as lenient as parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Unit {
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "Kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "un")]
    Count,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Liter, Unit::Kilogram, Unit::Gram, Unit::Count];

    /// Boundary tag, also used as the database representation
    pub fn as_tag(&self) -> &'static str {
        match self {
            Unit::Liter => "L",
            Unit::Kilogram => "Kg",
            Unit::Gram => "g",
            Unit::Count => "un",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Liter => Dimension::Volume,
            Unit::Kilogram | Unit::Gram => Dimension::Mass,
            Unit::Count => Dimension::Discrete,
        }
    }

    pub fn base_unit(&self) -> Unit {
        self.dimension().base_unit()
    }

    /// Express a quantity of this unit in the base unit. Grams are divided
    /// rather than scaled by 0.001 so that 9 g and 0.009 Kg compare equal.
    pub fn to_base(&self, quantity: f64) -> f64 {
        match self {
            Unit::Gram => quantity / GRAMS_PER_KILOGRAM,
            Unit::Kilogram | Unit::Liter | Unit::Count => quantity,
        }
    }

    /// Whether items in this unit may enter a price comparison.
    /// Counted items are shopping-list only.
    pub fn is_comparable(&self) -> bool {
        !matches!(self, Unit::Count)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_tag())
    }
}

impl FromStr for Unit {
    type Err = PricingError;

    /// Parse a boundary tag. Matching ignores case and surrounding whitespace,
    /// since none of the four tags collide case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l" => Ok(Unit::Liter),
            "kg" => Ok(Unit::Kilogram),
            "g" => Ok(Unit::Gram),
            "un" => Ok(Unit::Count),
            _ => Err(PricingError::UnrecognizedUnit(s.to_string())),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("L".parse::<Unit>(), Ok(Unit::Liter));
        assert_eq!("Kg".parse::<Unit>(), Ok(Unit::Kilogram));
        assert_eq!("g".parse::<Unit>(), Ok(Unit::Gram));
        assert_eq!("un".parse::<Unit>(), Ok(Unit::Count));
        assert_eq!(" kg ".parse::<Unit>(), Ok(Unit::Kilogram));
        assert_eq!("l".parse::<Unit>(), Ok(Unit::Liter));
    }

    #[test]
    fn test_parse_rejects_unknown_tags() {
        assert_eq!(
            "ml".parse::<Unit>(),
            Err(PricingError::UnrecognizedUnit("ml".to_string()))
        );
        assert!("".parse::<Unit>().is_err());
        assert!("lb".parse::<Unit>().is_err());
    }

    #[test]
    fn test_tag_round_trip_for_every_unit() {
        for unit in Unit::ALL {
            assert_eq!(unit.as_tag().parse::<Unit>(), Ok(unit));
        }
    }

    #[test]
    fn test_dimensions_and_base_units() {
        assert_eq!(Unit::Gram.dimension(), Dimension::Mass);
        assert_eq!(Unit::Kilogram.dimension(), Dimension::Mass);
        assert_eq!(Unit::Liter.dimension(), Dimension::Volume);
        assert_eq!(Unit::Count.dimension(), Dimension::Discrete);

        assert_eq!(Unit::Gram.base_unit(), Unit::Kilogram);
        assert_eq!(Unit::Liter.base_unit(), Unit::Liter);
        assert_eq!(Unit::Count.base_unit(), Unit::Count);
    }

    #[test]
    fn test_to_base() {
        for unit in Unit::ALL {
            assert_eq!(unit.base_unit().to_base(2.5), 2.5);
        }
        assert_eq!(Unit::Gram.to_base(9.0), 0.009);
        assert_eq!(Unit::Gram.to_base(1500.0), 1.5);
    }

    #[test]
    fn test_serde_uses_boundary_tags() {
        assert_eq!(serde_json::to_string(&Unit::Kilogram).unwrap(), "\"Kg\"");
        assert_eq!(serde_json::from_str::<Unit>("\"un\"").unwrap(), Unit::Count);
        assert!(serde_json::from_str::<Unit>("\"oz\"").is_err());
    }

    #[test]
    fn test_serde_accepts_what_parse_accepts() {
        assert_eq!(serde_json::from_str::<Unit>("\"kg\"").unwrap(), Unit::Kilogram);
        assert_eq!(serde_json::from_str::<Unit>("\" l \"").unwrap(), Unit::Liter);
        assert_eq!(serde_json::from_str::<Unit>("\"UN\"").unwrap(), Unit::Count);
        assert_eq!(serde_json::to_string(&Unit::Liter).unwrap(), "\"L\"");
    }

    #[test]
    fn test_count_is_not_comparable() {
        assert!(!Unit::Count.is_comparable());
        assert!(Unit::Gram.is_comparable());
        assert!(Unit::Liter.is_comparable());
    }
}
