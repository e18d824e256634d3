//! Canonical variables and the units their raw columns arrive in.

use std::fmt;
use std::str::FromStr;

use crate::error::TabularError;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Depth of water (precipitation).
    Length,
    /// Air temperature.
    Temperature,
}

/// Unit encoded in a raw column label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Inches of water, converted to millimetres.
    Inches,
    /// Millimetres of water (target unit).
    Millimeters,
    /// Degrees Celsius (target unit).
    Celsius,
    /// Degrees Fahrenheit, converted to Celsius.
    Fahrenheit,
}

impl Unit {
    /// Extracts the unit from the last parenthesised token of a label,
    /// e.g. `"PREC.I-1 (in) "` gives [`Unit::Inches`].
    pub fn from_label(label: &str) -> Option<Self> {
        let open = label.rfind('(')?;
        let close = open + label[open..].find(')')?;
        label[open + 1..close].trim().parse().ok()
    }

    /// Short symbol as written in labels.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Inches => "in",
            Self::Millimeters => "mm",
            Self::Celsius => "degC",
            Self::Fahrenheit => "degF",
        }
    }

    /// The quantity this unit measures.
    pub fn quantity(self) -> Quantity {
        match self {
            Self::Inches | Self::Millimeters => Quantity::Length,
            Self::Celsius | Self::Fahrenheit => Quantity::Temperature,
        }
    }

    /// Target unit values are normalised to.
    pub fn target(self) -> Self {
        match self.quantity() {
            Quantity::Length => Self::Millimeters,
            Quantity::Temperature => Self::Celsius,
        }
    }

    /// Converts one value into [`target`](Self::target) units.
    ///
    /// Inches are a pure scalar multiply by [`MM_PER_INCH`]. `NaN` stays
    /// `NaN`.
    pub fn to_target(self, value: f64) -> f64 {
        match self {
            Self::Inches => value * MM_PER_INCH,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Millimeters | Self::Celsius => value,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" | "inch" | "inches" => Ok(Self::Inches),
            "mm" => Ok(Self::Millimeters),
            "degC" | "C" | "celsius" => Ok(Self::Celsius),
            "degF" | "F" | "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(TabularError::UnknownUnit {
                label: other.to_string(),
            }),
        }
    }
}

/// A forcing variable the driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// Daily precipitation.
    Precipitation,
    /// Daily maximum air temperature.
    TempMax,
    /// Daily minimum air temperature.
    TempMin,
}

impl Variable {
    /// Every variable, in output order.
    pub const ALL: [Variable; 3] = [Self::Precipitation, Self::TempMax, Self::TempMin];

    /// Name used in persisted datasets and driver variable maps.
    pub fn name(self) -> &'static str {
        match self {
            Self::Precipitation => "prec",
            Self::TempMax => "t_max",
            Self::TempMin => "t_min",
        }
    }

    /// Human-readable description.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::Precipitation => "daily precipitation",
            Self::TempMax => "daily maximum air temperature",
            Self::TempMin => "daily minimum air temperature",
        }
    }

    /// Quantity the variable measures.
    pub fn quantity(self) -> Quantity {
        match self {
            Self::Precipitation => Quantity::Length,
            Self::TempMax | Self::TempMin => Quantity::Temperature,
        }
    }

    /// Unit of the variable once normalised.
    pub fn target_unit(self) -> Unit {
        match self.quantity() {
            Quantity::Length => Unit::Millimeters,
            Quantity::Temperature => Unit::Celsius,
        }
    }

    /// Unit attribute for the persisted variable.
    pub fn units_attr(self) -> &'static str {
        match self {
            Self::Precipitation => "mm day-1",
            Self::TempMax | Self::TempMin => "degC",
        }
    }

    /// Checks that `unit` measures this variable's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`TabularError::IncompatibleUnit`] otherwise.
    pub fn check_unit(self, unit: Unit) -> Result<(), TabularError> {
        if unit.quantity() == self.quantity() {
            Ok(())
        } else {
            Err(TabularError::IncompatibleUnit {
                variable: self.name().to_string(),
                unit: unit.symbol().to_string(),
            })
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prec" => Ok(Self::Precipitation),
            "t_max" => Ok(Self::TempMax),
            "t_min" => Ok(Self::TempMin),
            other => Err(TabularError::UnknownVariable {
                name: other.to_string(),
            }),
        }
    }
}
