use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Pounds per kilowatt-hour.
pub type KilowattHourRate = Quantity<-1, -1, 1>;

impl KilowattHourRate {
    /// Convert from pence per kilowatt-hour.
    pub const fn from_minor_units(pence: f64) -> Self {
        Self(pence * 0.01)
    }
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} p/kWh", self.0 * 100.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}p/kWh", self.0 * 100.0)
    }
}
