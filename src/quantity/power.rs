use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use chrono::TimeDelta;

use crate::quantity::{Quantity, energy::KilowattHours};

/// Signed instantaneous power.
pub type Watts = Quantity<1, 0, 0>;

impl Display for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} W", self.0)
    }
}

impl Debug for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}W", self.0)
    }
}

/// Zero-order hold: the power is held constant over the whole time delta.
impl Mul<TimeDelta> for Watts {
    type Output = KilowattHours;

    fn mul(self, rhs: TimeDelta) -> Self::Output {
        let hours = rhs.as_seconds_f64() / 3600.0;
        Quantity(self.0 * 0.001 * hours)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_mul_time_delta() {
        assert_abs_diff_eq!((Watts::from(500.0) * TimeDelta::hours(1)).0, 0.5);
        assert_abs_diff_eq!((Watts::from(1200.0) * TimeDelta::minutes(15)).0, 0.3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Watts::from(-1234.4).to_string(), "-1234 W");
    }
}
