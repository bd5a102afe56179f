use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Div, Mul},
};

use chrono::TimeDelta;

use crate::quantity::{Quantity, cost::Cost, power::Watts, rate::KilowattHourRate};

pub type KilowattHours = Quantity<1, 1, 0>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

impl Div<TimeDelta> for KilowattHours {
    type Output = Option<Watts>;

    fn div(self, rhs: TimeDelta) -> Self::Output {
        let hours = rhs.as_seconds_f64() / 3600.0;
        (hours > 0.0).then(|| Quantity(self.0 * 1000.0 / hours))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_mul_rate() {
        let cost = KilowattHours::from(2.0) * KilowattHourRate::from_minor_units(28.22);
        assert_abs_diff_eq!(cost.0, 0.5644);
    }

    #[test]
    fn test_div_time_delta() {
        let power = KilowattHours::from(0.25) / TimeDelta::minutes(30);
        assert_abs_diff_eq!(power.unwrap().0, 500.0);
        assert!((KilowattHours::from(1.0) / TimeDelta::zero()).is_none());
    }
}
