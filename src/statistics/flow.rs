use std::ops::Mul;

use chrono::TimeDelta;
use derive_more::{Add, AddAssign};

use crate::quantity::{Quantity, energy::KilowattHours, power::Watts};

/// Generic bidirectional energy flow.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Add, AddAssign)]
pub struct Flow<T> {
    /// Importing from grid or charging the battery.
    pub import: T,

    /// Exporting to the grid or discharging the battery.
    pub export: T,
}

impl Flow<Watts> {
    /// Split the signed power, where positive means import.
    pub fn from_signed(power: Watts) -> Self {
        Self { import: power.max(Quantity::ZERO), export: (-power).max(Quantity::ZERO) }
    }
}

impl Mul<TimeDelta> for Flow<Watts> {
    type Output = Flow<KilowattHours>;

    fn mul(self, time_delta: TimeDelta) -> Self::Output {
        Flow { import: self.import * time_delta, export: self.export * time_delta }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn from_signed_ok() {
        assert_eq!(
            Flow::from_signed(Watts::from(500.0)),
            Flow { import: Watts::from(500.0), export: Watts::ZERO },
        );
        assert_eq!(
            Flow::from_signed(Watts::from(-200.0)),
            Flow { import: Watts::ZERO, export: Watts::from(200.0) },
        );
        assert_eq!(Flow::from_signed(Watts::ZERO), Flow::default());
    }

    #[test]
    fn mul_time_delta_ok() {
        let flow = Flow::from_signed(Watts::from(-1500.0)) * TimeDelta::minutes(20);
        assert_abs_diff_eq!(flow.import.0, 0.0);
        assert_abs_diff_eq!(flow.export.0, 0.5);
    }
}
