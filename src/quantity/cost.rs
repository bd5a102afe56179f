use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Amount of money in the major currency unit (pounds).
pub type Cost = Quantity<0, 0, 1>;

impl Cost {
    /// Convert from the minor currency unit (pence).
    pub const fn from_minor_units(pence: f64) -> Self {
        Self(pence * 0.01)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0.0 { write!(f, "-£{:.2}", -self.0) } else { write!(f, "£{:.2}", self.0) }
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{:.4}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_from_minor_units() {
        assert_abs_diff_eq!(Cost::from_minor_units(44.84).0, 0.4484);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cost::from(1.234).to_string(), "£1.23");
        assert_eq!(Cost::from(-0.5).to_string(), "-£0.50");
    }
}
