use std::fmt::{Debug, Display, Formatter};

/// Percentage which is already scaled to `0..=100`.
pub struct FormattedPercentage(pub f64);

impl Debug for FormattedPercentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for FormattedPercentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Human-readable byte count.
pub struct FormattedBytes(pub u64);

impl Display for FormattedBytes {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit + 1 < UNITS.len() {
            value /= 1024.0;
            unit += 1;
        }
        if unit == 0 { write!(f, "{} B", self.0) } else { write!(f, "{value:.1} {}", UNITS[unit]) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_ok() {
        assert_eq!(FormattedPercentage(87.654).to_string(), "87.7%");
    }

    #[test]
    fn bytes_ok() {
        assert_eq!(FormattedBytes(512).to_string(), "512 B");
        assert_eq!(FormattedBytes(1536).to_string(), "1.5 KiB");
        assert_eq!(FormattedBytes(3 * 1024 * 1024).to_string(), "3.0 MiB");
    }
}
