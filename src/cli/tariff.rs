use chrono::NaiveTime;
use chrono_tz::Tz;
use clap::Parser;

use crate::{
    quantity::{cost::Cost, rate::KilowattHourRate},
    tariff::{LowRateWindow, Tariff, parse_time_of_day},
};

/// Day/night tariff, with the rates in pence.
#[derive(Parser)]
pub struct TariffArgs {
    /// Low-rate import, pence per kilowatt-hour.
    #[clap(long = "low-rate", env = "TARIFF_LOW_RATE", default_value = "6.67")]
    low_rate: f64,

    /// High-rate import, pence per kilowatt-hour.
    #[clap(long = "high-rate", env = "TARIFF_HIGH_RATE", default_value = "28.22")]
    high_rate: f64,

    /// Export, pence per kilowatt-hour.
    #[clap(long = "export-rate", env = "TARIFF_EXPORT_RATE", default_value = "15.0")]
    export_rate: f64,

    /// Standing charge, pence per day.
    #[clap(long = "standing-charge", env = "TARIFF_STANDING_CHARGE", default_value = "44.84")]
    standing_charge: f64,

    /// Local start of the low-rate window, `HH:MM`.
    #[clap(
        long = "low-rate-start",
        env = "TARIFF_LOW_RATE_START",
        default_value = "23:30",
        value_parser = parse_time_of_day,
    )]
    low_rate_start: NaiveTime,

    /// Local end of the low-rate window, `HH:MM`.
    #[clap(
        long = "low-rate-end",
        env = "TARIFF_LOW_RATE_END",
        default_value = "05:30",
        value_parser = parse_time_of_day,
    )]
    low_rate_end: NaiveTime,
}

impl TariffArgs {
    /// Build the tariff with the low-rate window in the time zone.
    pub fn tariff(&self, time_zone: Tz) -> Tariff {
        Tariff::builder()
            .low_rate(KilowattHourRate::from_minor_units(self.low_rate))
            .high_rate(KilowattHourRate::from_minor_units(self.high_rate))
            .export_rate(KilowattHourRate::from_minor_units(self.export_rate))
            .standing_charge(Cost::from_minor_units(self.standing_charge))
            .low_rate_window(LowRateWindow::new(self.low_rate_start, self.low_rate_end))
            .time_zone(time_zone)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono_tz::Europe::London;

    use super::*;
    use crate::prelude::*;

    #[derive(Parser)]
    struct Args {
        #[clap(flatten)]
        tariff: TariffArgs,
    }

    #[test]
    fn defaults_ok() -> Result {
        let tariff = Args::try_parse_from(["pv3-monitor"])?.tariff.tariff(London);
        assert_abs_diff_eq!(tariff.low_rate.0, 0.0667);
        assert_abs_diff_eq!(tariff.high_rate.0, 0.2822);
        assert_abs_diff_eq!(tariff.export_rate.0, 0.15);
        assert_abs_diff_eq!(tariff.standing_charge.0, 0.4484);
        assert_eq!(tariff.low_rate_window.start, parse_time_of_day("23:30")?);
        assert_eq!(tariff.low_rate_window.end, parse_time_of_day("05:30")?);
        assert_eq!(tariff.time_zone, London);
        Ok(())
    }

    #[test]
    fn overrides_ok() -> Result {
        let args =
            Args::try_parse_from(["pv3-monitor", "--low-rate-start", "00:30", "--high-rate", "30"])?;
        let tariff = args.tariff.tariff(London);
        assert_eq!(tariff.low_rate_window.start, parse_time_of_day("00:30")?);
        assert_abs_diff_eq!(tariff.high_rate.0, 0.3);
        Ok(())
    }

    #[test]
    fn invalid_time_of_day_err() {
        assert!(Args::try_parse_from(["pv3-monitor", "--low-rate-end", "5pm"]).is_err());
    }
}
