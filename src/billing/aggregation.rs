//! Revenue aggregation for the billing chart.
//!
//! Provides functions to bucket paid invoices into the twelve months of a
//! year or the days of a single month, and to turn those buckets into the
//! [Series] the chart plots.

use time::{Date, Month};

use crate::{
    billing::{
        record::TransactionRecord,
        series::{
            MONTHLY_SERIES_LABEL, Period, Series, SeriesPoint, daily_series_label,
            start_of_day_timestamp,
        },
    },
    timezone::LocalTimezone,
};

/// Sums paid revenue into one bucket per month of `year`.
///
/// # Returns
/// Twelve totals, January first. Months without revenue are zero.
pub(crate) fn monthly_revenue(
    records: &[TransactionRecord],
    year: i32,
    timezone: LocalTimezone,
) -> [f64; 12] {
    let mut totals = [0.0; 12];

    for (date, amount) in records
        .iter()
        .filter_map(|record| record.paid_revenue(timezone))
    {
        if date.year() == year {
            totals[month_index(date.month())] += amount;
        }
    }

    totals
}

/// Sums paid revenue into one bucket per day of `period`.
///
/// # Returns
/// One total per day of the month, the first of the month first. Days
/// without revenue are zero.
pub(crate) fn daily_revenue(
    records: &[TransactionRecord],
    period: Period,
    timezone: LocalTimezone,
) -> Vec<f64> {
    let mut totals = vec![0.0; period.days().len()];

    for (date, amount) in records
        .iter()
        .filter_map(|record| record.paid_revenue(timezone))
    {
        if period.contains(date) {
            totals[usize::from(date.day()) - 1] += amount;
        }
    }

    totals
}

/// Builds the series shown in the monthly view.
pub(crate) fn monthly_series(
    records: &[TransactionRecord],
    year: i32,
    timezone: LocalTimezone,
) -> Series {
    let totals = monthly_revenue(records, year, timezone);

    let mut month = Month::January;
    let mut points = Vec::with_capacity(totals.len());

    for value in totals {
        // Only fails for years outside the range `time` supports.
        if let Ok(first_day) = Date::from_calendar_date(year, month, 1) {
            points.push(SeriesPoint {
                timestamp: start_of_day_timestamp(first_day, timezone),
                value,
            });
        }

        month = month.next();
    }

    Series {
        label: MONTHLY_SERIES_LABEL.to_owned(),
        points,
    }
}

/// Builds the series shown in the daily view of `period`.
pub(crate) fn daily_series(
    records: &[TransactionRecord],
    period: Period,
    timezone: LocalTimezone,
) -> Series {
    let totals = daily_revenue(records, period, timezone);

    let points = period
        .days()
        .into_iter()
        .zip(totals)
        .map(|(day, value)| SeriesPoint {
            timestamp: start_of_day_timestamp(day, timezone),
            value,
        })
        .collect();

    Series {
        label: daily_series_label(period),
        points,
    }
}

fn month_index(month: Month) -> usize {
    usize::from(u8::from(month)) - 1
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::{
        billing::{
            aggregation::{daily_revenue, daily_series, monthly_revenue, monthly_series},
            record::{TransactionRecord, TransactionStatus},
            series::{Period, start_of_day_timestamp},
        },
        timezone::LocalTimezone,
    };

    fn paid(amount: f64, created_at: &str) -> TransactionRecord {
        TransactionRecord::new(amount, created_at, TransactionStatus::Paid)
    }

    fn pending(amount: f64, created_at: &str) -> TransactionRecord {
        TransactionRecord::new(amount, created_at, TransactionStatus::Pending)
    }

    fn clinic_records() -> Vec<TransactionRecord> {
        vec![
            paid(100.0, "2024-03-05"),
            pending(50.0, "2024-03-20"),
            paid(200.0, "2024-07-01"),
        ]
    }

    #[test]
    fn monthly_revenue_buckets_paid_invoices() {
        let totals = monthly_revenue(&clinic_records(), 2024, LocalTimezone::UTC);

        let mut want = [0.0; 12];
        want[2] = 100.0;
        want[6] = 200.0;
        assert_eq!(totals, want);
        assert_eq!(totals.iter().sum::<f64>(), 300.0);
    }

    #[test]
    fn monthly_revenue_ignores_other_years() {
        let records = vec![
            paid(10.0, "2023-12-31"),
            paid(20.0, "2024-01-01"),
            paid(40.0, "2025-01-01"),
        ];

        let totals = monthly_revenue(&records, 2024, LocalTimezone::UTC);

        assert_eq!(totals[0], 20.0);
        assert_eq!(totals.iter().sum::<f64>(), 20.0);
    }

    #[test]
    fn monthly_revenue_handles_empty_input() {
        let totals = monthly_revenue(&[], 2024, LocalTimezone::UTC);

        assert_eq!(totals, [0.0; 12]);
    }

    #[test]
    fn monthly_total_matches_paid_total_for_year() {
        let records = vec![
            paid(12.5, "2024-01-15"),
            paid(7.5, "2024-01-31T23:00:00Z"),
            pending(99.0, "2024-02-02"),
            paid(30.0, "2024-06-30"),
            paid(1.25, "2024-12-31"),
            paid(500.0, "2023-06-30"),
            paid(5.0, "garbage"),
        ];
        let want: f64 = records
            .iter()
            .filter_map(|record| record.paid_revenue(LocalTimezone::UTC))
            .filter(|(date, _)| date.year() == 2024)
            .map(|(_, amount)| amount)
            .sum();

        let totals = monthly_revenue(&records, 2024, LocalTimezone::UTC);

        assert_eq!(totals.iter().sum::<f64>(), want);
        assert_eq!(want, 51.25);
    }

    #[test]
    fn daily_total_matches_monthly_bucket() {
        let records = vec![
            paid(100.0, "2024-03-05"),
            paid(25.0, "2024-03-05T18:30:00Z"),
            paid(60.0, "2024-03-31"),
            paid(15.0, "2024-04-01"),
            pending(80.0, "2024-03-10"),
        ];
        let monthly = monthly_revenue(&records, 2024, LocalTimezone::UTC);

        for (index, month) in [Month::March, Month::April, Month::May].iter().enumerate() {
            let daily = daily_revenue(&records, Period::new(2024, *month), LocalTimezone::UTC);

            assert_eq!(daily.iter().sum::<f64>(), monthly[index + 2], "{month}");
        }
    }

    #[test]
    fn daily_revenue_zero_fills_every_day() {
        let totals = daily_revenue(
            &clinic_records(),
            Period::new(2024, Month::March),
            LocalTimezone::UTC,
        );

        assert_eq!(totals.len(), 31);
        assert_eq!(totals[4], 100.0);
        assert_eq!(totals.iter().filter(|value| **value != 0.0).count(), 1);
    }

    #[test]
    fn changing_paid_to_pending_only_affects_its_bucket() {
        let mut records = clinic_records();
        let before = monthly_revenue(&records, 2024, LocalTimezone::UTC);

        records[2].status = TransactionStatus::Pending;
        let after = monthly_revenue(&records, 2024, LocalTimezone::UTC);

        for month in 0..12 {
            if month == 6 {
                assert_eq!(after[month], before[month] - 200.0);
            } else {
                assert_eq!(after[month], before[month]);
            }
        }
    }

    #[test]
    fn monthly_series_has_twelve_points_at_month_starts() {
        let series = monthly_series(&clinic_records(), 2024, LocalTimezone::UTC);

        assert_eq!(series.label, "Total Revenue");
        assert_eq!(series.points.len(), 12);
        assert_eq!(
            series.points[0].timestamp,
            start_of_day_timestamp(date!(2024 - 01 - 01), LocalTimezone::UTC)
        );
        assert_eq!(
            series.points[6].timestamp,
            start_of_day_timestamp(date!(2024 - 07 - 01), LocalTimezone::UTC)
        );
        assert_eq!(series.points[6].value, 200.0);
        assert_eq!(series.total(), 300.0);
    }

    #[test]
    fn daily_series_has_one_point_per_day() {
        let series = daily_series(
            &clinic_records(),
            Period::new(2024, Month::February),
            LocalTimezone::UTC,
        );

        assert_eq!(series.label, "Revenue (February)");
        assert_eq!(series.points.len(), 29);
        assert_eq!(
            series.points[28].timestamp,
            start_of_day_timestamp(date!(2024 - 02 - 29), LocalTimezone::UTC)
        );
        assert_eq!(series.total(), 0.0);
    }
}
