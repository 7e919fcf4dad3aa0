//! Pure folds from raw backend rows into chart-ready series.
//!
//! Buckets come out in the order their key was first seen. Rows with a
//! missing or unparsable date are dropped; nothing here returns an error.

use crate::models::{
    AdmissionRecord, AgeCounts, AppointmentDay, AppointmentRecord, BillRecord, BillingDay,
    CategoryCount, GenderCounts, MonthlySeries, PrescriptionRecord, RegistrationDay, RxDay,
    WeekCounts,
};
use crate::window::{TrackedMonths, day_label, month_label, parse_record_date, week_of_month_label};
use chrono::NaiveDate;
use ordermap::OrderMap;

pub const TOP_CATEGORY_LIMIT: usize = 10;

pub const AGE_BANDS: [&str; 5] = ["(0-10)", "(11-25)", "(26-40)", "(41-59)", "60+"];

fn record_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_record_date)
}

fn bucket<T>(buckets: &mut OrderMap<String, T>, key: String, make: impl FnOnce(String) -> T) -> &mut T {
    buckets.entry(key.clone()).or_insert_with(|| make(key))
}

fn into_entries<K, T>(buckets: OrderMap<K, T>) -> Vec<T> {
    buckets.into_iter().map(|(_, entry)| entry).collect()
}

pub fn consultation_summary(
    rows: &[PrescriptionRecord],
    months: &TrackedMonths,
) -> MonthlySeries<WeekCounts> {
    weekly_counts(rows.iter().map(|row| row.prescription_date.as_deref()), months)
}

/// Completed follow-up appointments per week of month.
pub fn follow_up_summary(
    rows: &[AppointmentRecord],
    months: &TrackedMonths,
) -> MonthlySeries<WeekCounts> {
    weekly_counts(rows.iter().map(|row| row.appointment_date.as_deref()), months)
}

// Week-of-month buckets are shared across months: Week 1 of March and
// Week 1 of April land in the same entry, in different columns. A date
// outside the tracked months still opens its week bucket.
fn weekly_counts<'a>(
    dates: impl Iterator<Item = Option<&'a str>>,
    months: &TrackedMonths,
) -> MonthlySeries<WeekCounts> {
    let mut weeks: OrderMap<String, WeekCounts> = OrderMap::new();
    for date in dates.filter_map(record_date) {
        let entry = bucket(&mut weeks, week_of_month_label(date), |week| WeekCounts {
            week,
            counts: [0; 3],
        });
        if let Some(column) = months.index_of(date) {
            entry.counts[column] += 1;
        }
    }

    MonthlySeries {
        months: months.labels(),
        entries: into_entries(weeks),
    }
}

/// Gender split per calendar month of the prescription date.
pub fn gender_summary(rows: &[PrescriptionRecord]) -> Vec<GenderCounts> {
    let mut by_month: OrderMap<String, GenderCounts> = OrderMap::new();
    for row in rows {
        let Some(date) = record_date(row.prescription_date.as_deref()) else {
            continue;
        };
        let entry = bucket(&mut by_month, month_label(date).to_string(), |month| {
            GenderCounts {
                month,
                males: 0,
                females: 0,
                others: 0,
            }
        });
        match row.gender.as_deref() {
            Some("M") => entry.males += 1,
            Some("F") => entry.females += 1,
            _ => entry.others += 1,
        }
    }
    into_entries(by_month)
}

/// Leading signed integer of `raw`, the way a lenient form field is read:
/// `"25"`, `" 25 yrs"` and `"25.7"` all give 25.
pub fn parse_age(raw: &str) -> Option<i64> {
    let value = raw.trim_start();
    let sign_len = usize::from(value.starts_with(['-', '+']));
    let digits = value[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len() - sign_len);
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse().ok()
}

pub fn age_band(age: i64) -> usize {
    match age {
        ..=10 => 0,
        11..=25 => 1,
        26..=40 => 2,
        41..=59 => 3,
        _ => 4,
    }
}

/// All five bands in fixed order whenever there is at least one row. Rows
/// whose age does not parse are left out of every band.
pub fn age_summary(rows: &[PrescriptionRecord], months: &TrackedMonths) -> MonthlySeries<AgeCounts> {
    if rows.is_empty() {
        return MonthlySeries {
            months: months.labels(),
            entries: Vec::new(),
        };
    }

    let mut bands = [[0u64; 3]; AGE_BANDS.len()];
    for row in rows {
        let Some(column) = record_date(row.prescription_date.as_deref())
            .and_then(|date| months.index_of(date))
        else {
            continue;
        };
        let Some(age) = row.age.as_deref().and_then(parse_age) else {
            continue;
        };
        bands[age_band(age)][column] += 1;
    }

    MonthlySeries {
        months: months.labels(),
        entries: AGE_BANDS
            .iter()
            .zip(bands)
            .map(|(label, counts)| AgeCounts {
                age_group: label.to_string(),
                counts,
            })
            .collect(),
    }
}

pub fn appointment_summary(rows: &[AppointmentRecord]) -> Vec<AppointmentDay> {
    let mut days: OrderMap<String, AppointmentDay> = OrderMap::new();
    for row in rows {
        let Some(date) = record_date(row.appointment_date.as_deref()) else {
            continue;
        };
        let day = bucket(&mut days, day_label(date), |date| AppointmentDay {
            date,
            ..AppointmentDay::default()
        });
        day.total += 1;
        match row.booking_status.as_deref() {
            Some("A") => day.approved += 1,
            Some("C") => day.cancelled += 1,
            Some("D") => day.completed += 1,
            _ => {}
        }
    }
    into_entries(days)
}

/// Gross amount when present, otherwise the payment received. A value that
/// is present but not a number counts as zero.
pub fn bill_amount(row: &BillRecord) -> f64 {
    [row.gross_amount.as_deref(), row.payment_received.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

pub fn billing_summary(rows: &[BillRecord]) -> Vec<BillingDay> {
    let mut days: OrderMap<String, BillingDay> = OrderMap::new();
    for row in rows {
        let Some(date) = record_date(row.bill_date.as_deref()) else {
            continue;
        };
        let day = bucket(&mut days, day_label(date), |date| BillingDay {
            date,
            amount: 0.0,
        });
        day.amount += bill_amount(row);
    }
    into_entries(days)
}

pub fn billing_total(days: &[BillingDay]) -> f64 {
    days.iter().map(|day| day.amount).sum()
}

pub fn registration_summary(rows: &[AdmissionRecord]) -> Vec<RegistrationDay> {
    let mut days: OrderMap<String, RegistrationDay> = OrderMap::new();
    for row in rows {
        let Some(date) = record_date(row.admission_date.as_deref()) else {
            continue;
        };
        let day = bucket(&mut days, day_label(date), |date| RegistrationDay {
            date,
            ..RegistrationDay::default()
        });
        day.total += 1;
        match row.ipd_status.as_deref() {
            Some("A") => day.approved += 1,
            Some("C") => day.cancelled += 1,
            Some("D") => day.discharged += 1,
            _ => {}
        }
    }
    into_entries(days)
}

/// Prescriptions written per day.
pub fn rx_summary(rows: &[PrescriptionRecord]) -> Vec<RxDay> {
    let mut days: OrderMap<String, RxDay> = OrderMap::new();
    for row in rows {
        let Some(date) = record_date(row.prescription_date.as_deref()) else {
            continue;
        };
        bucket(&mut days, day_label(date), |date| RxDay { date, count: 0 }).count += 1;
    }
    into_entries(days)
}

/// Tallies non-blank labels and keeps the `limit` most frequent. The sort is
/// stable, so equal counts keep first-seen order.
pub fn top_categories<'a>(
    labels: impl IntoIterator<Item = Option<&'a str>>,
    limit: usize,
) -> Vec<CategoryCount> {
    let mut tally: OrderMap<&'a str, u64> = OrderMap::new();
    for label in labels.into_iter().flatten().map(str::trim) {
        if label.is_empty() {
            continue;
        }
        *tally.entry(label).or_insert(0) += 1;
    }

    let mut ranked: Vec<CategoryCount> = tally
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

pub fn symptom_summary(rows: &[PrescriptionRecord]) -> Vec<CategoryCount> {
    top_categories(rows.iter().map(|row| row.symptom.as_deref()), TOP_CATEGORY_LIMIT)
}

pub fn diagnosis_summary(rows: &[PrescriptionRecord]) -> Vec<CategoryCount> {
    top_categories(rows.iter().map(|row| row.diagnosis.as_deref()), TOP_CATEGORY_LIMIT)
}
