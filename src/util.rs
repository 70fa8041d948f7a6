// Utility helpers for parsing, statistics and number formatting.
//
// Cleaning code goes through the parsers here so the rest of the crate can
// assume typed values.
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a CSV field into `f64`, forgiving about thousands separators and
/// surrounding whitespace.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","` before parsing.
/// - Accepts exponent notation (`1.5E+03`).
/// - Rejects `nan`, `inf` and anything else that is not a finite number.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Calendar dates are expected as `YYYY-MM-DD`. A trailing time component
/// (as written by spreadsheet exports) is accepted and dropped.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Sunday closing the calendar week that contains `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let offset = 6 - date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(offset as u64)).unwrap_or(date)
}

/// `March 2024` style label for a calendar month.
pub fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Mean over the finite values only, `None` when there are none.
pub fn mean_finite(v: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(average(&finite))
    }
}

/// Pearson correlation. `None` for fewer than two pairs or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = average(x);
    let my = average(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx <= 0.0 || vy <= 0.0 {
        return None;
    }
    let r = cov / (vx.sqrt() * vy.sqrt());
    r.is_finite().then_some(r)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = group_thousands(int_part);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // `-0.00` reads as noise, keep the sign only for non-zero output.
    let is_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

/// Insert separators every three digits of an unsigned digit string of any
/// length, including magnitudes beyond `u64::MAX`.
fn group_thousands(digits: &str) -> String {
    let sep = Locale::en.separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

pub fn format_percent(n: f64) -> String {
    if n.is_finite() {
        format!("{:.2}%", n)
    } else {
        format!("{}%", format_number(n, 2))
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
