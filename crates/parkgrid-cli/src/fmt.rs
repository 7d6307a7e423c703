//! Output formatting helpers for the one-shot subcommands.

use std::io::{self, Write};

use parkgrid_core::model::{AvailabilityWindow, Booking, MonthlyIncomeReport, SearchResult, Space};
use parkgrid_core::time;

/// Truncate a string to `max` characters, appending "..." when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}

pub fn write_search_results(w: &mut impl Write, items: &[SearchResult]) -> io::Result<()> {
    if items.is_empty() {
        writeln!(w, "No results.")?;
        return Ok(());
    }
    writeln!(
        w,
        "{:<6}  {:<28}  {:<32}  {:>10}  {:>8}",
        "ID", "TITLE", "ADDRESS", "DISTANCE", "CAP"
    )?;
    for item in items {
        writeln!(
            w,
            "{:<6}  {:<28}  {:<32}  {:>8} m  {:>8}",
            item.id,
            truncate(&item.title, 28),
            truncate(item.display_address(), 32),
            item.distance_m.round(),
            item.capacity,
        )?;
    }
    Ok(())
}

pub fn write_bookings(w: &mut impl Write, bookings: &[Booking]) -> io::Result<()> {
    if bookings.is_empty() {
        writeln!(w, "No bookings yet.")?;
        return Ok(());
    }
    writeln!(
        w,
        "{:<6}  {:<24}  {:<22}  {:<22}  {:<11}  {:>9}",
        "ID", "SPACE", "START", "END", "STATUS", "TOTAL"
    )?;
    for b in bookings {
        let total = b
            .price_total
            .map_or_else(|| "--".to_string(), |p| format!("{p:.2}"));
        writeln!(
            w,
            "{:<6}  {:<24}  {:<22}  {:<22}  {:<11}  {:>9}",
            b.id,
            truncate(b.space_title(), 24),
            time::format_display(&b.start_ts),
            time::format_display(&b.end_ts),
            b.status.to_string(),
            total,
        )?;
    }
    Ok(())
}

pub fn write_spaces(w: &mut impl Write, spaces: &[Space]) -> io::Result<()> {
    if spaces.is_empty() {
        writeln!(w, "No spaces yet.")?;
        return Ok(());
    }
    writeln!(
        w,
        "{:<6}  {:<28}  {:<36}  {:>4}  {:<6}",
        "ID", "TITLE", "ADDRESS", "CAP", "ACTIVE"
    )?;
    for s in spaces {
        writeln!(
            w,
            "{:<6}  {:<28}  {:<36}  {:>4}  {:<6}",
            s.id,
            truncate(&s.title, 28),
            truncate(s.display_address(), 36),
            s.capacity,
            if s.is_active { "yes" } else { "no" },
        )?;
    }
    Ok(())
}

pub fn write_availability(w: &mut impl Write, windows: &[AvailabilityWindow]) -> io::Result<()> {
    if windows.is_empty() {
        writeln!(w, "No availability windows.")?;
        return Ok(());
    }
    writeln!(
        w,
        "{:<6}  {:<22}  {:<22}  {:>10}  {:<6}",
        "ID", "START", "END", "RATE/H", "ACTIVE"
    )?;
    for av in windows {
        writeln!(
            w,
            "{:<6}  {:<22}  {:<22}  {:>10.2}  {:<6}",
            av.id,
            time::format_display(&av.start_ts),
            time::format_display(&av.end_ts),
            av.base_price_per_hour,
            if av.is_active { "yes" } else { "no" },
        )?;
    }
    Ok(())
}

pub fn write_report(w: &mut impl Write, report: &MonthlyIncomeReport) -> io::Result<()> {
    if report.months.is_empty() {
        writeln!(w, "No completed bookings yet.")?;
        return Ok(());
    }
    writeln!(w, "{:<10}  {:>6}  {:>12}", "MONTH", "COUNT", "INCOME")?;
    for m in &report.months {
        writeln!(w, "{:<10}  {:>6}  {:>12.2}", m.month, m.count, m.total)?;
    }
    writeln!(w, "{:<10}  {:>6}  {:>12.2}", "TOTAL", "", report.total_income)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("Banani", 10), "Banani");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate("a very long title here", 10), "a very ...");
    }

    #[test]
    fn search_results_table_shows_distance_in_meters() {
        let items: Vec<SearchResult> = serde_json::from_value(serde_json::json!([
            {"id": 5, "title": "X", "distance_m": 320.0}
        ]))
        .unwrap();
        let mut out = Vec::new();
        write_search_results(&mut out, &items).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("X"));
        assert!(text.contains("320 m"));
    }

    #[test]
    fn empty_bookings_print_placeholder() {
        let mut out = Vec::new();
        write_bookings(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No bookings yet.\n");
    }

    #[test]
    fn report_table_includes_total() {
        let report: MonthlyIncomeReport = serde_json::from_value(serde_json::json!({
            "months": [{"month": "2026-07", "count": 2, "total": 300.0}],
            "total_income": 300.0
        }))
        .unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2026-07"));
        assert!(text.contains("TOTAL"));
    }
}
