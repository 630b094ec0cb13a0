//! Console formatting for projection metrics and tables

use crate::projection::calendar::month_label;
use crate::projection::{ProjectionResult, ProjectionRow};

/// Format an amount as `$1,234,567` with `precision` decimals
pub fn format_currency(amount: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, amount.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{}${}.{}", sign, grouped, fraction),
        None => format!("{}${}", sign, grouped),
    }
}

/// `∞` for unbounded runway, otherwise months to one decimal
pub fn format_months(months: f64) -> String {
    if months.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.1} mo", months)
    }
}

pub fn format_payback(months: Option<u32>) -> String {
    match months {
        Some(m) => format!("{:.1} mo", f64::from(m)),
        None => "Not reached".to_string(),
    }
}

/// One headline metric with its supporting note
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub label: &'static str,
    pub value: String,
    pub note: String,
}

/// Headline metrics in display order
pub fn metric_lines(result: &ProjectionResult) -> Vec<MetricLine> {
    let m = &result.metrics;
    let line = |label, value, note: &str| MetricLine {
        label,
        value,
        note: note.to_string(),
    };

    vec![
        line("Final Cash Balance", format_currency(m.final_cash, 0), "End of horizon"),
        line("Minimum Cash", format_currency(m.min_cash, 0), "Lowest point"),
        line(
            "Annual Recurring Revenue",
            format_currency(m.annual_recurring_revenue, 0),
            "Year-end ARR",
        ),
        line("Avg Monthly Burn", format_currency(m.avg_monthly_burn, 0), "/month"),
        line("Avg Debt Service", format_currency(m.avg_debt_service, 0), "/month"),
        line(
            "Runway",
            format_months(m.runway_months),
            &format!("Runs dry: {}", m.runway_label()),
        ),
        line(
            "Safety Buffer",
            format_months(m.safety_buffer_months),
            &format!("Target: {:.1} mo", m.cash_safety_months),
        ),
        line(
            "Payback Period",
            format_payback(m.payback_months),
            "When cumulative cash exceeds starting cash",
        ),
    ]
}

/// Metric block for one scenario, with the shortfall warning if any
pub fn render_summary(result: &ProjectionResult) -> String {
    let mut out = format!("{}\n{}\n", result.scenario_label, "=".repeat(result.scenario_label.len()));
    for metric in metric_lines(result) {
        out.push_str(&format!("  {:<26} {:>16}  {}\n", metric.label, metric.value, metric.note));
    }
    if let Some(warning) = &result.metrics.warning {
        out.push_str(&format!("  WARNING: {}\n", warning));
    }
    out
}

/// Fixed-width table of the first `limit` months
pub fn render_table(rows: &[ProjectionRow], limit: usize) -> String {
    let mut out = format!(
        "{:>7} {:>9} {:>12} {:>12} {:>12} {:>11} {:>12} {:>12} {:>14}\n",
        "Month", "Families", "Revenue", "COGS", "Opex", "Financing", "DebtSvc", "NetCF", "CumCash"
    );
    out.push_str(&"-".repeat(109));
    out.push('\n');

    for row in rows.iter().take(limit) {
        out.push_str(&format!(
            "{:>7} {:>9.0} {:>12.2} {:>12.2} {:>12.2} {:>11.2} {:>12.2} {:>12.2} {:>14.2}\n",
            month_label(row.month),
            row.families_active,
            row.revenue,
            row.cogs,
            row.operating_expenses,
            row.financing,
            row.debt_service,
            row.net_cash_flow,
            row.cumulative_cash,
        ));
    }

    if rows.len() > limit {
        out.push_str(&format!("... ({} more months)\n", rows.len() - limit));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, 0), "$0");
        assert_eq!(format_currency(999.0, 0), "$999");
        assert_eq!(format_currency(1234567.891, 0), "$1,234,568");
        assert_eq!(format_currency(-45210.5, 2), "-$45,210.50");
        assert_eq!(format_currency(-0.2, 0), "$0");
    }

    #[test]
    fn test_format_months() {
        assert_eq!(format_months(f64::INFINITY), "∞");
        assert_eq!(format_months(14.0), "14.0 mo");
        assert_eq!(format_payback(None), "Not reached");
        assert_eq!(format_payback(Some(7)), "7.0 mo");
    }
}
