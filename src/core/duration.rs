pub const NOT_REACHED: &str = "not reached";

/// Renders a month count as "N years and M months".
pub fn format_months(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    let rest_label = plural(rest, "month", "months");
    match years {
        0 => rest_label,
        _ if rest == 0 => plural(years, "year", "years"),
        _ => format!("{} and {rest_label}", plural(years, "year", "years")),
    }
}

pub fn cap_reached_label(cap_reached_month: Option<u32>) -> String {
    cap_reached_month
        .map(format_months)
        .unwrap_or_else(|| NOT_REACHED.to_string())
}

fn plural(count: u32, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {one}")
    } else {
        format!("{count} {many}")
    }
}
