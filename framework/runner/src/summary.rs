use serde_json::{Map, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const LATENCY_STATS: [&str; 5] = ["min", "max", "median", "p95", "p99"];

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl SummaryRow {
    fn new(metric: impl Into<String>, value: &Value) -> Self {
        Self {
            metric: metric.into(),
            value: display_value(value),
        }
    }
}

/// Render the interval report published by the engine as a table.
///
/// Covers the scenario and request counts, the request rate, response time percentiles, and the
/// per-scenario, status code and error counts. Returns `None` when the report has none of these.
pub fn intermediate_report_table(report: &Map<String, Value>) -> Option<String> {
    let mut rows = Vec::new();

    for (key, label) in [
        ("scenariosCreated", "Scenarios launched"),
        ("scenariosCompleted", "Scenarios completed"),
        ("requestsCompleted", "Requests completed"),
    ] {
        if let Some(value) = report.get(key) {
            rows.push(SummaryRow::new(label, value));
        }
    }

    if let Some(mean) = report.get("rps").and_then(|rps| rps.get("mean")) {
        rows.push(SummaryRow::new("Mean responses/sec", mean));
    }

    if let Some(latency) = report.get("latency") {
        for stat in LATENCY_STATS {
            if let Some(value) = latency.get(stat) {
                rows.push(SummaryRow::new(format!("Response time {stat} (ms)"), value));
            }
        }
    }

    for (key, label) in [
        ("scenarioCounts", "Scenario"),
        ("codes", "Code"),
        ("errors", "Error"),
    ] {
        if let Some(counts) = report.get(key).and_then(Value::as_object) {
            for (name, count) in counts {
                rows.push(SummaryRow::new(format!("{label} {name}"), count));
            }
        }
    }

    if rows.is_empty() {
        return None;
    }

    let mut table = Table::new(rows);
    table.with(Style::modern());
    Some(table.to_string())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row<'a>(table: &'a str, metric: &str) -> &'a str {
        table
            .lines()
            .find(|line| line.contains(metric))
            .unwrap_or_else(|| panic!("no row for {metric} in\n{table}"))
    }

    #[test]
    fn renders_counts_rates_and_latencies() {
        let report = json!({
            "scenariosCreated": 50,
            "scenariosCompleted": 48,
            "requestsCompleted": 96,
            "rps": { "count": 96, "mean": 9.6 },
            "latency": { "min": 3.1, "max": 120.0, "median": 12.5, "p95": 80.25, "p99": 110 },
            "latencies": [[0, "id", 12, 200]],
            "scenarioCounts": { "checkout": 50 },
            "codes": { "200": 90, "503": 6 },
            "errors": { "ETIMEDOUT": 2 }
        });

        let table = intermediate_report_table(report.as_object().unwrap()).unwrap();

        assert!(row(&table, "Scenarios launched").contains("50"));
        assert!(row(&table, "Scenarios completed").contains("48"));
        assert!(row(&table, "Requests completed").contains("96"));
        assert!(row(&table, "Mean responses/sec").contains("9.60"));
        assert!(row(&table, "Response time median (ms)").contains("12.50"));
        assert!(row(&table, "Response time p95 (ms)").contains("80.25"));
        assert!(row(&table, "Response time p99 (ms)").contains("110"));
        assert!(row(&table, "Scenario checkout").contains("50"));
        assert!(row(&table, "Code 503").contains("6"));
        assert!(row(&table, "Error ETIMEDOUT").contains("2"));
        assert!(!table.contains("latencies"));
    }

    #[test]
    fn missing_sections_are_left_out() {
        let report = json!({ "scenariosCreated": 5 });

        let table = intermediate_report_table(report.as_object().unwrap()).unwrap();

        assert!(row(&table, "Scenarios launched").contains("5"));
        assert!(!table.contains("Response time"));
        assert!(!table.contains("Code"));
    }

    #[test]
    fn empty_report_has_no_table() {
        assert_eq!(None, intermediate_report_table(&Map::new()));
    }
}
