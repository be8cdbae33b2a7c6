/* Performance page interpolation.

The performance markdown page carries HTML-comment markers that get
replaced with benchmark tables built from the parsed benchmark results,
plus a publication timestamp from the checksum file. */

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Metrics published for every benchmark scenario, in table row order.
const METRICS: [&str; 6] = ["mean", "stddev", "p50", "p90", "p95", "p99"];

/// Parsed benchmark results: scenario name to per-implementation stats.
///
/// Each implementation maps metric names to values. IndexMap keeps the
/// column order the benchmark run published.
pub type PerfStats = IndexMap<String, IndexMap<String, Value>>;

/// Publication metadata accompanying the benchmark results.
#[derive(Debug, Clone, Deserialize)]
pub struct Checksum {
    pub updated: String,
}

/// Build one markdown table per benchmark scenario.
///
/// The first column holds the metric name, the remaining columns one
/// implementation each.
pub fn stats_tables(stats: &PerfStats) -> IndexMap<String, String> {
    stats
        .iter()
        .map(|(scenario, impls)| (scenario.clone(), stats_table(impls)))
        .collect()
}

fn stats_table(impls: &IndexMap<String, Value>) -> String {
    let mut table = String::from("| ");
    for name in impls.keys() {
        table.push_str(&format!("| {name} "));
    }
    table.push_str("|\n");

    table.push_str("|-");
    for _ in impls.keys() {
        table.push_str("|-");
    }
    table.push_str(" |\n");

    for metric in METRICS {
        table.push_str(&format!("| {metric} "));
        for values in impls.values() {
            let value = values.get(metric).cloned().unwrap_or(Value::Null);
            table.push_str(&format!("| {} ", render_value(&value)));
        }
        table.push_str("|\n");
    }
    table
}

/// Bare rendering: strings without quotes, everything else as JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replace the stats and timestamp markers in the performance page.
///
/// Every `<!-- stats_<scenario> -->` occurrence is replaced with that
/// scenario's table; only the first `<!-- last_published -->` is replaced.
pub fn interpolate_perf_page(page: &str, stats: &PerfStats, checksum: &Checksum) -> String {
    let mut out = page.to_string();
    for (scenario, table) in stats_tables(stats) {
        let marker = format!("<!-- stats_{scenario} -->");
        out = out.replace(&marker, &table);
    }
    out.replacen("<!-- last_published -->", &checksum.updated, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn sample_stats() -> PerfStats {
        serde_json::from_str(
            r#"{
                "coldstart": {
                    "aws-lite": { "mean": 1.2, "stddev": 0.1, "p50": 1.1, "p90": 1.4, "p95": 1.5, "p99": 1.9 },
                    "aws-sdk": { "mean": 2.4, "stddev": 0.3, "p50": 2.2, "p90": 2.9, "p95": 3.1, "p99": 3.8 }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_stats_table_layout() {
        let tables = stats_tables(&sample_stats());
        let table = tables.get("coldstart").unwrap();
        expect![[r#"
            | | aws-lite | aws-sdk |
            |-|-|- |
            | mean | 1.2 | 2.4 |
            | stddev | 0.1 | 0.3 |
            | p50 | 1.1 | 2.2 |
            | p90 | 1.4 | 2.9 |
            | p95 | 1.5 | 3.1 |
            | p99 | 1.9 | 3.8 |
        "#]]
        .assert_eq(table);
    }

    #[test]
    fn test_missing_metric_renders_empty() {
        let stats: PerfStats = serde_json::from_str(
            r#"{ "exec": { "only": { "mean": 5 } } }"#,
        )
        .unwrap();
        let tables = stats_tables(&stats);
        let table = tables.get("exec").unwrap();
        assert!(table.contains("| mean | 5 |"));
        assert!(table.contains("| p99 |  |"));
    }

    #[test]
    fn test_string_values_render_bare() {
        let stats: PerfStats = serde_json::from_str(
            r#"{ "exec": { "only": { "mean": "1.2ms" } } }"#,
        )
        .unwrap();
        let table = stats_tables(&stats).remove("exec").unwrap();
        assert!(table.contains("| mean | 1.2ms |"));
    }

    #[test]
    fn test_interpolation_replaces_all_stats_markers() {
        let page = "Intro\n<!-- stats_coldstart -->\nagain:\n<!-- stats_coldstart -->\n";
        let checksum = Checksum {
            updated: "2024-01-01".to_string(),
        };
        let out = interpolate_perf_page(page, &sample_stats(), &checksum);
        assert!(!out.contains("<!-- stats_coldstart -->"));
        assert_eq!(out.matches("| mean | 1.2 | 2.4 |").count(), 2);
    }

    #[test]
    fn test_interpolation_replaces_first_timestamp_only() {
        let page = "Published: <!-- last_published -->\nAlso: <!-- last_published -->\n";
        let checksum = Checksum {
            updated: "2024-06-30".to_string(),
        };
        let out = interpolate_perf_page(page, &PerfStats::new(), &checksum);
        assert_eq!(out.matches("2024-06-30").count(), 1);
        assert_eq!(out.matches("<!-- last_published -->").count(), 1);
    }

    #[test]
    fn test_unknown_scenario_marker_left_in_place() {
        let page = "<!-- stats_unknown -->\n";
        let checksum = Checksum {
            updated: "x".to_string(),
        };
        let out = interpolate_perf_page(page, &sample_stats(), &checksum);
        assert_eq!(out, page);
    }
}
