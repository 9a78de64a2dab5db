//! End-to-end integration tests: CSV -> table -> report artifacts -> deserialize.

use std::fs;
use std::path::Path;

use campaign_io::{
    BankReader, ColumnKind, ComparisonReport, ExperimentName, FailedStrategy, FeatureWeight,
    ReportWriter, RunMeta, StrategyRow, Subscribed,
};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fixture_loads_with_inferred_schema() {
    let table = BankReader::new(&fixture_path("bank_sample.csv"))
        .read()
        .expect("fixture should parse");

    assert_eq!(table.n_rows(), 400);
    assert_eq!(table.n_features(), 16);
    assert_eq!(table.class_counts(), [304, 96]);

    let kind_of = |name: &str| {
        table
            .columns()
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.kind().clone())
            .unwrap()
    };
    assert_eq!(kind_of("age"), ColumnKind::Numeric);
    assert_eq!(kind_of("duration"), ColumnKind::Numeric);
    assert_eq!(kind_of("pdays"), ColumnKind::Numeric);
    assert_eq!(
        kind_of("poutcome"),
        ColumnKind::Categorical {
            levels: vec![
                "failure".into(),
                "other".into(),
                "success".into(),
                "unknown".into()
            ]
        }
    );

    // Categorical codes stay inside their level range.
    for (col_idx, column) in table.columns().iter().enumerate() {
        if let Some(n_levels) = column.kind().n_levels() {
            for row in table.rows() {
                assert!((row[col_idx] as usize) < n_levels);
            }
        }
    }
}

#[test]
fn subset_of_fixture_keeps_schema() {
    let table = BankReader::new(&fixture_path("bank_sample.csv"))
        .read()
        .unwrap();
    let yes = table.indices_of(Subscribed::Yes);
    let sub = table.subset(&yes);
    assert_eq!(sub.n_rows(), 96);
    assert_eq!(sub.class_counts(), [0, 96]);
    assert_eq!(sub.columns(), table.columns());
}

#[test]
fn report_round_trip() {
    let report = ComparisonReport {
        meta: RunMeta {
            seed: 7,
            train_fraction: 0.7,
            n_train: 280,
            n_test: 120,
            n_test_yes: 29,
            cost_per_contact: 100.0,
            revenue_per_sale: 3000.0,
            threshold: 0.5,
        },
        rows: vec![StrategyRow {
            balancing: "Downsample".to_string(),
            accuracy: 0.75,
            sensitivity: 0.8,
            specificity: 0.73,
            contacts_made: 48,
            tp: 23,
            fp: 25,
            tn: 67,
            fn_: 5,
            total_profit: 64_200.0,
            train_rows: 134,
            complexity: 0.01,
            n_leaves: 6,
            top_features: vec![FeatureWeight {
                name: "duration".to_string(),
                importance: 0.7,
            }],
        }],
        failures: vec![FailedStrategy {
            balancing: "Tuned".to_string(),
            error: "class 1 has 2 samples, need at least 5 for 5-fold CV".to_string(),
        }],
    };

    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("round_trip".into()).unwrap();
    let writer = ReportWriter::new(dir.path(), experiment).unwrap();
    let paths = writer.write_all(&report).unwrap();
    assert_eq!(paths.len(), 3);

    let json = fs::read_to_string(dir.path().join("round_trip_comparison.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["experiment"], "round_trip");

    // The flattened artifact deserializes back into the report.
    let back: ComparisonReport = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);

    let text = fs::read_to_string(dir.path().join("round_trip_comparison.txt")).unwrap();
    assert!(text.contains("Downsample"));
    assert!(text.contains("Tuned"));
}
