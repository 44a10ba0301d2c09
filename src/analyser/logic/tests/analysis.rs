use super::*;
use crate::config::InsightRule;
use crate::error::AnalysisError;

fn mixed_kinds() -> RawTable {
    RawTable::default()
        .with_column(RawColumn::from_texts("n", ["1", "2", "3", "4"]))
        .with_column(RawColumn::from_texts("c", ["a", "b", "c", "d"]))
        .with_column(RawColumn::from_texts(
            "d",
            ["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"],
        ))
        .with_column(RawColumn::from_texts("b", ["yes", "no", "yes", "no"]))
        .with_column(RawColumn::from_optional_texts("u", [None, None, None, None]))
}

#[test]
fn test_sales_region_scenario() -> Result<()> {
    let result = analyze(&sales_region())?;

    assert_eq!(result.overview.row_count, 6);
    assert_eq!(result.table.column("Sales").map(|c| c.kind), Some(ColumnKind::Numeric));
    assert_eq!(result.table.column("Region").map(|c| c.kind), Some(ColumnKind::Categorical));

    let outliers: Vec<&OutlierRecord> = result.outliers_for("Sales").collect();
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].row, 4);
    assert!((outliers[0].value - 10_000.0).abs() < f64::EPSILON);

    let region = result.column_stats["Region"].as_frequency().unwrap();
    assert_eq!(region.mode.as_deref(), Some("N"), "tie resolved by first appearance");
    assert_eq!(region.mode_frequency, 3);

    assert!(result.correlations.is_empty(), "only one numeric column");
    assert!(result.quality_findings.is_empty());
    assert!((result.overview.health_score - 1.0).abs() < f64::EPSILON);

    let outlier_at = result
        .insights
        .iter()
        .position(|s| s.contains("outlier"))
        .unwrap();
    let skew_at = result
        .insights
        .iter()
        .position(|s| s.contains("skewed"))
        .unwrap();
    assert!(outlier_at < skew_at, "insights: {:?}", result.insights);
    Ok(())
}

#[test]
fn test_perfect_correlation_scenario() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("X", ["1", "2", "3", "4"]))
        .with_column(RawColumn::from_texts("Y", ["2", "4", "6", "8"]));
    let result = analyze(&raw)?;

    assert_eq!(result.correlations.len(), 1);
    let pair = &result.correlations[0];
    assert_eq!((pair.column_a.as_str(), pair.column_b.as_str()), ("X", "Y"));
    assert!((pair.coefficient - 1.0).abs() < 1e-12, "r = {}", pair.coefficient);
    assert_eq!(pair.strength, CorrelationStrength::Strong);
    assert_eq!(pair.observations, 4);
    assert!(
        result.insights.iter().any(|s| s.contains("'X' and 'Y'")),
        "insights: {:?}",
        result.insights
    );
    Ok(())
}

#[test]
fn test_heavily_missing_column_is_warned() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts(
            "id",
            ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"],
        ))
        .with_column(RawColumn::from_optional_texts(
            "score",
            [
                Some("5"),
                None,
                Some("7"),
                None,
                Some("6"),
                None,
                Some("8"),
                None,
                Some("5"),
                Some("6"),
            ],
        ));
    let result = analyze(&raw)?;

    let missing: Vec<&QualityFinding> = result.findings_of(FindingKind::MissingValues).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Warning);
    assert_eq!(missing[0].columns, vec!["score".to_owned()]);
    assert_eq!(missing[0].rows, vec![1, 3, 5, 7]);
    assert!(
        result.insights.iter().any(|s| s.contains("'score' is missing 40.0%")),
        "insights: {:?}",
        result.insights
    );
    Ok(())
}

#[test]
fn test_structural_problems_are_rejected() -> Result<()> {
    let engine = Analyzer::with_defaults()?;

    let cases = [
        RawTable::default(),
        RawTable::default().with_column(RawColumn::new("empty", Vec::new())),
        RawTable::default()
            .with_column(RawColumn::from_texts("a", ["1", "2"]))
            .with_column(RawColumn::from_texts("a", ["3", "4"])),
        RawTable::default()
            .with_column(RawColumn::from_texts("a", ["1", "2"]))
            .with_column(RawColumn::from_texts("b", ["3"])),
    ];
    for raw in &cases {
        assert!(
            matches!(engine.analyze(raw), Err(AnalysisError::InputValidation(_))),
            "should reject {raw:?}"
        );
    }
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = AnalysisConfig {
        min_type_fraction: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        Analyzer::new(config.clone()),
        Err(AnalysisError::Configuration(_))
    ));
    assert!(matches!(
        run_full_analysis(&sales_region(), config),
        Err(AnalysisError::Configuration(_))
    ));
}

#[test]
fn test_results_are_deterministic() -> Result<()> {
    let engine = Analyzer::with_defaults()?;
    let raw = mixed_kinds();
    let first = engine.analyze(&raw)?.to_json_pretty()?;
    let second = engine.analyze(&raw)?.to_json_pretty()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_engine_is_shareable_across_threads() -> Result<()> {
    let engine = Analyzer::with_defaults()?;
    let raw = sales_region();
    let expected = engine.analyze(&raw)?;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| engine.analyze(&raw))).collect();
        for handle in handles {
            let result = handle.join().unwrap().unwrap();
            assert_eq!(result, expected);
        }
    });
    Ok(())
}

#[test]
fn test_result_properties_hold() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts(
            "a",
            ["3", "1", "4", "1", "5", "9", "2", "6", "5", "35"],
        ))
        .with_column(RawColumn::from_texts(
            "b",
            ["2", "7", "1", "8", "2", "8", "NA", "8", "4", "5"],
        ))
        .with_column(RawColumn::from_texts(
            "c",
            ["-1", "-4", "2", "0", "-30", "7", "1", "3", "2", "2"],
        ));
    let config = AnalysisConfig {
        correlation_threshold: 0.0,
        ..Default::default()
    };
    let result = analyze_with(&raw, config)?;

    for (name, stats) in &result.column_stats {
        let stats = stats.as_numeric().unwrap();
        assert!(stats.std_dev.unwrap() >= 0.0, "{name}: negative std");
        let (q1, median, q3) = (stats.q1.unwrap(), stats.median.unwrap(), stats.q3.unwrap());
        assert!(q1 <= median && median <= q3, "{name}: quartiles out of order");
        assert!(stats.min.unwrap() <= q1 && q3 <= stats.max.unwrap(), "{name}: range");
    }
    assert_eq!(result.correlations.len(), 3, "every pair kept at threshold 0");
    for pair in &result.correlations {
        assert!((-1.0..=1.0).contains(&pair.coefficient), "{pair:?}");
    }
    assert!(!result.outliers.is_empty());
    for outlier in &result.outliers {
        assert!(
            outlier.value < outlier.lower_bound || outlier.value > outlier.upper_bound,
            "{outlier:?}"
        );
        assert!(outlier.deviation > 0.0, "{outlier:?}");
    }
    assert!((0.0..=1.0).contains(&result.overview.health_score));
    Ok(())
}

#[test]
fn test_overview_counts_kinds_and_missing() -> Result<()> {
    let result = analyze(&mixed_kinds())?;
    let overview = &result.overview;

    assert_eq!(overview.column_count, 5);
    assert_eq!(
        overview.kind_counts,
        crate::analyser::logic::types::KindCounts {
            numeric: 1,
            categorical: 1,
            datetime: 1,
            boolean: 1,
            unknown: 1,
        }
    );
    assert_eq!(overview.missing_cells, 4);
    assert!((overview.missing_pct - 20.0).abs() < 1e-9, "pct = {}", overview.missing_pct);
    assert_eq!(overview.duplicate_rows, 0);
    assert!(overview.duplicate_pct.abs() < f64::EPSILON);
    assert!(
        (overview.health_score - 0.9).abs() < 1e-12,
        "one missing-value warning, score = {}",
        overview.health_score
    );

    let names: Vec<&str> = result.column_stats.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["n", "c", "d", "b", "u"], "stats follow column order");
    Ok(())
}

#[test]
fn test_result_json_shape() -> Result<()> {
    let result = analyze(&mixed_kinds())?;
    let json = serde_json::to_value(&result)?;

    assert_eq!(json["overview"]["columns"][2]["kind"], "datetime");
    assert_eq!(json["column_stats"]["n"]["type"], "numeric");
    assert_eq!(json["column_stats"]["c"]["type"], "frequency");
    assert_eq!(json["column_stats"]["d"]["type"], "temporal");
    assert_eq!(json["column_stats"]["d"]["earliest"], "2023-01-01");
    assert_eq!(json["quality_findings"][0]["kind"], "missing_values");
    assert_eq!(json["quality_findings"][0]["severity"], "warning");
    assert_eq!(json["table"]["columns"][3]["values"][0], true);
    assert!(json["table"]["columns"][4]["values"][0].is_null());
    Ok(())
}

#[test]
fn test_insight_order_ignores_configured_order() -> Result<()> {
    let reversed = AnalysisConfig {
        insight_rules: InsightRule::ALL.iter().rev().copied().collect(),
        ..Default::default()
    };
    let default_insights = analyze(&sales_region())?.insights;
    let reversed_insights = analyze_with(&sales_region(), reversed)?.insights;
    assert!(!default_insights.is_empty());
    assert_eq!(default_insights, reversed_insights);
    Ok(())
}

#[test]
fn test_disabled_rules_stay_silent() -> Result<()> {
    let none = AnalysisConfig {
        insight_rules: Vec::new(),
        ..Default::default()
    };
    assert!(analyze_with(&sales_region(), none)?.insights.is_empty());

    let outliers_only = AnalysisConfig {
        insight_rules: vec![InsightRule::Outliers],
        ..Default::default()
    };
    let insights = analyze_with(&sales_region(), outliers_only)?.insights;
    assert_eq!(insights.len(), 1);
    assert!(insights[0].contains("'Sales' has 1 outlier"), "got {insights:?}");
    Ok(())
}

#[test]
fn test_clean_categorical_table_has_no_insights() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("Region", ["N", "S", "E", "W"]));
    let result = analyze(&raw)?;
    assert!(result.quality_findings.is_empty());
    assert!(result.insights.is_empty(), "got {:?}", result.insights);
    Ok(())
}

fn only_rule(rule: InsightRule) -> AnalysisConfig {
    AnalysisConfig {
        insight_rules: vec![rule],
        ..Default::default()
    }
}

#[test]
fn test_inconsistent_types_insight() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("amount", ["5", "6", "oops", "7", "8"]));
    let insights = analyze_with(&raw, only_rule(InsightRule::InconsistentTypes))?.insights;
    assert_eq!(
        insights,
        vec![
            "Column 'amount' has 1 value(s) that do not match its inferred type; \
             check how this field was extracted."
                .to_owned()
        ]
    );
    Ok(())
}

#[test]
fn test_duplicates_insight() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("x", ["1", "2", "2", "3"]))
        .with_column(RawColumn::from_texts("y", ["a", "b", "b", "c"]));
    let insights = analyze_with(&raw, only_rule(InsightRule::Duplicates))?.insights;
    assert_eq!(
        insights,
        vec!["1 duplicate row(s) found; consider removing them before analysis.".to_owned()]
    );
    Ok(())
}

#[test]
fn test_constant_columns_insight() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("v", ["1", "2", "3"]))
        .with_column(RawColumn::from_texts("unit", ["kg", "kg", "kg"]));
    let insights = analyze_with(&raw, only_rule(InsightRule::ConstantColumns))?.insights;
    assert_eq!(
        insights,
        vec!["Column 'unit' holds a single value and adds little analytical value.".to_owned()]
    );
    Ok(())
}

#[test]
fn test_every_rule_fires_in_declared_order() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts(
            "a",
            ["1", "2", "3", "4", "5", "6", "7", "8", "50", "50"],
        ))
        .with_column(RawColumn::from_texts(
            "b",
            ["2", "4", "6", "8", "10", "12", "14", "16", "100", "100"],
        ))
        .with_column(RawColumn::from_texts("unit", ["kg"; 10]))
        .with_column(RawColumn::from_texts(
            "amount",
            ["5", "oops", "7", "NA", "NA", "NA", "6", "5", "8", "8"],
        ))
        .with_column(RawColumn::from_texts(
            "note",
            ["p", "NA", "NA", "r", "s", "t", "u", "v", "w", "w"],
        ));
    let insights = analyze(&raw)?.insights;

    let expected = [
        "12.0% of all cells are missing",
        "Column 'amount' is missing 40.0%",
        "Column 'amount' has 1 value(s) that do not match",
        "1 duplicate row(s) found",
        "Column 'unit' holds a single value",
        "'a' and 'b' have a strong positive correlation",
        "Column 'a' has 2 outlier(s)",
        "Column 'a' is strongly right-skewed",
        "Column 'a' is increasing across rows",
    ];
    let positions: Vec<usize> = expected
        .iter()
        .map(|needle| {
            insights
                .iter()
                .position(|s| s.contains(needle))
                .unwrap_or_else(|| panic!("no insight containing {needle:?} in {insights:?}"))
        })
        .collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "positions {positions:?} in {insights:?}"
    );
    Ok(())
}

#[test]
fn test_letter_coded_column_raises_nothing() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("Region", ["N", "N", "N", "N", "S"]));
    let result = analyze(&raw)?;
    assert_eq!(result.table.column("Region").map(|c| c.kind), Some(ColumnKind::Categorical));
    assert!(result.quality_findings.is_empty(), "{:?}", result.quality_findings);
    assert!(result.insights.is_empty(), "got {:?}", result.insights);
    Ok(())
}
