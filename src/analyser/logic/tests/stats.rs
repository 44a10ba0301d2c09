use super::*;
use crate::analyser::logic::correlation::find_correlations;
use crate::analyser::logic::outliers::detect_outliers;
use crate::analyser::logic::profiling::{
    analyse_frequency, analyse_numeric, calculate_kurtosis, calculate_skew, describe_column,
    quantile,
};
use crate::analyser::logic::trends::detect_trends;

#[test]
fn test_quantile_interpolates() {
    let sorted = [1.0, 2.0, 3.0, 4.0];
    assert!(approx(quantile(&sorted, 0.25), 1.75), "q1 of 1..4");
    assert!(approx(quantile(&sorted, 0.5), 2.5), "median of 1..4");
    assert!(approx(quantile(&sorted, 1.0), 4.0), "max of 1..4");
    assert!(approx(quantile(&[7.0], 0.75), 7.0), "single value");
    assert_eq!(quantile(&[], 0.5), None);
}

#[test]
fn test_numeric_stats_hand_computed() -> Result<()> {
    let column = numeric_column("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    let stats = analyse_numeric(&column)?;
    assert_eq!(stats.count, 8);
    assert_eq!(stats.missing, 0);
    assert!(approx(stats.mean, 5.0), "mean = {:?}", stats.mean);
    assert!(approx(stats.median, 4.5), "median = {:?}", stats.median);
    assert!(
        approx(stats.std_dev, (32.0_f64 / 7.0).sqrt()),
        "sample std = {:?}",
        stats.std_dev
    );
    assert_eq!(stats.min, Some(2.0));
    assert_eq!(stats.max, Some(9.0));
    assert!(approx(stats.q1, 4.0), "q1 = {:?}", stats.q1);
    assert!(approx(stats.q3, 5.5), "q3 = {:?}", stats.q3);
    assert!(stats.skewness.is_some_and(|s| s > 0.0), "right tail");
    Ok(())
}

#[test]
fn test_shape_statistics() {
    let symmetric = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert!(approx(calculate_skew(&symmetric, 3.0), 0.0), "symmetric data");
    assert!(
        approx(calculate_kurtosis(&symmetric, 3.0), -1.2),
        "kurtosis = {:?}",
        calculate_kurtosis(&symmetric, 3.0)
    );

    assert_eq!(calculate_skew(&[1.0, 2.0], 1.5), None);
    assert_eq!(calculate_kurtosis(&[1.0, 2.0, 3.0], 2.0), None);
    assert_eq!(calculate_skew(&[0.1, 0.1, 0.1], 0.1), None);
}

#[test]
fn test_constant_and_empty_numeric_columns() -> Result<()> {
    let constant = analyse_numeric(&numeric_column("c", &[3.0, 3.0, 3.0, 3.0]))?;
    assert_eq!(constant.std_dev, Some(0.0));
    assert_eq!(constant.skewness, None);
    assert_eq!(constant.kurtosis, None);

    let single = analyse_numeric(&numeric_column("s", &[3.0]))?;
    assert_eq!(single.std_dev, None);
    assert_eq!(single.median, Some(3.0));

    let empty = Column::new(
        "e",
        ColumnKind::Numeric,
        vec![CellValue::Missing, CellValue::Missing],
    );
    let stats = analyse_numeric(&empty)?;
    assert_eq!(stats.count, 0);
    assert_eq!(stats.missing, 2);
    assert_eq!(stats.mean, None);
    assert_eq!(stats.q1, None);
    Ok(())
}

#[test]
fn test_mode_ties_go_to_first_seen() {
    let column = Column::new(
        "region",
        ColumnKind::Categorical,
        ["S", "N", "N", "S", "E"]
            .into_iter()
            .map(|s| CellValue::Text(s.to_owned()))
            .chain([CellValue::Missing])
            .collect(),
    );
    let stats = analyse_frequency(&column);
    assert_eq!(stats.count, 5);
    assert_eq!(stats.missing, 1);
    assert_eq!(stats.distinct, 3);
    assert_eq!(stats.mode.as_deref(), Some("S"));
    assert_eq!(stats.mode_frequency, 2);
}

#[test]
fn test_temporal_and_unknown_columns() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts(
            "when",
            ["2023-03-01", "2021-07-15", "2023-03-01"],
        ))
        .with_column(RawColumn::from_optional_texts("blank", [None, None, None]));
    let table = cleaned(&raw)?;

    let ColumnStats::Temporal(when) = describe_column(&table.columns[0])? else {
        panic!("expected temporal stats");
    };
    assert_eq!(when.earliest.as_deref(), Some("2021-07-15"));
    assert_eq!(when.latest.as_deref(), Some("2023-03-01"));
    assert_eq!(when.frequency.mode.as_deref(), Some("2023-03-01"));
    assert_eq!(when.frequency.distinct, 2);

    let ColumnStats::Frequency(blank) = describe_column(&table.columns[1])? else {
        panic!("expected frequency stats");
    };
    assert_eq!(blank.count, 0);
    assert_eq!(blank.mode, None);
    Ok(())
}

#[test]
fn test_describe_rejects_mistyped_values() {
    let column = Column::new(
        "x",
        ColumnKind::DateTime,
        vec![CellValue::Number(1.0)],
    );
    assert!(matches!(
        describe_column(&column),
        Err(crate::error::AnalysisError::InternalInconsistency(_))
    ));
}

#[test]
fn test_correlation_ordering_and_threshold() -> Result<()> {
    let table = Table::new(vec![
        numeric_column("a", &[1.0, 2.0, 3.0, 4.0, 5.0]),
        numeric_column("b", &[2.0, 4.0, 6.0, 8.0, 10.0]),
        numeric_column("c", &[5.0, 4.0, 3.0, 2.0, 1.0]),
        numeric_column("d", &[1.0, 3.0, 2.0, 5.0, 4.0]),
        numeric_column("k", &[7.0, 7.0, 7.0, 7.0, 7.0]),
    ])?;
    let pairs = find_correlations(&table, 0.5)?;

    // |r| = 1 for a~b, a~c, b~c: ties ordered by name
    let names: Vec<(&str, &str)> = pairs
        .iter()
        .map(|p| (p.column_a.as_str(), p.column_b.as_str()))
        .collect();
    assert_eq!(&names[..3], &[("a", "b"), ("a", "c"), ("b", "c")]);
    assert!(pairs[1].coefficient < 0.0, "a~c is inverse");
    assert!(
        pairs.iter().all(|p| p.column_a != "k" && p.column_b != "k"),
        "constant column must be skipped"
    );
    for pair in &pairs {
        assert!(pair.coefficient.abs() >= 0.5, "below threshold: {pair:?}");
        assert!((-1.0..=1.0).contains(&pair.coefficient), "out of range: {pair:?}");
    }
    for window in pairs.windows(2) {
        assert!(
            window[0].coefficient.abs() >= window[1].coefficient.abs(),
            "pairs must be sorted by strength"
        );
    }
    Ok(())
}

#[test]
fn test_correlation_uses_pairwise_complete_rows() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("x", ["1", "2", "NA", "4", "5"]))
        .with_column(RawColumn::from_texts("y", ["10", "NA", "30", "40", "50"]));
    let table = cleaned(&raw)?;
    let pairs = find_correlations(&table, 0.0)?;
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].observations, 3);
    assert!(approx(Some(pairs[0].coefficient), 1.0), "x and y move together");
    Ok(())
}

#[test]
fn test_weak_label_only_with_lowered_threshold() -> Result<()> {
    let table = Table::new(vec![
        numeric_column("p", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        numeric_column("q", &[2.0, 1.0, 4.0, 3.0, 3.0, 2.0]),
    ])?;
    assert!(find_correlations(&table, 0.5)?.is_empty(), "weak pair hidden by default");
    let pairs = find_correlations(&table, 0.0)?;
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].strength, CorrelationStrength::Weak);
    Ok(())
}

#[test]
fn test_outliers_sales_scenario() -> Result<()> {
    let table = cleaned(&sales_region())?;
    let outliers = detect_outliers(&table, 1.5)?;
    assert_eq!(outliers.len(), 1);
    let outlier = &outliers[0];
    assert_eq!(outlier.column, "Sales");
    assert_eq!(outlier.row, 4);
    assert!((outlier.value - 10_000.0).abs() < f64::EPSILON, "value = {}", outlier.value);
    assert!((outlier.upper_bound - 16.5).abs() < 1e-9, "upper = {}", outlier.upper_bound);
    assert!(
        (outlier.deviation - (10_000.0 - 16.5) / 2.5).abs() < 1e-9,
        "deviation = {}",
        outlier.deviation
    );
    Ok(())
}

#[test]
fn test_outliers_ordered_by_column_then_row() -> Result<()> {
    let table = Table::new(vec![
        numeric_column("first", &[1.0, 2.0, 3.0, 4.0, 100.0, -100.0]),
        numeric_column("second", &[-50.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        numeric_column("flat", &[1.0, 1.0, 1.0, 1.0, 1.0, 9.0]),
    ])?;
    let outliers = detect_outliers(&table, 1.5)?;
    let keys: Vec<(&str, usize)> = outliers
        .iter()
        .map(|o| (o.column.as_str(), o.row))
        .collect();
    assert_eq!(keys, vec![("first", 4), ("first", 5), ("second", 0)]);
    for o in &outliers {
        assert!(o.lower_bound <= o.upper_bound, "bounds ordered: {o:?}");
        assert!(o.value < o.lower_bound || o.value > o.upper_bound, "strictly outside: {o:?}");
    }
    Ok(())
}

#[test]
fn test_trend_directions() -> Result<()> {
    let table = Table::new(vec![
        numeric_column("up", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
        numeric_column("down", &[16.0, 14.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0]),
        numeric_column("flat", &[5.0, 6.0, 6.0, 5.0, 5.0, 6.0, 6.0, 5.0]),
        numeric_column("constant", &[3.0; 8]),
    ])?;
    let trends = detect_trends(&table, &AnalysisConfig::default())?;
    assert_eq!(trends.len(), 3, "constant column is skipped");

    let up = &trends[0];
    assert_eq!(up.direction, TrendDirection::Increasing);
    assert_eq!(up.confidence, TrendConfidence::High);
    assert!(approx(Some(up.slope), 1.0), "slope = {}", up.slope);
    assert!(approx(up.first_half_mean, 2.5), "first half of 1..8");
    assert!(approx(up.second_half_mean, 6.5), "second half of 1..8");
    assert!(approx(up.change_pct, 160.0), "change = {:?}", up.change_pct);

    assert_eq!(trends[1].direction, TrendDirection::Decreasing);
    assert_eq!(trends[2].direction, TrendDirection::Flat);
    assert_eq!(trends[2].confidence, TrendConfidence::Low);
    Ok(())
}

#[test]
fn test_trend_needs_minimum_points() -> Result<()> {
    let raw = RawTable::default()
        .with_column(RawColumn::from_texts("sparse", ["1", "NA", "NA", "NA", "9"]));
    let table = cleaned(&raw)?;
    assert!(detect_trends(&table, &AnalysisConfig::default())?.is_empty(), "two points");

    let relaxed = AnalysisConfig {
        min_trend_points: 2,
        ..Default::default()
    };
    let trends = detect_trends(&table, &relaxed)?;
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].points, 2);
    assert_eq!(trends[0].direction, TrendDirection::Increasing);
    Ok(())
}
