use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{Indicator, Table};

/// Share of households in one category for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub month: u8,
    pub category: String,
    /// Percentage in `[0, 100]`.
    pub percentage: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The requested column is not one of the four indicator categories.
    #[error("'{0}' is not an indicator category column")]
    InvalidField(String),
}

/// Per-month category percentages for the column named `category_field`.
pub fn aggregate(table: &Table, category_field: &str) -> Result<Vec<AggregateRow>, PipelineError> {
    let indicator = Indicator::from_column(category_field)
        .ok_or_else(|| PipelineError::InvalidField(category_field.to_string()))?;
    Ok(aggregate_indicator(table, indicator))
}

/// Per-month category percentages for `indicator`.
///
/// Only months present in `table` appear. Households without a category
/// label are left out of both the count and the month total. Rows come out
/// by month, then by category label; display order is the caller's concern.
pub fn aggregate_indicator(table: &Table, indicator: Indicator) -> Vec<AggregateRow> {
    // month -> category -> count
    let mut counts: BTreeMap<u8, BTreeMap<&str, usize>> = BTreeMap::new();
    for record in table {
        let Some(category) = record.category(indicator) else {
            continue;
        };
        *counts
            .entry(record.month)
            .or_default()
            .entry(category)
            .or_insert(0) += 1;
    }

    let mut rows = Vec::new();
    for (month, by_category) in counts {
        let total: usize = by_category.values().sum();
        for (category, n) in by_category {
            rows.push(AggregateRow {
                month,
                category: category.to_string(),
                percentage: n as f64 / total as f64 * 100.0,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::Record;

    fn with_fcs(month: u8, cat: Option<&str>) -> Record {
        Record {
            fcs_cat: cat.map(str::to_string),
            ..record(2022, month, "North", "N1")
        }
    }

    fn table(rows: &[(u8, Option<&str>)]) -> Table {
        Table::from_records(rows.iter().map(|(m, c)| with_fcs(*m, *c)).collect())
    }

    #[test]
    fn two_thirds_one_third() {
        let t = table(&[
            (1, Some("Acceptable")),
            (1, Some("Acceptable")),
            (1, Some("Poor")),
        ]);
        let rows = aggregate(&t, "FCSCat28").unwrap();
        assert_eq!(rows.len(), 2);

        let acceptable = rows.iter().find(|r| r.category == "Acceptable").unwrap();
        let poor = rows.iter().find(|r| r.category == "Poor").unwrap();
        assert_eq!(acceptable.month, 1);
        assert!((acceptable.percentage - 200.0 / 3.0).abs() < 1e-9);
        assert!((poor.percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn each_month_sums_to_one_hundred() {
        let t = table(&[
            (3, Some("Poor")),
            (1, Some("Acceptable")),
            (3, Some("Borderline")),
            (3, Some("Acceptable")),
            (7, Some("Borderline")),
            (3, Some("Borderline")),
            (1, Some("Borderline")),
            (3, Some("Poor")),
            (3, Some("Acceptable")),
        ]);
        let rows = aggregate_indicator(&t, Indicator::Fcs);

        let mut totals: BTreeMap<u8, f64> = BTreeMap::new();
        for r in &rows {
            assert!((0.0..=100.0).contains(&r.percentage));
            *totals.entry(r.month).or_default() += r.percentage;
        }
        assert_eq!(totals.keys().copied().collect::<Vec<_>>(), vec![1, 3, 7]);
        for total in totals.values() {
            assert!((total - 100.0).abs() < 1e-9, "total was {total}");
        }
    }

    #[test]
    fn tied_categories_are_all_kept() {
        let t = table(&[(2, Some("Poor")), (2, Some("Acceptable"))]);
        let rows = aggregate_indicator(&t, Indicator::Fcs);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.percentage == 50.0));
    }

    #[test]
    fn unlabelled_households_are_skipped() {
        let t = table(&[(1, Some("Poor")), (1, None), (2, None)]);
        let rows = aggregate_indicator(&t, Indicator::Fcs);
        assert_eq!(
            rows,
            vec![AggregateRow {
                month: 1,
                category: "Poor".to_string(),
                percentage: 100.0,
            }]
        );
    }

    #[test]
    fn reads_the_requested_indicator_only() {
        let mut r = with_fcs(4, Some("Poor"));
        r.hhs_cat = Some("Crisis".to_string());
        let t = Table::from_records(vec![r]);
        let rows = aggregate(&t, "HHS_IPC").unwrap();
        assert_eq!(rows[0].category, "Crisis");
        assert!(aggregate(&t, "rCSI_cat").unwrap().is_empty());
    }

    #[test]
    fn empty_table_yields_no_rows() {
        for ind in Indicator::ALL {
            assert!(aggregate(&Table::default(), ind.column()).unwrap().is_empty());
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let t = table(&[(1, Some("Poor"))]);
        assert_eq!(
            aggregate(&t, "NotARealField"),
            Err(PipelineError::InvalidField("NotARealField".to_string()))
        );
        // Numeric score columns are not category fields either.
        assert!(aggregate(&t, "FCS").is_err());
    }

    #[test]
    fn repeated_calls_agree() {
        let t = table(&[(1, Some("Poor")), (2, Some("Borderline")), (2, Some("Poor"))]);
        assert_eq!(
            aggregate_indicator(&t, Indicator::Fcs),
            aggregate_indicator(&t, Indicator::Fcs)
        );
    }
}
