use std::collections::BTreeSet;

use super::aggregate::{aggregate, AggregateRow, PipelineError};
use super::filter::{filter, FilterSelection};
use super::model::{Indicator, Table};

// ---------------------------------------------------------------------------
// Request / response for one filter change
// ---------------------------------------------------------------------------

/// Outcome of one filter-change event.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardResponse {
    /// No district selected; the pipeline was not run.
    EmptySelection,
    Charts {
        /// Households matching the selection.
        households: usize,
        /// One chart per indicator, in display order.
        charts: Vec<IndicatorChart>,
    },
}

/// Aggregated rows for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorChart {
    pub indicator: Indicator,
    pub rows: Vec<AggregateRow>,
}

/// One stacked-bar layer: a category with one value per chart month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    /// `(month, percentage)`, zero where the category was not observed.
    pub points: Vec<(u8, f64)>,
}

impl IndicatorChart {
    /// Months present in the chart, ascending.
    pub fn months(&self) -> Vec<u8> {
        self.rows
            .iter()
            .map(|r| r.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows sorted by month, then by the indicator's category order.
    pub fn ordered_rows(&self) -> Vec<&AggregateRow> {
        let mut rows: Vec<&AggregateRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            a.month
                .cmp(&b.month)
                .then_with(|| self.rank(&a.category).cmp(&self.rank(&b.category)))
        });
        rows
    }

    /// Split rows into one series per category, in display order.
    ///
    /// Every series covers every month of the chart so stacked bars line up.
    pub fn series(&self) -> Vec<CategorySeries> {
        let months = self.months();
        let mut categories: Vec<&str> = self
            .rows
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        categories.sort_by_key(|c| self.rank(*c));

        categories
            .into_iter()
            .map(|category| CategorySeries {
                category: category.to_string(),
                points: months
                    .iter()
                    .map(|&month| {
                        let pct = self
                            .rows
                            .iter()
                            .find(|r| r.month == month && r.category == category)
                            .map_or(0.0, |r| r.percentage);
                        (month, pct)
                    })
                    .collect(),
            })
            .collect()
    }

    // Known categories first by display order, unknown ones by label.
    fn rank<'a>(&self, category: &'a str) -> (usize, &'a str) {
        (self.indicator.category_rank(category), category)
    }
}

/// Run the filter and all four aggregations for `selection`.
///
/// Any aggregation error aborts the whole request; no partial set of
/// charts is returned.
pub fn handle_selection(
    table: &Table,
    selection: &FilterSelection,
) -> Result<DashboardResponse, PipelineError> {
    if selection.districts.is_empty() {
        log::debug!("no district selected for {} / {}", selection.year, selection.region);
        return Ok(DashboardResponse::EmptySelection);
    }

    let filtered = filter(table, selection);
    let charts = Indicator::ALL
        .into_iter()
        .map(|indicator| {
            Ok(IndicatorChart {
                indicator,
                rows: aggregate(&filtered, indicator.column())?,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    log::debug!(
        "{} / {} / {} districts: {} households, {} aggregate rows",
        selection.year,
        selection.region,
        selection.districts.len(),
        filtered.len(),
        charts.iter().map(|c| c.rows.len()).sum::<usize>()
    );

    Ok(DashboardResponse::Charts {
        households: filtered.len(),
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::Record;

    fn household(month: u8, district: &str, fcs: &str, lcs: &str) -> Record {
        Record {
            fcs_cat: Some(fcs.to_string()),
            lcs_cat: Some(lcs.to_string()),
            ..record(2023, month, "North", district)
        }
    }

    fn table() -> Table {
        Table::from_records(vec![
            household(1, "N1", "Poor", "None"),
            household(1, "N1", "Acceptable", "Crisis"),
            household(2, "N2", "Borderline", "Emergency"),
            household(2, "N1", "Acceptable", "Stressed"),
            household(3, "N9", "Poor", "None"),
        ])
    }

    fn selection(districts: &[&str]) -> FilterSelection {
        FilterSelection {
            year: 2023,
            region: "North".to_string(),
            districts: districts.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn empty_district_set_skips_the_pipeline() {
        assert_eq!(
            handle_selection(&table(), &selection(&[])),
            Ok(DashboardResponse::EmptySelection)
        );
    }

    #[test]
    fn produces_four_charts_in_display_order() {
        let DashboardResponse::Charts { households, charts } =
            handle_selection(&table(), &selection(&["N1", "N2"])).unwrap()
        else {
            panic!("expected charts");
        };
        assert_eq!(households, 4);
        let order: Vec<Indicator> = charts.iter().map(|c| c.indicator).collect();
        assert_eq!(order, Indicator::ALL.to_vec());
        // No HHS labels in the fixture.
        assert!(charts[2].rows.is_empty());
        assert_eq!(charts[0].months(), vec![1, 2]);
        // Each chart matches a direct aggregation of its named column.
        let filtered = filter(&table(), &selection(&["N1", "N2"]));
        for chart in &charts {
            assert_eq!(
                Ok(chart.rows.clone()),
                aggregate(&filtered, chart.indicator.column())
            );
        }
    }

    #[test]
    fn series_follow_category_order_and_fill_missing_months() {
        let DashboardResponse::Charts { charts, .. } =
            handle_selection(&table(), &selection(&["N1", "N2"])).unwrap()
        else {
            panic!("expected charts");
        };
        let series = charts[0].series();
        let names: Vec<&str> = series.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(names, vec!["Acceptable", "Borderline", "Poor"]);

        assert_eq!(series[0].points, vec![(1, 50.0), (2, 50.0)]);
        assert_eq!(series[1].points, vec![(1, 0.0), (2, 50.0)]);
        assert_eq!(series[2].points, vec![(1, 50.0), (2, 0.0)]);
    }

    #[test]
    fn unknown_categories_follow_known_ones() {
        let chart = IndicatorChart {
            indicator: Indicator::Rcsi,
            rows: vec![
                AggregateRow { month: 5, category: "Zeta".into(), percentage: 10.0 },
                AggregateRow { month: 5, category: "Crisis +".into(), percentage: 20.0 },
                AggregateRow { month: 5, category: "Alpha".into(), percentage: 30.0 },
                AggregateRow { month: 5, category: "None".into(), percentage: 40.0 },
            ],
        };
        let ordered: Vec<&str> = chart
            .ordered_rows()
            .into_iter()
            .map(|r| r.category.as_str())
            .collect();
        assert_eq!(ordered, vec!["None", "Crisis +", "Alpha", "Zeta"]);
        let series: Vec<String> = chart.series().into_iter().map(|s| s.category).collect();
        assert_eq!(series, vec!["None", "Crisis +", "Alpha", "Zeta"]);
    }

    #[test]
    fn handling_is_repeatable() {
        let table = table();
        let sel = selection(&["N1"]);
        assert_eq!(handle_selection(&table, &sel), handle_selection(&table, &sel));
    }
}
