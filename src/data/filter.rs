use std::collections::BTreeSet;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// Filter selection: year, region and the chosen districts
// ---------------------------------------------------------------------------

/// The user's current filter choice.
///
/// Districts are expected to belong to `region`, but nothing here enforces
/// it; the side panel only offers districts of the selected region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub year: i32,
    pub region: String,
    pub districts: BTreeSet<String>,
}

impl FilterSelection {
    /// Default selection for a freshly loaded table: first year, first
    /// region surveyed that year, every district of that region.
    pub fn initial(table: &Table) -> Option<Self> {
        let year = *table.years().first()?;
        let region = table.regions_in_year(year).into_iter().next()?;
        let districts = table.districts_in_region(&region).into_iter().collect();
        Some(FilterSelection {
            year,
            region,
            districts,
        })
    }

    /// Whether `record` passes the selection.
    pub fn matches(&self, record: &Record) -> bool {
        record.year == self.year
            && record.region == self.region
            && self.districts.contains(&record.district)
    }
}

/// Keep the records matching `selection`, preserving their order.
///
/// An unknown year, region or an empty district set simply yields an
/// empty table.
pub fn filter(table: &Table, selection: &FilterSelection) -> Table {
    Table::from_records(
        table
            .iter()
            .filter(|r| selection.matches(r))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn selection(year: i32, region: &str, districts: &[&str]) -> FilterSelection {
        FilterSelection {
            year,
            region: region.to_string(),
            districts: districts.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn table() -> Table {
        Table::from_records(vec![
            record(2021, 1, "North", "N1"),
            record(2022, 1, "North", "N1"),
            record(2022, 2, "North", "N2"),
            record(2022, 3, "South", "N1"),
            record(2022, 4, "North", "N3"),
            record(2022, 5, "North", "N1"),
        ])
    }

    #[test]
    fn keeps_exactly_the_matching_records_in_order() {
        let table = table();
        let sel = selection(2022, "North", &["N1", "N3"]);
        let out = filter(&table, &sel);

        let expected: Vec<&Record> = table.iter().filter(|r| sel.matches(r)).collect();
        assert_eq!(out.records().iter().collect::<Vec<_>>(), expected);
        let months: Vec<u8> = out.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![1, 4, 5]);
        for r in &out {
            assert_eq!(r.year, 2022);
            assert_eq!(r.region, "North");
            assert!(sel.districts.contains(&r.district));
        }
    }

    #[test]
    fn district_code_shared_across_regions_is_not_leaked() {
        let out = filter(&table(), &selection(2022, "South", &["N1"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].month, 3);
    }

    #[test]
    fn missing_year_or_no_districts_yields_empty() {
        assert!(filter(&table(), &selection(1990, "North", &["N1"])).is_empty());
        assert!(filter(&table(), &selection(2022, "North", &[])).is_empty());
    }

    #[test]
    fn empty_table_yields_empty() {
        let out = filter(&Table::default(), &selection(2022, "North", &["N1"]));
        assert!(out.is_empty());
    }

    #[test]
    fn filtering_twice_gives_the_same_table() {
        let table = table();
        let sel = selection(2022, "North", &["N1", "N2"]);
        assert_eq!(filter(&table, &sel), filter(&table, &sel));
    }

    #[test]
    fn initial_selection_takes_first_year_region_and_all_districts() {
        let sel = FilterSelection::initial(&table()).unwrap();
        assert_eq!(sel.year, 2021);
        assert_eq!(sel.region, "North");
        assert_eq!(
            sel.districts.into_iter().collect::<Vec<_>>(),
            vec!["N1", "N2", "N3"]
        );
        assert_eq!(FilterSelection::initial(&Table::default()), None);
    }
}
