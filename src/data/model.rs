use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Record – one survey response
// ---------------------------------------------------------------------------

/// A single household survey response (one row of the source file).
///
/// Fields are validated once by the loader; nothing downstream re-checks them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub user_id: String,
    /// Observation date kept as text, exactly as exported.
    pub obs_date: Option<String>,
    /// Admin-1 region name (`ADMIN1Name`).
    pub region: String,
    /// Admin-2 district (`ADM2`).
    pub district: String,
    pub location: Option<String>,
    pub livelihood_zone: Option<String>,
    pub year: i32,
    /// Month of observation, 1–12.
    pub month: u8,
    pub fcs: Option<f64>,
    pub fcs_cat: Option<String>,
    pub rcsi: Option<f64>,
    pub rcsi_cat: Option<String>,
    pub hhs: Option<f64>,
    pub hhs_cat: Option<String>,
    pub lcs_cat: Option<String>,
}

impl Record {
    /// Category label of `indicator` for this household, if recorded.
    pub fn category(&self, indicator: Indicator) -> Option<&str> {
        match indicator {
            Indicator::Fcs => self.fcs_cat.as_deref(),
            Indicator::Rcsi => self.rcsi_cat.as_deref(),
            Indicator::Hhs => self.hhs_cat.as_deref(),
            Indicator::Lcs => self.lcs_cat.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Indicator – the four categorical outcome indicators
// ---------------------------------------------------------------------------

/// One of the four food-security indicator category columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Indicator {
    /// Food Consumption Score.
    Fcs,
    /// Reduced Coping Strategies Index.
    Rcsi,
    /// Household Hunger Scale.
    Hhs,
    /// Livelihood-based coping.
    Lcs,
}

impl Indicator {
    /// All indicators, in dashboard display order.
    pub const ALL: [Indicator; 4] = [
        Indicator::Fcs,
        Indicator::Rcsi,
        Indicator::Hhs,
        Indicator::Lcs,
    ];

    /// Source column holding the category label.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::Fcs => "FCSCat28",
            Indicator::Rcsi => "rCSI_cat",
            Indicator::Hhs => "HHS_IPC",
            Indicator::Lcs => "Max_coping_behaviour",
        }
    }

    /// Resolve a column name to its indicator.
    pub fn from_column(column: &str) -> Option<Indicator> {
        Self::ALL.into_iter().find(|ind| ind.column() == column)
    }

    pub fn title(self) -> &'static str {
        match self {
            Indicator::Fcs => "Food Consumption Score (FCS)",
            Indicator::Rcsi => "Food Consumption-based Coping (rCSI)",
            Indicator::Hhs => "Household Hunger Scale (HHS)",
            Indicator::Lcs => "Livelihood-based coping",
        }
    }

    /// Short label used for the legend heading.
    pub fn legend_label(self) -> &'static str {
        match self {
            Indicator::Fcs => "FCS",
            Indicator::Rcsi => "rCSI",
            Indicator::Hhs => "HHS",
            Indicator::Lcs => "Livelihood-coping",
        }
    }

    /// Heading of the collapsible section holding the chart.
    pub fn section_label(self) -> &'static str {
        match self {
            Indicator::Fcs => "FCS Graph",
            Indicator::Rcsi => "rCSI Graph",
            Indicator::Hhs => "HHS Graph",
            Indicator::Lcs => "LVC Graph",
        }
    }

    /// Fixed display order of the category labels, best to worst.
    pub fn categories(self) -> &'static [&'static str] {
        match self {
            Indicator::Fcs => &["Acceptable", "Borderline", "Poor"],
            Indicator::Rcsi => &["None", "Stressed", "Crisis +"],
            Indicator::Hhs => &["None", "Stressed", "Crisis", "Emergency", "Catastrophe"],
            Indicator::Lcs => &["None", "Stressed", "Crisis", "Emergency"],
        }
    }

    /// Position of `category` in the display order; unknown labels sort last.
    pub fn category_rank(self, category: &str) -> usize {
        self.categories()
            .iter()
            .position(|c| *c == category)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legend_label())
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered, read-only sequence of survey records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn from_records(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of households.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct survey years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct regions surveyed in `year`, sorted.
    pub fn regions_in_year(&self, year: i32) -> Vec<String> {
        self.iter()
            .filter(|r| r.year == year)
            .map(|r| r.region.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct districts of `region` across all years, sorted.
    pub fn districts_in_region(&self, region: &str) -> Vec<String> {
        self.iter()
            .filter(|r| r.region == region)
            .map(|r| r.district.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal record for tests; callers override the fields they care about.
    pub(crate) fn record(year: i32, month: u8, region: &str, district: &str) -> Record {
        Record {
            user_id: format!("{region}-{district}-{year}-{month}"),
            obs_date: None,
            region: region.to_string(),
            district: district.to_string(),
            location: None,
            livelihood_zone: None,
            year,
            month,
            fcs: None,
            fcs_cat: None,
            rcsi: None,
            rcsi_cat: None,
            hhs: None,
            hhs_cat: None,
            lcs_cat: None,
        }
    }

    fn sample_table() -> Table {
        Table::from_records(vec![
            record(2022, 1, "North", "N2"),
            record(2021, 3, "South", "S1"),
            record(2022, 2, "North", "N1"),
            record(2021, 4, "North", "N3"),
            record(2022, 5, "East", "E1"),
        ])
    }

    #[test]
    fn years_are_distinct_and_ascending() {
        assert_eq!(sample_table().years(), vec![2021, 2022]);
    }

    #[test]
    fn regions_are_limited_to_the_year() {
        let table = sample_table();
        assert_eq!(table.regions_in_year(2021), vec!["North", "South"]);
        assert_eq!(table.regions_in_year(2022), vec!["East", "North"]);
        assert!(table.regions_in_year(1999).is_empty());
    }

    #[test]
    fn districts_span_all_years_of_the_region() {
        let table = sample_table();
        assert_eq!(table.districts_in_region("North"), vec!["N1", "N2", "N3"]);
        assert!(table.districts_in_region("West").is_empty());
    }

    #[test]
    fn indicator_columns_round_trip() {
        for ind in Indicator::ALL {
            assert_eq!(Indicator::from_column(ind.column()), Some(ind));
        }
        assert_eq!(Indicator::from_column("FCS"), None);
    }

    #[test]
    fn unknown_categories_rank_last() {
        assert_eq!(Indicator::Fcs.category_rank("Acceptable"), 0);
        assert_eq!(Indicator::Fcs.category_rank("Poor"), 2);
        assert_eq!(Indicator::Hhs.category_rank("Unknown"), usize::MAX);
    }
}
