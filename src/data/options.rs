use std::collections::HashSet;

use super::model::{CountryOption, ProcessedTable};

/// Distinct locations in first-occurrence order, one option per location.
pub fn country_options(table: &ProcessedTable) -> Vec<CountryOption> {
    let mut seen: HashSet<&str> = HashSet::new();
    table
        .rows()
        .iter()
        .filter(|row| seen.insert(row.location.as_str()))
        .map(|row| CountryOption::new(&row.location))
        .collect()
}

/// The initial selection: `preferred` when the data knows it, otherwise nothing.
pub fn default_selection(options: &[CountryOption], preferred: &str) -> Vec<String> {
    if options.iter().any(|o| o.value == preferred) {
        vec![preferred.to_string()]
    } else {
        log::warn!("Default country '{preferred}' is not in the dataset; starting with no selection");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn table(locations: &[&str]) -> ProcessedTable {
        let rows = locations
            .iter()
            .map(|l| Observation {
                iso_code: String::new(),
                location: l.to_string(),
                date: "2021-01-01".into(),
                new_cases: None,
                total_cases: None,
                new_deaths: None,
            })
            .collect();
        ProcessedTable::from_sorted(rows)
    }

    #[test]
    fn first_occurrence_order_without_duplicates() {
        let t = table(&["Ireland", "France", "Ireland", "Chile", "France"]);
        let opts = country_options(&t);
        let values: Vec<&str> = opts.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["Ireland", "France", "Chile"]);
        assert!(opts.iter().all(|o| o.label == o.value));
    }

    #[test]
    fn empty_table_has_no_options() {
        assert!(country_options(&ProcessedTable::default()).is_empty());
    }

    #[test]
    fn default_selection_requires_presence() {
        let opts = country_options(&table(&["France"]));
        assert!(default_selection(&opts, "Ireland").is_empty());
        assert_eq!(default_selection(&opts, "France"), vec!["France".to_string()]);
    }
}
