//! Derived views over a dataset
//!
//! Every function here is pure: same dataset and arguments, same result.
//! The store recomputes these on each published snapshot instead of caching
//! them, so a view can never disagree with the dataset it came from.

use std::collections::HashSet;

use crate::types::{CountryRecord, CountrySummary, LineSeries, ParticipationRecord, PieSlice, SeriesPoint};

pub fn sum_medals(records: &[ParticipationRecord]) -> i64 {
    records.iter().map(|p| p.medals_count).sum()
}

pub fn sum_athletes(records: &[ParticipationRecord]) -> i64 {
    records.iter().map(|p| p.athlete_count).sum()
}

/// Case-insensitive exact match on the country name.
///
/// Names are expected to be unique, but if they are not the first match wins.
pub fn find_country<'a>(dataset: &'a [CountryRecord], name: &str) -> Option<&'a CountryRecord> {
    dataset.iter().find(|record| same_name(&record.country, name))
}

fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Total medals of a country, 0 when the country is absent
pub fn country_medals(dataset: &[CountryRecord], name: &str) -> i64 {
    find_country(dataset, name)
        .map(|record| sum_medals(&record.participations))
        .unwrap_or(0)
}

/// Total athletes of a country, 0 when the country is absent
pub fn country_athletes(dataset: &[CountryRecord], name: &str) -> i64 {
    find_country(dataset, name)
        .map(|record| sum_athletes(&record.participations))
        .unwrap_or(0)
}

/// Medals per participation, labelled by year, in participation order.
///
/// `None` means the country does not exist, which is not the same thing as
/// a country that never won anything.
pub fn line_series_for(dataset: &[CountryRecord], name: &str) -> Option<LineSeries> {
    let record = find_country(dataset, name)?;
    Some(LineSeries {
        name: record.country.clone(),
        series: record
            .participations
            .iter()
            .map(|p| SeriesPoint {
                name: p.year.to_string(),
                value: p.medals_count,
            })
            .collect(),
    })
}

pub fn pie_series_for(dataset: &[CountryRecord]) -> Vec<PieSlice> {
    dataset
        .iter()
        .map(|record| PieSlice {
            name: record.country.clone(),
            value: sum_medals(&record.participations),
        })
        .collect()
}

/// Number of distinct games across all countries.
///
/// A year shared by several countries is one event.
pub fn distinct_years(dataset: &[CountryRecord]) -> usize {
    dataset
        .iter()
        .flat_map(|record| record.participations.iter().map(|p| p.year))
        .collect::<HashSet<_>>()
        .len()
}

pub fn country_summary(dataset: &[CountryRecord], name: &str) -> Option<CountrySummary> {
    let record = find_country(dataset, name)?;
    Some(CountrySummary {
        name: record.country.clone(),
        entries: record.participations.len(),
        total_medals: sum_medals(&record.participations),
        total_athletes: sum_athletes(&record.participations),
    })
}

pub fn country_count(dataset: &[CountryRecord]) -> usize {
    dataset.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dataset;

    fn country(id: i64, name: &str, participations: &[(i32, i64, i64)]) -> CountryRecord {
        CountryRecord {
            id,
            country: name.to_string(),
            participations: participations
                .iter()
                .map(|&(year, athletes, medals)| ParticipationRecord::new(year, athletes, medals))
                .collect(),
        }
    }

    fn sample() -> Dataset {
        vec![
            country(1, "France", &[(2012, 330, 35), (2016, 395, 45)]),
            country(2, "United States", &[(2016, 555, 121), (2020, 613, 113)]),
            country(3, "Spain", &[]),
        ]
    }

    #[test]
    fn test_country_totals() {
        let data = sample();
        assert_eq!(country_medals(&data, "France"), 80);
        assert_eq!(country_athletes(&data, "France"), 725);
        assert_eq!(country_medals(&data, "united states"), 234);
        assert_eq!(country_medals(&data, "Spain"), 0);
    }

    #[test]
    fn test_absent_country() {
        let data = sample();
        assert_eq!(country_medals(&data, "Atlantis"), 0);
        assert_eq!(country_athletes(&data, "Atlantis"), 0);
        assert!(line_series_for(&data, "Atlantis").is_none());
        assert!(country_summary(&data, "Atlantis").is_none());

        // Prefixes do not match
        assert!(find_country(&data, "Fran").is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let data: Dataset = Vec::new();
        assert_eq!(country_medals(&data, "France"), 0);
        assert!(pie_series_for(&data).is_empty());
        assert_eq!(distinct_years(&data), 0);
        assert_eq!(country_count(&data), 0);
    }

    #[test]
    fn test_find_country_first_match_wins() {
        let data = vec![
            country(1, "France", &[(2012, 1, 1)]),
            country(2, "FRANCE", &[(2016, 2, 2)]),
        ];
        assert_eq!(find_country(&data, "france").map(|c| c.id), Some(1));
    }

    #[test]
    fn test_line_series_keeps_participation_order() {
        let data = vec![country(1, "Italy", &[(2016, 311, 28), (2012, 372, 28), (2020, 384, 40)])];
        let series = line_series_for(&data, "ITALY").unwrap();

        assert_eq!(series.name, "Italy");
        let labels: Vec<_> = series.series.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(labels, vec!["2016", "2012", "2020"]);
        assert_eq!(series.values(), vec![28, 28, 40]);
    }

    #[test]
    fn test_line_series_for_country_without_medals() {
        let data = vec![country(1, "Monaco", &[(2012, 6, 0), (2016, 3, 0)])];
        let series = line_series_for(&data, "monaco").unwrap();
        assert_eq!(series.values(), vec![0, 0]);
    }

    #[test]
    fn test_pie_series_matches_country_medals() {
        let data = sample();
        let pie = pie_series_for(&data);

        assert_eq!(pie.len(), data.len());
        for slice in &pie {
            assert_eq!(slice.value, country_medals(&data, &slice.name));
        }
        let names: Vec<_> = pie.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["France", "United States", "Spain"]);
    }

    #[test]
    fn test_distinct_years_dedups_across_countries() {
        let data = vec![
            country(1, "France", &[(2012, 0, 0), (2016, 0, 0)]),
            country(2, "USA", &[(2016, 0, 0), (2020, 0, 0)]),
        ];
        assert_eq!(distinct_years(&data), 3);
    }

    #[test]
    fn test_country_summary() {
        let summary = country_summary(&sample(), "france").unwrap();
        assert_eq!(
            summary,
            CountrySummary {
                name: "France".to_string(),
                entries: 2,
                total_medals: 80,
                total_athletes: 725,
            }
        );
    }

    #[test]
    fn test_negative_counts_pass_through() {
        let data = vec![country(1, "Oddland", &[(2012, -4, -1), (2016, 10, 3)])];
        assert_eq!(country_medals(&data, "oddland"), 2);
        assert_eq!(country_athletes(&data, "oddland"), 6);
    }
}
