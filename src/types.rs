use serde::{Deserialize, Serialize};

/// One Olympic games participation of a country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub year: i32,
    #[serde(rename = "athleteCount")]
    pub athlete_count: i64,
    #[serde(rename = "medalsCount")]
    pub medals_count: i64,
    /// Fields the statistics never read (`id`, `city`, ...), kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ParticipationRecord {
    pub fn new(year: i32, athlete_count: i64, medals_count: i64) -> Self {
        Self {
            year,
            athlete_count,
            medals_count,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: i64,
    pub country: String,
    pub participations: Vec<ParticipationRecord>,
}

/// Full collection of country records, in source order
pub type Dataset = Vec<CountryRecord>;

/// One point of a line chart: the year as label, medals as value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub name: String,
    pub value: i64,
}

/// Medal trend of one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub series: Vec<SeriesPoint>,
}

impl LineSeries {
    pub fn values(&self) -> Vec<i64> {
        self.series.iter().map(|p| p.value).collect()
    }
}

/// Slice of the home pie chart: a country and its medal total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: i64,
}

/// Header figures of the country detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub name: String,
    pub entries: usize,
    #[serde(rename = "totalMedals")]
    pub total_medals: i64,
    #[serde(rename = "totalAthletes")]
    pub total_athletes: i64,
}
