use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    /// Three-letter English month name (`Jan`..`Dec`). The service may emit
    /// a numeric string for out-of-range months.
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub earliest: Option<i32>,
    #[serde(default)]
    pub latest: Option<i32>,
}

/// Observation time series for one species.
///
/// `yearly` is sparse and kept in the order the service sent it; `monthly`
/// is sparse and unordered. `total_observations` comes from the service as
/// is and is not reconciled with the yearly counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub yearly: Vec<YearCount>,
    #[serde(default)]
    pub monthly: Vec<MonthCount>,
    #[serde(default)]
    pub total_observations: u64,
    #[serde(default)]
    pub date_range: DateRange,
}

impl TimelineData {
    pub fn has_yearly_data(&self) -> bool {
        !self.yearly.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DateRange, MonthCount, TimelineData, YearCount};
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_service_shape() {
        let json = r#"{
            "yearly": [{"year": 2021, "count": 7}, {"year": 2020, "count": 3}],
            "monthly": [{"month": "May", "count": 4}],
            "total_observations": 120,
            "date_range": {"earliest": 2020, "latest": null}
        }"#;
        let t: TimelineData = serde_json::from_str(json).expect("decode");
        assert_eq!(
            t.yearly,
            vec![
                YearCount { year: 2021, count: 7 },
                YearCount { year: 2020, count: 3 },
            ]
        );
        assert_eq!(
            t.monthly,
            vec![MonthCount {
                month: "May".into(),
                count: 4
            }]
        );
        assert_eq!(t.total_observations, 120);
        assert_eq!(
            t.date_range,
            DateRange {
                earliest: Some(2020),
                latest: None
            }
        );
    }

    #[test]
    fn empty_object_is_an_empty_timeline() {
        let t: TimelineData = serde_json::from_str("{}").expect("decode");
        assert_eq!(t, TimelineData::default());
        assert!(!t.has_yearly_data());
    }
}
