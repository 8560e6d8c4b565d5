use catalog::timeline::TimelineData;

/// Headline numbers shown above the charts.
///
/// Display-only: `total_observations` is taken from the service and never
/// reconciled with the yearly counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimelineSummary {
    pub total_observations: u64,
    pub earliest: Option<i32>,
    pub latest: Option<i32>,
}

impl TimelineSummary {
    pub fn from_timeline(data: &TimelineData) -> Self {
        Self {
            total_observations: data.total_observations,
            earliest: data.date_range.earliest,
            latest: data.date_range.latest,
        }
    }
}

pub struct Statistics;

impl Statistics {
    /// Sum of the yearly counts.
    pub fn yearly_sum(data: &TimelineData) -> u64 {
        data.yearly.iter().map(|y| y.count).sum()
    }

    /// Year with the most observations; the earliest such record on ties.
    pub fn peak_year(data: &TimelineData) -> Option<(i32, u64)> {
        let mut best: Option<(i32, u64)> = None;
        for y in &data.yearly {
            if best.is_none_or(|(_, count)| y.count > count) {
                best = Some((y.year, y.count));
            }
        }
        best
    }

    /// Whether the service total covers every yearly count.
    pub fn total_covers_yearly(data: &TimelineData) -> bool {
        data.total_observations >= Self::yearly_sum(data)
    }
}
