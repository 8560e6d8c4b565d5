use catalog::timeline::{MonthCount, TimelineData, YearCount};

use crate::analysis::statistics::TimelineSummary;

/// Canonical month order used by the seasonal series.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One point of a chart series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    pub observations: u64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, observations: u64) -> Self {
        Self {
            label: label.into(),
            observations,
        }
    }
}

/// Chart-ready series for one species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSeries {
    /// One point per yearly record, in the order the service sent them.
    pub yearly: Vec<ChartPoint>,
    /// Months with at least one observation, `Jan` first.
    pub monthly: Vec<ChartPoint>,
    pub summary: TimelineSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineChart {
    /// No yearly records: nothing worth charting.
    NoData,
    Series(TimelineSeries),
}

/// Reshapes raw timeline counts into chart series. Pure, no I/O.
pub struct TimelineAggregator;

impl TimelineAggregator {
    /// Maps yearly records 1:1, preserving input order.
    pub fn yearly_series(yearly: &[YearCount]) -> Vec<ChartPoint> {
        yearly
            .iter()
            .map(|y| ChartPoint::new(y.year.to_string(), y.count))
            .collect()
    }

    /// Zero-fills `Jan..Dec` from the sparse monthly records, then drops the
    /// empty months.
    ///
    /// The first record with a matching name wins; names outside the
    /// canonical twelve are ignored.
    pub fn monthly_series(monthly: &[MonthCount]) -> Vec<ChartPoint> {
        MONTHS
            .iter()
            .map(|&month| {
                let observations = monthly
                    .iter()
                    .find(|m| m.month == month)
                    .map_or(0, |m| m.count);
                ChartPoint::new(month, observations)
            })
            .filter(|p| p.observations > 0)
            .collect()
    }

    pub fn aggregate(data: &TimelineData) -> TimelineChart {
        if !data.has_yearly_data() {
            return TimelineChart::NoData;
        }
        TimelineChart::Series(TimelineSeries {
            yearly: Self::yearly_series(&data.yearly),
            monthly: Self::monthly_series(&data.monthly),
            summary: TimelineSummary::from_timeline(data),
        })
    }
}
