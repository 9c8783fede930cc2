//! Consolidation of variable costs into semantic buckets.
//!
//! Variable units are free text ("per API call", "per GB scanned"), so the
//! stack summary classifies them by keyword into five stable categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::extract::{CostComponent, CostKind};
use super::group::AggregatedCostEntry;
use crate::model::Currency;

/// Semantic category of a variable cost, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Requests,
    Storage,
    Data,
    Compute,
    Other,
}

impl Bucket {
    /// All buckets in priority order.
    pub const ALL: [Bucket; 5] = [
        Bucket::Requests,
        Bucket::Storage,
        Bucket::Data,
        Bucket::Compute,
        Bucket::Other,
    ];

    /// Lowercase substrings that route a unit into this bucket.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Bucket::Requests => &["request", "call", "api"],
            Bucket::Storage => &["gb", "storage", "disk"],
            Bucket::Data => &["log", "indexed", "scan"],
            Bucket::Compute => &["cpu", "memory", "hour", "compute"],
            Bucket::Other => &[],
        }
    }

    /// Classify a free-text unit; the first bucket with a matching keyword wins.
    pub fn classify(unit: &str) -> Bucket {
        let unit = unit.to_lowercase();
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.keywords().iter().any(|k| unit.contains(k)))
            .unwrap_or(Bucket::Other)
    }

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Requests => "requests",
            Bucket::Storage => "storage",
            Bucket::Data => "data",
            Bucket::Compute => "compute",
            Bucket::Other => "other",
        }
    }

    /// Capitalized name used in banners and tooltips.
    pub fn title(self) -> &'static str {
        match self {
            Bucket::Requests => "Requests",
            Bucket::Storage => "Storage",
            Bucket::Data => "Data",
            Bucket::Compute => "Compute",
            Bucket::Other => "Other",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All variable costs that fell into one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    pub bucket: Bucket,
    pub amount: f64,
    /// Currency of the first contributing entry.
    pub currency: Currency,
    pub contributors: Vec<CostComponent>,
}

/// Output of [`consolidate`]: fixed entries unchanged, variable costs bucketed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConsolidatedEntry {
    Fixed(AggregatedCostEntry),
    Variable(BucketEntry),
}

impl ConsolidatedEntry {
    pub fn amount(&self) -> f64 {
        match self {
            ConsolidatedEntry::Fixed(entry) => entry.amount,
            ConsolidatedEntry::Variable(entry) => entry.amount,
        }
    }

    pub fn kind(&self) -> CostKind {
        match self {
            ConsolidatedEntry::Fixed(_) => CostKind::Fixed,
            ConsolidatedEntry::Variable(_) => CostKind::Variable,
        }
    }

    pub fn contributors(&self) -> &[CostComponent] {
        match self {
            ConsolidatedEntry::Fixed(entry) => &entry.contributors,
            ConsolidatedEntry::Variable(entry) => &entry.contributors,
        }
    }
}

/// Pass fixed entries through and merge variable entries into buckets.
///
/// Buckets are emitted in priority order after all fixed entries; a bucket
/// that received nothing is omitted.
pub fn consolidate(aggregated: &[AggregatedCostEntry]) -> Vec<ConsolidatedEntry> {
    let mut out: Vec<ConsolidatedEntry> = aggregated
        .iter()
        .filter(|e| e.kind == CostKind::Fixed)
        .cloned()
        .map(ConsolidatedEntry::Fixed)
        .collect();

    let mut buckets: Vec<Option<BucketEntry>> = vec![None; Bucket::ALL.len()];
    for entry in aggregated.iter().filter(|e| e.kind == CostKind::Variable) {
        let bucket = Bucket::classify(entry.unit.as_deref().unwrap_or_default());
        let slot = &mut buckets[bucket as usize];
        match slot {
            Some(existing) => {
                existing.amount += entry.amount;
                existing.contributors.extend(entry.contributors.iter().cloned());
            }
            None => {
                *slot = Some(BucketEntry {
                    bucket,
                    amount: entry.amount,
                    currency: entry.currency.clone(),
                    contributors: entry.contributors.clone(),
                })
            }
        }
    }

    out.extend(buckets.into_iter().flatten().map(ConsolidatedEntry::Variable));
    out
}

/// Fixed, variable and overall sums of a consolidated summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostTotals {
    pub fixed: f64,
    pub variable: f64,
}

impl CostTotals {
    pub fn from_entries(entries: &[ConsolidatedEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            match e.kind() {
                CostKind::Fixed => acc.fixed += e.amount(),
                CostKind::Variable => acc.variable += e.amount(),
            }
            acc
        })
    }

    pub fn total(&self) -> f64 {
        self.fixed + self.variable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::group::aggregate;
    use crate::model::{CostModel, Layer};
    use test_case::test_case;

    #[test_case("per API call" => Bucket::Requests; "api")]
    #[test_case("per 1M requests" => Bucket::Requests; "requests")]
    #[test_case("API calls per GB" => Bucket::Requests; "requests wins over storage")]
    #[test_case("per GB stored" => Bucket::Storage; "gb")]
    #[test_case("Disk IOPS" => Bucket::Storage; "disk")]
    #[test_case("per million log lines" => Bucket::Data; "log")]
    #[test_case("per TB scanned" => Bucket::Data; "scan")]
    #[test_case("per vCPU" => Bucket::Compute; "cpu")]
    #[test_case("per hour" => Bucket::Compute; "hour")]
    #[test_case("per seat" => Bucket::Other; "fallback")]
    #[test_case("" => Bucket::Other; "empty unit")]
    fn test_classify(unit: &str) -> Bucket {
        Bucket::classify(unit)
    }

    fn stack() -> Vec<Layer> {
        vec![
            Layer::new("1", "Gateway")
                .with_cost(CostModel::monthly(150.0).with_variable(0.006, "per 1M requests")),
            Layer::new("2", "Functions")
                .with_cost(CostModel::default().with_variable(0.2, "per API call")),
            Layer::new("3", "Bucket Store")
                .with_cost(CostModel::monthly(10.0).with_variable(0.023, "per GB stored")),
            Layer::new("4", "Licenses")
                .with_cost(CostModel::default().with_variable(5.0, "per seat")),
        ]
    }

    #[test]
    fn test_consolidate_merges_buckets() {
        let consolidated = consolidate(&aggregate(&stack()));

        assert_eq!(consolidated.len(), 4);
        assert!(matches!(consolidated[0], ConsolidatedEntry::Fixed(_)));

        let buckets: Vec<Bucket> = consolidated
            .iter()
            .filter_map(|e| match e {
                ConsolidatedEntry::Variable(b) => Some(b.bucket),
                ConsolidatedEntry::Fixed(_) => None,
            })
            .collect();
        assert_eq!(buckets, vec![Bucket::Requests, Bucket::Storage, Bucket::Other]);

        let ConsolidatedEntry::Variable(requests) = &consolidated[1] else {
            panic!("expected requests bucket");
        };
        assert!((requests.amount - 0.206).abs() < 1e-12);
        assert_eq!(requests.contributors.len(), 2);
    }

    #[test]
    fn test_consolidation_preserves_total() {
        let layers = stack();
        let raw: f64 = crate::cost::extract::extract_all(&layers)
            .iter()
            .map(|c| c.amount)
            .sum();
        let consolidated = consolidate(&aggregate(&layers));
        let totals = CostTotals::from_entries(&consolidated);
        assert!((totals.total() - raw).abs() < 1e-9);
        assert_eq!(totals.fixed, 160.0);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(consolidate(&[]).is_empty());
        assert_eq!(CostTotals::from_entries(&[]).total(), 0.0);
    }
}
