use std::collections::BTreeMap;

/// Why an upstream row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Occupation code is not `NN-NNNN`.
    InvalidCode,
    /// Major, broad or all-occupations aggregate.
    AggregateCode,
    DuplicateCode,
    NoSocCode,
    /// State row for a code absent from the national set.
    SocNotInOccupations,
    NoArea,
    NoStateMatch,
    /// Census row whose FIPS code is not a known state.
    UnknownGeography,
    MissingWageData,
    /// Suppressed or footnoted median (`*`, `**`, `#`).
    SpecialMedianCode,
    SpecialMeanCode,
    WageOutOfRange,
    MissingExposure,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SkipReason::InvalidCode => "invalid_code",
            SkipReason::AggregateCode => "aggregate_code",
            SkipReason::DuplicateCode => "duplicate_code",
            SkipReason::NoSocCode => "no_soc_code",
            SkipReason::SocNotInOccupations => "soc_not_in_occupations",
            SkipReason::NoArea => "no_area",
            SkipReason::NoStateMatch => "no_state_match",
            SkipReason::UnknownGeography => "unknown_geography",
            SkipReason::MissingWageData => "missing_wage_data",
            SkipReason::SpecialMedianCode => "special_median_code",
            SkipReason::SpecialMeanCode => "special_mean_code",
            SkipReason::WageOutOfRange => "wage_out_of_range",
            SkipReason::MissingExposure => "missing_exposure",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    /// Zero-based data row index (header excluded).
    pub row: usize,
    pub reason: SkipReason,
}

/// Result of a parse step: the rows kept and the rows dropped, with why.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Parsed {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Parsed<T> {
    pub fn accept(&mut self, item: T) {
        self.accepted.push(item);
    }

    pub fn reject(&mut self, row: usize, reason: SkipReason) {
        self.rejected.push(Rejection { row, reason });
    }

    /// Record a per-row outcome.
    pub fn push(&mut self, row: usize, outcome: Result<T, SkipReason>) {
        match outcome {
            Ok(item) => self.accept(item),
            Err(reason) => self.reject(row, reason),
        }
    }

    pub fn rejected_for(&self, reason: SkipReason) -> usize {
        self.rejected.iter().filter(|r| r.reason == reason).count()
    }

    pub fn reason_counts(&self) -> BTreeMap<SkipReason, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejected {
            *counts.entry(rejection.reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Reason counts, most frequent first.
pub fn ranked(counts: &BTreeMap<SkipReason, usize>) -> Vec<(SkipReason, usize)> {
    let mut pairs: Vec<(SkipReason, usize)> = counts.iter().map(|(r, c)| (*r, *c)).collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    pairs
}
