// src/explorer.rs

//! Consecutive-gap analysis over an ordered working set, plus the drill-down
//! state machine behind the polar explorer: rank gap candidates, recurse into
//! one (the gap's start values become the new working set), reset to the full
//! prime sequence. There is deliberately no "back" step; reset is the only
//! way out of a drilled state.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Groups rarer than this are noise and never shown.
pub const DEFAULT_MIN_SUPPORT: usize = 100;
/// Candidate list length offered per drill level.
pub const DEFAULT_TOP_K: usize = 10;

/// Block count for the early/late frequency comparison.
const RATIO_BLOCKS: u32 = 10;
/// Score assigned when a gap has early occurrences but none late.
const RATIO_SENTINEL: f64 = 100.0;

const ROOT_LABEL: &str = "Primes";

/// How a gap group's score is computed.
///
/// `Count` ranks by raw occurrence count. `EarlyLateRatio` ranks by how much
/// more frequent the gap is (relative to all gaps) in the first tenth of the
/// value range than in the last tenth, surfacing gaps that thin out as the
/// numbers grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStrategy {
    #[default]
    Count,
    EarlyLateRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapAnalysisOptions {
    pub min_support: usize,
    pub top_k: usize,
    pub strategy: ScoreStrategy,
}

impl Default for GapAnalysisOptions {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            top_k: DEFAULT_TOP_K,
            strategy: ScoreStrategy::Count,
        }
    }
}

/// One distinct consecutive-difference value and where it occurs.
#[derive(Debug, Clone)]
pub struct GapRecord {
    pub gap: u64,
    pub count: usize,
    pub score: f64,
    /// Start value of each occurrence, ascending. Shared so selecting a
    /// record hands the set to the explorer without copying it.
    pub occurrences: Arc<Vec<u64>>,
}

/// Walks `numbers` once, groups consecutive differences by value, drops
/// groups under `min_support`, scores the rest, and returns the top K by
/// descending score (count, then smaller gap, as deterministic tiebreaks).
#[must_use]
pub fn analyze_gaps(numbers: &[u64], options: &GapAnalysisOptions) -> Vec<GapRecord> {
    if numbers.len() < 2 {
        return Vec::new();
    }

    let mut groups: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for pair in numbers.windows(2) {
        groups.entry(pair[1] - pair[0]).or_default().push(pair[0]);
    }

    let first = numbers[0];
    let last = numbers[numbers.len() - 1];
    let span = (last - first) as f64;
    let block_of = |v: u64| -> u32 {
        if span <= 0.0 {
            return 0;
        }
        let scaled = (((v - first) as f64) / span) * f64::from(RATIO_BLOCKS);
        (scaled as u32).min(RATIO_BLOCKS - 1)
    };

    // Denominators for the ratio strategy: every gap occurrence starting in
    // the first/last block, across all groups including sub-support ones.
    let (mut total_early, mut total_late) = (0usize, 0usize);
    if options.strategy == ScoreStrategy::EarlyLateRatio {
        for occ in groups.values().flatten() {
            match block_of(*occ) {
                0 => total_early += 1,
                b if b == RATIO_BLOCKS - 1 => total_late += 1,
                _ => {}
            }
        }
    }

    let mut records: Vec<GapRecord> = groups
        .into_iter()
        .filter(|(_, occurrences)| occurrences.len() >= options.min_support)
        .map(|(gap, occurrences)| {
            let count = occurrences.len();
            let score = match options.strategy {
                ScoreStrategy::Count => count as f64,
                ScoreStrategy::EarlyLateRatio => {
                    let early = occurrences.iter().filter(|&&v| block_of(v) == 0).count();
                    let late = occurrences
                        .iter()
                        .filter(|&&v| block_of(v) == RATIO_BLOCKS - 1)
                        .count();
                    let rel_early = relative(early, total_early);
                    let rel_late = relative(late, total_late);
                    if rel_late > 0.0 {
                        rel_early / rel_late
                    } else if rel_early > 0.0 {
                        RATIO_SENTINEL
                    } else {
                        0.0
                    }
                }
            };
            GapRecord {
                gap,
                count,
                score,
                occurrences: Arc::new(occurrences),
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(b.count.cmp(&a.count))
            .then(a.gap.cmp(&b.gap))
    });
    records.truncate(options.top_k);
    records
}

#[inline]
fn relative(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Human label for a gap under a parent label. Known pairs get their
/// traditional names; everything else falls back to a templated label.
#[must_use]
pub fn gap_label(parent: &str, gap: u64) -> String {
    match special_label(parent, gap) {
        Some(name) => name.to_owned(),
        None => format!("Gap {gap} in {parent}"),
    }
}

fn special_label(parent: &str, gap: u64) -> Option<&'static str> {
    match (parent, gap) {
        (ROOT_LABEL, 2) => Some("Twin Primes"),
        (ROOT_LABEL, 4) => Some("Cousin Primes"),
        (ROOT_LABEL, 6) => Some("Sexy Primes"),
        ("Twin Primes", 6) => Some("Prime Quadruplets"),
        ("Cousin Primes", 6) => Some("Cousin Quadruplets"),
        _ => None,
    }
}

/// One drill step: the gap that was selected and the label it was shown
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub gap: u64,
    pub label: String,
}

/// Drill-down state over the prime sequence.
#[derive(Debug)]
pub struct Explorer {
    primes: Arc<Vec<u64>>,
    working: Arc<Vec<u64>>,
    path: Vec<Selection>,
    options: GapAnalysisOptions,
}

impl Explorer {
    #[must_use]
    pub fn new(primes: Vec<u64>, options: GapAnalysisOptions) -> Self {
        let primes = Arc::new(primes);
        Self {
            working: Arc::clone(&primes),
            primes,
            path: Vec::new(),
            options,
        }
    }

    /// The set currently displayed and analyzed.
    #[inline]
    #[must_use]
    pub fn working_set(&self) -> &[u64] {
        &self.working
    }

    /// Shared handle to the working set, for render passes that outlive a
    /// borrow of the explorer.
    #[inline]
    #[must_use]
    pub fn working_arc(&self) -> Arc<Vec<u64>> {
        Arc::clone(&self.working)
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &[Selection] {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Label the next selection is made under.
    #[must_use]
    pub fn parent_label(&self) -> &str {
        self.path.last().map_or(ROOT_LABEL, |s| s.label.as_str())
    }

    /// `"Primes"` joined with each selection label by `" > "`.
    #[must_use]
    pub fn breadcrumb(&self) -> String {
        let mut out = String::from(ROOT_LABEL);
        for step in &self.path {
            out.push_str(" > ");
            out.push_str(&step.label);
        }
        out
    }

    /// Ranked gap candidates for the current working set.
    #[must_use]
    pub fn candidates(&self) -> Vec<GapRecord> {
        analyze_gaps(&self.working, &self.options)
    }

    /// Drills into `record`: its occurrences become the working set and its
    /// label extends the path.
    pub fn select(&mut self, record: &GapRecord) {
        let label = gap_label(self.parent_label(), record.gap);
        self.path.push(Selection {
            gap: record.gap,
            label,
        });
        self.working = Arc::clone(&record.occurrences);
        debug!(
            "drilled to {} ({} values)",
            self.breadcrumb(),
            self.working.len()
        );
    }

    /// Back to the root state: full prime sequence, empty path.
    pub fn reset(&mut self) {
        self.working = Arc::clone(&self.primes);
        self.path.clear();
        debug!("explorer reset ({} primes)", self.working.len());
    }
}
