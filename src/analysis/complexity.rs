//! Complexity scoring for source files

use crate::analysis::patterns::PatternExtractor;
use crate::types::ComplexityTier;

/// Score added per complex construct
pub const COMPLEX_CONSTRUCT_PENALTY: usize = 10;

/// Scores below this are simple
pub const SIMPLE_CEILING: usize = 50;

/// Scores below this (and not simple) are intermediate
pub const INTERMEDIATE_CEILING: usize = 150;

/// Score and tier of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityScore {
    pub score: usize,
    pub tier: ComplexityTier,
}

impl ComplexityScore {
    /// Combines a line count with a construct count
    pub fn from_counts(lines: usize, constructs: usize) -> Self {
        let score = lines + constructs * COMPLEX_CONSTRUCT_PENALTY;
        Self {
            score,
            tier: tier_for(score),
        }
    }
}

/// Scores `content` as its line count plus a fixed penalty per complex construct
pub fn score_complexity<E: PatternExtractor + ?Sized>(extractor: &E, content: &str) -> ComplexityScore {
    ComplexityScore::from_counts(
        content.lines().count(),
        extractor.count_complex_constructs(content),
    )
}

pub fn tier_for(score: usize) -> ComplexityTier {
    if score < SIMPLE_CEILING {
        ComplexityTier::Simple
    } else if score < INTERMEDIATE_CEILING {
        ComplexityTier::Intermediate
    } else {
        ComplexityTier::Advanced
    }
}
