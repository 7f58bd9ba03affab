//! Chromosome naming - Human-readable identifiers for tracking evolution
//!
//! Generates memorable names (e.g., "SwiftBot-3fa91c02") from gene values.
//! Names are deterministic based on the genotype, so the same genes and id
//! always give the same name. Anything that changes genes must call
//! [`derive_name`] again.

use crate::chromosome::NUM_GENES;

// 8 prefixes + 8 suffixes = 64 name stems
pub const PREFIXES: [&str; 8] = [
    "Swift", "Steady", "Crazy", "Calm", "Hyper", "Zen", "Wild", "Cool",
];

pub const SUFFIXES: [&str; 8] = ["Bot", "AI", "Mind", "Brain", "Core", "Net", "Byte", "Bit"];

/// Index into a word list from one half of the gene vector.
///
/// The half is summed, scaled by 100 and truncated before the modulo.
fn word_index(half: &[f64], words: usize) -> usize {
    let sum: f64 = half.iter().sum();
    ((sum * 100.0) as usize) % words
}

/// Name stem without the id, e.g. "CalmNet".
pub fn name_stem(genes: &[f64; NUM_GENES]) -> String {
    let (front, back) = genes.split_at(NUM_GENES / 2);
    let prefix = PREFIXES[word_index(front, PREFIXES.len())];
    let suffix = SUFFIXES[word_index(back, SUFFIXES.len())];
    format!("{}{}", prefix, suffix)
}

/// Derive the display name for a genotype and id.
///
/// Pure function of its inputs.
pub fn derive_name(genes: &[f64; NUM_GENES], id: &str) -> String {
    format!("{}-{}", name_stem(genes), id)
}
