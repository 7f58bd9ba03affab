//! Mutation operators for chromosome evolution
//!
//! Gaussian point mutation: each gene independently, with probability
//! `rate`, gets N(0, strength²) noise and is clamped back into
//! `[gene floor, 1.0]`.

use pongevo_core::{gene_floor, Chromosome, Genes};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::EvolutionConfig;

/// Mutate a gene vector in place.
///
/// # Returns
/// Number of genes that received noise
pub fn mutate_genes<R: Rng>(genes: &mut Genes, rate: f64, strength: f64, rng: &mut R) -> usize {
    let mut mutated = 0;

    for (i, gene) in genes.iter_mut().enumerate() {
        if rng.gen::<f64>() < rate {
            let z: f64 = rng.sample(StandardNormal);
            *gene = (*gene + z * strength).clamp(gene_floor(i), 1.0);
            mutated += 1;
        }
    }

    mutated
}

/// Apply Gaussian mutation to a chromosome.
///
/// The genotype changes, so the name is re-derived through `set_genes`.
pub fn mutate<R: Rng>(chromosome: &mut Chromosome, config: &EvolutionConfig, rng: &mut R) -> usize {
    let mut genes = *chromosome.genes();
    let mutated = mutate_genes(&mut genes, config.mutation_rate, config.mutation_strength, rng);
    chromosome.set_genes(genes);
    mutated
}
