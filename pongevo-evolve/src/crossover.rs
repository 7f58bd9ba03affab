//! Crossover operators for chromosome evolution
//!
//! Combines two parent chromosomes into two offspring: a single-point
//! split followed by independent per-gene swaps between the children.

use pongevo_core::{Chromosome, Genes, NUM_GENES};
use rand::Rng;

/// Single-point crossover of two gene vectors.
///
/// Child A takes `a` before `point` and `b` from `point` on; child B is
/// the complement.
pub fn single_point(a: &Genes, b: &Genes, point: usize) -> (Genes, Genes) {
    let point = point.min(NUM_GENES);
    let mut child_a = *a;
    let mut child_b = *b;
    child_a[point..].copy_from_slice(&b[point..]);
    child_b[point..].copy_from_slice(&a[point..]);
    (child_a, child_b)
}

/// Swap each gene between the two vectors with probability `swap_rate`.
///
/// # Returns
/// Number of genes swapped
pub fn swap_genes<R: Rng>(a: &mut Genes, b: &mut Genes, swap_rate: f64, rng: &mut R) -> usize {
    let mut swapped = 0;
    for i in 0..NUM_GENES {
        if rng.gen::<f64>() < swap_rate {
            std::mem::swap(&mut a[i], &mut b[i]);
            swapped += 1;
        }
    }
    swapped
}

/// Produce two offspring from two parents.
///
/// The split point is uniform over `1..NUM_GENES`, so each child always
/// inherits from both parents before the swap pass. Children get fresh
/// ids, derived names, zeroed stats and the given generation.
pub fn crossover<R: Rng>(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    generation: u32,
    swap_rate: f64,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let point = rng.gen_range(1..NUM_GENES);
    let (mut genes_a, mut genes_b) = single_point(parent_a.genes(), parent_b.genes(), point);
    swap_genes(&mut genes_a, &mut genes_b, swap_rate, rng);

    (
        Chromosome::with_genes(genes_a, generation, rng),
        Chromosome::with_genes(genes_b, generation, rng),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const A: Genes = [0.41, 0.11, 0.51, 0.12, 0.61, 0.13];
    const B: Genes = [0.91, 0.81, 0.92, 0.82, 0.93, 0.83];

    #[test]
    fn test_single_point_split() {
        let (a, b) = single_point(&A, &B, 2);
        assert_eq!(a, [0.41, 0.11, 0.92, 0.82, 0.93, 0.83]);
        assert_eq!(b, [0.91, 0.81, 0.51, 0.12, 0.61, 0.13]);
    }

    #[test]
    fn test_swap_rate_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (mut a, mut b) = (A, B);

        assert_eq!(swap_genes(&mut a, &mut b, 0.0, &mut rng), 0);
        assert_eq!((a, b), (A, B));

        assert_eq!(swap_genes(&mut a, &mut b, 1.0, &mut rng), NUM_GENES);
        assert_eq!((a, b), (B, A));
    }

    #[test]
    fn test_children_are_complementary() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pa = Chromosome::with_genes(A, 0, &mut rng);
        let pb = Chromosome::with_genes(B, 0, &mut rng);

        for _ in 0..50 {
            let (ca, cb) = crossover(&pa, &pb, 4, 0.1, &mut rng);
            for i in 0..NUM_GENES {
                let pair = (ca.genes()[i], cb.genes()[i]);
                assert!(pair == (A[i], B[i]) || pair == (B[i], A[i]), "gene {} lost", i);
            }
        }
    }

    #[test]
    fn test_children_mix_both_parents_without_swaps() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let pa = Chromosome::with_genes(A, 0, &mut rng);
        let pb = Chromosome::with_genes(B, 0, &mut rng);

        for _ in 0..50 {
            let (ca, _) = crossover(&pa, &pb, 1, 0.0, &mut rng);
            assert_eq!(ca.genes()[0], A[0]);
            assert_eq!(ca.genes()[NUM_GENES - 1], B[NUM_GENES - 1]);
        }
    }

    #[test]
    fn test_children_are_fresh() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut pa = Chromosome::with_genes(A, 2, &mut rng);
        pa.wins = 4;
        pa.fitness = 450.0;
        let pb = Chromosome::with_genes(B, 2, &mut rng);

        let (ca, cb) = crossover(&pa, &pb, 3, 0.1, &mut rng);

        assert_eq!(ca.generation, 3);
        assert_eq!(cb.generation, 3);
        assert_eq!(ca.wins, 0);
        assert_eq!(ca.fitness, 0.0);
        assert_ne!(ca.id(), pa.id());
        assert_ne!(ca.id(), cb.id());
    }
}
