//! Chromosome - Paddle controller genotype plus match statistics

use crate::naming::derive_name;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of genes in every chromosome
pub const NUM_GENES: usize = 6;

/// Gene vector (all values in [floor, 1.0])
pub type Genes = [f64; NUM_GENES];

// ============================================================================
// GENES
// ============================================================================

/// Named gene positions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    /// How quickly it responds (0=slow, 1=instant)
    ReactionTime = 0,
    /// How far ahead it predicts (0=none, 1=full trajectory)
    PredictionDepth = 1,
    /// Track the ball vs stay centered (0=defensive, 1=aggressive)
    Aggression = 2,
    /// Random targeting error (0=deterministic, 1=chaotic)
    NoiseTolerance = 3,
    /// Max movement speed multiplier (0=slow, 1=fast)
    SpeedScaling = 4,
    /// Weight of ball velocity in targeting
    Anticipation = 5,
}

impl Gene {
    pub const ALL: [Gene; NUM_GENES] = [
        Gene::ReactionTime,
        Gene::PredictionDepth,
        Gene::Aggression,
        Gene::NoiseTolerance,
        Gene::SpeedScaling,
        Gene::Anticipation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Gene::ReactionTime => "reaction_time",
            Gene::PredictionDepth => "prediction_depth",
            Gene::Aggression => "aggression",
            Gene::NoiseTolerance => "noise_tolerance",
            Gene::SpeedScaling => "speed_scaling",
            Gene::Anticipation => "anticipation",
        }
    }

    /// Lowest allowed value. Raised floors keep every individual playable.
    pub fn floor(self) -> f64 {
        match self {
            Gene::ReactionTime => 0.4,
            Gene::Aggression => 0.5,
            Gene::SpeedScaling => 0.6,
            _ => 0.0,
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.floor(), 1.0)
    }
}

/// Floor for the gene at `index`
pub fn gene_floor(index: usize) -> f64 {
    Gene::ALL.get(index).map_or(0.0, |g| g.floor())
}

// ============================================================================
// TRAITS
// ============================================================================

/// Named view of a gene vector, copied into the simulator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub reaction_time: f64,
    pub prediction_depth: f64,
    pub aggression: f64,
    pub noise_tolerance: f64,
    pub speed_scaling: f64,
    pub anticipation: f64,
}

impl Traits {
    pub fn from_genes(genes: &Genes) -> Self {
        Self {
            reaction_time: genes[Gene::ReactionTime.index()],
            prediction_depth: genes[Gene::PredictionDepth.index()],
            aggression: genes[Gene::Aggression.index()],
            noise_tolerance: genes[Gene::NoiseTolerance.index()],
            speed_scaling: genes[Gene::SpeedScaling.index()],
            anticipation: genes[Gene::Anticipation.index()],
        }
    }
}

// ============================================================================
// CHROMOSOME
// ============================================================================

/// A paddle AI's genetic makeup and its record in the current tournament
#[derive(Clone, Debug)]
pub struct Chromosome {
    genes: Genes,
    id: String,
    name: String,
    pub generation: u32,
    pub fitness: f64,
    pub wins: u32,
    pub losses: u32,
    pub points_scored: u32,
    pub points_conceded: u32,
}

impl Chromosome {
    /// Create a random chromosome.
    ///
    /// All six genes are sampled uniformly first, then the genes with a
    /// raised floor are rescaled into `[floor, 1.0)`.
    pub fn random<R: Rng>(generation: u32, rng: &mut R) -> Self {
        let mut genes: Genes = [0.0; NUM_GENES];
        for g in genes.iter_mut() {
            *g = rng.gen::<f64>();
        }
        for gene in [Gene::Aggression, Gene::SpeedScaling, Gene::ReactionTime] {
            let floor = gene.floor();
            genes[gene.index()] = floor + genes[gene.index()] * (1.0 - floor);
        }
        Self::assemble(genes, generation, rng)
    }

    /// Create a chromosome with the given genes (clamped into range)
    pub fn with_genes<R: Rng>(genes: Genes, generation: u32, rng: &mut R) -> Self {
        Self::assemble(clamp_genes(genes), generation, rng)
    }

    fn assemble<R: Rng>(genes: Genes, generation: u32, rng: &mut R) -> Self {
        let id = new_id(rng);
        let name = derive_name(&genes, &id);
        Self {
            genes,
            id,
            name,
            generation,
            fitness: 0.0,
            wins: 0,
            losses: 0,
            points_scored: 0,
            points_conceded: 0,
        }
    }

    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    pub fn gene(&self, gene: Gene) -> f64 {
        self.genes[gene.index()]
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the genotype (clamped) and re-derive the display name
    pub fn set_genes(&mut self, genes: Genes) {
        self.genes = clamp_genes(genes);
        self.name = derive_name(&self.genes, &self.id);
    }

    pub fn traits(&self) -> Traits {
        Traits::from_genes(&self.genes)
    }

    pub fn reaction_time(&self) -> f64 {
        self.gene(Gene::ReactionTime)
    }

    pub fn prediction_depth(&self) -> f64 {
        self.gene(Gene::PredictionDepth)
    }

    pub fn aggression(&self) -> f64 {
        self.gene(Gene::Aggression)
    }

    pub fn noise_tolerance(&self) -> f64 {
        self.gene(Gene::NoiseTolerance)
    }

    pub fn speed_scaling(&self) -> f64 {
        self.gene(Gene::SpeedScaling)
    }

    pub fn anticipation(&self) -> f64 {
        self.gene(Gene::Anticipation)
    }

    /// Reset match statistics for a new tournament
    pub fn reset_stats(&mut self) {
        self.fitness = 0.0;
        self.wins = 0;
        self.losses = 0;
        self.points_scored = 0;
        self.points_conceded = 0;
    }

    pub fn snapshot(&self) -> ChromosomeSnapshot {
        ChromosomeSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            genes: self.genes.to_vec(),
            fitness: self.fitness,
            wins: self.wins,
            losses: self.losses,
            points_scored: self.points_scored,
            points_conceded: self.points_conceded,
            generation: self.generation,
            traits: Gene::ALL
                .iter()
                .map(|&g| (g.name().to_string(), self.gene(g)))
                .collect(),
        }
    }
}

/// Clamp every gene into `[floor, 1.0]`
pub fn clamp_genes(mut genes: Genes) -> Genes {
    for gene in Gene::ALL {
        genes[gene.index()] = gene.clamp(genes[gene.index()]);
    }
    genes
}

/// Short opaque id (8 hex chars)
fn new_id<R: Rng>(rng: &mut R) -> String {
    format!("{:08x}", rng.gen::<u32>())
}

/// Transferable form of a chromosome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChromosomeSnapshot {
    pub id: String,
    pub name: String,
    pub genes: Vec<f64>,
    pub fitness: f64,
    pub wins: u32,
    pub losses: u32,
    pub points_scored: u32,
    pub points_conceded: u32,
    pub generation: u32,
    pub traits: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::name_stem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_genes_respect_floors() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let c = Chromosome::random(0, &mut rng);
            for gene in Gene::ALL {
                let v = c.gene(gene);
                assert!(v >= gene.floor() && v <= 1.0, "{} = {}", gene.name(), v);
            }
        }
    }

    #[test]
    fn test_with_genes_clamps() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let c = Chromosome::with_genes([0.0, -0.5, 0.1, 2.0, 0.0, 0.5], 3, &mut rng);
        assert_eq!(c.reaction_time(), 0.4);
        assert_eq!(c.prediction_depth(), 0.0);
        assert_eq!(c.aggression(), 0.5);
        assert_eq!(c.noise_tolerance(), 1.0);
        assert_eq!(c.speed_scaling(), 0.6);
        assert_eq!(c.anticipation(), 0.5);
        assert_eq!(c.generation, 3);
    }

    #[test]
    fn test_id_is_short_hex() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let c = Chromosome::random(0, &mut rng);
        assert_eq!(c.id().len(), 8);
        assert!(c.id().chars().all(|ch| ch.is_ascii_hexdigit()));
        assert!(c.name().ends_with(c.id()));
    }

    #[test]
    fn test_set_genes_renames() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = Chromosome::with_genes([0.5, 0.2, 0.7, 0.1, 0.9, 0.3], 0, &mut rng);
        assert!(c.name().starts_with("HyperMind-"));

        c.set_genes([0.51, 0.2, 0.7, 0.1, 0.9, 0.3]);
        assert!(c.name().starts_with("ZenMind-"));
        assert_eq!(name_stem(c.genes()), "ZenMind");
    }

    #[test]
    fn test_reset_stats() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut c = Chromosome::random(0, &mut rng);
        c.wins = 3;
        c.losses = 1;
        c.points_scored = 17;
        c.points_conceded = 9;
        c.fitness = 397.0;

        c.reset_stats();

        assert_eq!((c.wins, c.losses, c.points_scored, c.points_conceded), (0, 0, 0, 0));
        assert_eq!(c.fitness, 0.0);
    }

    #[test]
    fn test_traits_match_genes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let c = Chromosome::random(0, &mut rng);
        let t = c.traits();
        assert_eq!(t.reaction_time, c.reaction_time());
        assert_eq!(t.prediction_depth, c.prediction_depth());
        assert_eq!(t.aggression, c.aggression());
        assert_eq!(t.noise_tolerance, c.noise_tolerance());
        assert_eq!(t.speed_scaling, c.speed_scaling());
        assert_eq!(t.anticipation, c.anticipation());
    }

    #[test]
    fn test_snapshot_serializes_traits() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let c = Chromosome::random(2, &mut rng);
        let json = serde_json::to_value(c.snapshot()).unwrap();

        assert_eq!(json["id"], c.id());
        assert_eq!(json["generation"], 2);
        assert_eq!(json["genes"].as_array().unwrap().len(), NUM_GENES);
        assert_eq!(json["traits"]["aggression"], c.aggression());
    }
}
