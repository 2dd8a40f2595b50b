use rand::Rng;

use super::population::PopulationElement;
use crate::quantization::{QuantizationTable, BLOCK_SIZE, ZIG_ZAG_ORDERED_BLOCK_INDEXES};

/// Table entries widened so a perturbation can leave the valid range
/// before [`repair`] brings it back.
pub type Genes = [i16; BLOCK_SIZE];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Mutation,
    Crossover,
    Reproduction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatorWeights {
    pub mutation: u32,
    pub crossover: u32,
    pub reproduction: u32,
}

impl OperatorWeights {
    pub fn total(&self) -> u32 {
        self.mutation + self.crossover + self.reproduction
    }

    pub fn choose<R: Rng>(&self, rng: &mut R) -> Operator {
        let roll = rng.random_range(0..self.total().max(1));
        if roll < self.mutation {
            Operator::Mutation
        } else if roll < self.mutation + self.crossover {
            Operator::Crossover
        } else {
            Operator::Reproduction
        }
    }
}

pub fn genes_of(table: &QuantizationTable) -> Genes {
    table.entries().map(i16::from)
}

/// Perturbs each entry with probability `rate` by a delta in
/// `-wiggle..wiggle`. At least one entry is always touched.
pub fn mutate<R: Rng>(parent: &QuantizationTable, rate: f32, wiggle: u8, rng: &mut R) -> Genes {
    let mut genes = genes_of(parent);
    let mut touched = false;
    for gene in genes.iter_mut() {
        if rng.random::<f32>() < rate {
            *gene += delta(wiggle, rng);
            touched = true;
        }
    }
    if !touched {
        let index = rng.random_range(0..BLOCK_SIZE);
        genes[index] += delta(wiggle, rng);
    }
    genes
}

fn delta<R: Rng>(wiggle: u8, rng: &mut R) -> i16 {
    let wiggle = i16::from(wiggle.max(1));
    rng.random_range(-wiggle..wiggle)
}

/// Uniform crossover in zig-zag order: every position comes from one of
/// the two parents, picked independently.
pub fn crossover<R: Rng>(first: &QuantizationTable, second: &QuantizationTable, rng: &mut R) -> Genes {
    let mut genes = [0_i16; BLOCK_SIZE];
    for &index in ZIG_ZAG_ORDERED_BLOCK_INDEXES.iter() {
        let parent = if rng.random::<bool>() { first } else { second };
        genes[index] = i16::from(parent.entry(index));
    }
    genes
}

/// Two distinct parents out of the best `max(elites, 2)` members.
pub fn pick_parents<'a, R: Rng>(
    sorted: &'a [PopulationElement],
    elites: usize,
    rng: &mut R,
) -> (&'a QuantizationTable, &'a QuantizationTable) {
    let pool = elites.max(2).min(sorted.len());
    if pool < 2 {
        return (&sorted[0].table, &sorted[0].table);
    }
    let first = rng.random_range(0..pool);
    let mut second = rng.random_range(0..pool - 1);
    if second >= first {
        second += 1;
    }
    (&sorted[first].table, &sorted[second].table)
}

/// Forces every non-positive entry to `1 + rand % wiggle` and caps entries
/// at 255, then builds the table.
pub fn repair<R: Rng>(mut genes: Genes, wiggle: u8, rng: &mut R) -> QuantizationTable {
    for gene in genes.iter_mut() {
        if *gene <= 0 {
            *gene = 1 + rng.random_range(0..i16::from(wiggle.max(1)));
        }
    }
    let entries = genes.map(|gene| gene.min(u8::MAX as i16) as u8);
    QuantizationTable::new(entries).unwrap_or_else(|_| unreachable!("repaired entries are positive"))
}
