use rand::Rng;

use super::fitness::is_penalized;
use crate::quantization::{QuantizationTable, BLOCK_SIZE};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopulationElement {
    pub table: QuantizationTable,
    pub fitness: f64,
}

impl PopulationElement {
    pub fn unscored(table: QuantizationTable) -> Self {
        PopulationElement {
            table,
            fitness: f64::INFINITY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Population {
    members: Vec<PopulationElement>,
}

impl Population {
    pub fn new(tables: impl IntoIterator<Item = QuantizationTable>) -> Self {
        Population {
            members: tables.into_iter().map(PopulationElement::unscored).collect(),
        }
    }

    /// The all-ones baseline first, then the `seeds` that fit, then random
    /// tables with entries in `1..=initial_max`.
    pub fn initial<R: Rng>(
        size: usize,
        seeds: &[QuantizationTable],
        initial_max: u8,
        rng: &mut R,
    ) -> Self {
        let mut tables = Vec::with_capacity(size);
        tables.push(QuantizationTable::baseline());
        tables.extend(seeds.iter().take(size.saturating_sub(1)));
        while tables.len() < size {
            tables.push(random_table(initial_max, rng));
        }
        Self::new(tables)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[PopulationElement] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [PopulationElement] {
        &mut self.members
    }

    /// Ascending by fitness; equal scores keep their order.
    pub fn sort(&mut self) {
        self.members.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
    }

    /// Only meaningful after [`Population::sort`].
    pub fn best(&self) -> Option<&PopulationElement> {
        self.members.first()
    }

    /// Highest fitness among members without the penalty, falling back to
    /// the best member.
    pub fn worst_unpenalized(&self) -> Option<&PopulationElement> {
        self.members
            .iter()
            .filter(|member| !is_penalized(member.fitness))
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .or_else(|| self.best())
    }

    pub fn elites(&self, count: usize) -> &[PopulationElement] {
        &self.members[..count.min(self.members.len())]
    }
}

fn random_table<R: Rng>(initial_max: u8, rng: &mut R) -> QuantizationTable {
    let mut entries = [0_u8; BLOCK_SIZE];
    for entry in entries.iter_mut() {
        *entry = rng.random_range(1..=initial_max.max(1));
    }
    QuantizationTable::new(entries).unwrap_or_else(|_| QuantizationTable::baseline())
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::{Population, PopulationElement};
    use crate::quantization::presets::SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE;
    use crate::quantization::QuantizationTable;

    #[test]
    fn initial_population_layout() {
        let mut rng = Pcg32::seed_from_u64(7);
        let preset = QuantizationTable::new(SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE).unwrap();
        let population = Population::initial(10, &[preset], 64, &mut rng);
        assert_eq!(population.len(), 10);
        assert_eq!(population.members()[0].table, QuantizationTable::baseline());
        assert_eq!(population.members()[1].table, preset);
        for member in &population.members()[2..] {
            assert!(member.table.entries().iter().all(|&e| (1..=64).contains(&e)));
        }
    }

    #[test]
    fn sort_is_ascending_and_stable() {
        let tables = [1_u8, 2, 3, 4].map(|v| QuantizationTable::new([v; 64]).unwrap());
        let mut population = Population::new(tables);
        for (member, fitness) in population.members_mut().iter_mut().zip([3.0, 1.0, 3.0, 0.5]) {
            member.fitness = fitness;
        }
        population.sort();
        let order: Vec<u8> = population.members().iter().map(|m| m.table.entry(0)).collect();
        assert_eq!(order, vec![4, 2, 1, 3]);
    }

    #[test]
    fn worst_skips_penalized_members() {
        let mut population = Population::new([QuantizationTable::baseline(); 3]);
        for (member, fitness) in population.members_mut().iter_mut().zip([4.0, 6.0, 1005.0]) {
            member.fitness = fitness;
        }
        population.sort();
        assert_eq!(population.worst_unpenalized().map(|m| m.fitness), Some(6.0));
    }

    #[test]
    fn unscored_members_sort_last() {
        let mut population = Population::new([QuantizationTable::baseline(); 2]);
        population.members_mut()[1] = PopulationElement {
            table: QuantizationTable::baseline(),
            fitness: 2.0,
        };
        population.sort();
        assert_eq!(population.best().map(|m| m.fitness), Some(2.0));
    }
}
