use super::EvaluationResult;
use crate::arena::SlotRegion;

/// Sums per-block errors with a folding accumulator: whenever the running
/// partial sum reaches `block_count` it is moved into the total in steps of
/// `block_count`, keeping the partial sum bounded.
pub fn fold_errors<I>(errors: I, block_count: u64) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let mut partial = 0_u64;
    let mut total = 0_u64;
    for error in errors {
        partial += error;
        if partial >= block_count {
            partial -= block_count;
            total += block_count;
        }
    }
    total + partial
}

pub fn sum_bits<I>(bits: I) -> u64
where
    I: IntoIterator<Item = u32>,
{
    bits.into_iter().map(u64::from).sum()
}

pub fn reduce(region: &SlotRegion) -> EvaluationResult {
    EvaluationResult {
        bits: sum_bits(region.iter_bits()),
        error: fold_errors(region.iter_errors(), region.len() as u64),
    }
}

#[cfg(test)]
mod test {
    use super::{fold_errors, reduce, sum_bits};
    use crate::arena::ScratchArena;

    #[test]
    fn folding_matches_plain_sum() {
        let n = 37_u64;
        let errors = vec![n; n as usize];
        assert_eq!(fold_errors(errors, n), n * n);
    }

    #[test]
    fn folding_uneven_errors() {
        let errors = [0, 500, 1, 7, 12_345, 3];
        assert_eq!(fold_errors(errors, errors.len() as u64), errors.iter().sum::<u64>());
    }

    #[test]
    fn empty_input() {
        assert_eq!(fold_errors(Vec::new(), 0), 0);
        assert_eq!(sum_bits(Vec::new()), 0);
    }

    #[test]
    fn reduce_region() {
        let mut arena = ScratchArena::with_capacity(3);
        let region = arena.allocate(3).unwrap();
        region.store(0, 4, 10);
        region.store(1, u32::MAX, 20);
        region.store(2, 6, 30);
        let result = reduce(&region);
        assert_eq!(result.bits, u32::MAX as u64 + 10);
        assert_eq!(result.error, 60);
    }
}
