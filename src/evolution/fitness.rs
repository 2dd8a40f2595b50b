use crate::evaluation::EvaluationResult;

/// Added to the fitness of a candidate that reconstructs better than the
/// all-ones baseline, which sorts it to the bottom of the population.
pub const PENALTY: f64 = 1000.0;

/// Fitness values above this carry the penalty.
pub const PENALIZED_ABOVE: f64 = 900.0;

/// `value / baseline`, where a zero baseline yields 1.0 for a zero value
/// and the value itself otherwise.
pub fn ratio(value: u64, baseline: u64) -> f64 {
    if baseline == 0 {
        return if value == 0 { 1.0 } else { value as f64 };
    }
    value as f64 / baseline as f64
}

/// Lower is better.
#[derive(Clone, Copy, Debug)]
pub struct FitnessFunction {
    baseline: EvaluationResult,
    weight: f64,
}

impl FitnessFunction {
    pub fn new(baseline: EvaluationResult, weight: f64) -> Self {
        FitnessFunction { baseline, weight }
    }

    pub fn compression_ratio(&self, result: &EvaluationResult) -> f64 {
        ratio(result.bytes(), self.baseline.bytes())
    }

    pub fn error_ratio(&self, result: &EvaluationResult) -> f64 {
        ratio(result.error, self.baseline.error)
    }

    pub fn score(&self, result: &EvaluationResult) -> f64 {
        let compression_ratio = self.compression_ratio(result);
        let error_ratio = self.error_ratio(result);
        let mut fitness = error_ratio + self.weight * (1.0 + compression_ratio);
        if error_ratio < 1.0 {
            fitness += PENALTY;
        }
        log::debug!(
            "compression {:.4}, error {:.4}, fitness {:.6}",
            compression_ratio,
            error_ratio,
            fitness
        );
        fitness
    }
}

pub fn is_penalized(fitness: f64) -> bool {
    fitness > PENALIZED_ABOVE
}

#[cfg(test)]
mod test {
    use super::{is_penalized, ratio, FitnessFunction, PENALTY};
    use crate::evaluation::EvaluationResult;

    const BASELINE: EvaluationResult = EvaluationResult {
        bits: 8000,
        error: 500,
    };

    fn check_deviation(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {}, was {}",
            expected,
            actual
        );
    }

    #[test]
    fn baseline_against_itself() {
        let fitness = FitnessFunction::new(BASELINE, 2.0);
        assert_eq!(fitness.error_ratio(&BASELINE), 1.0);
        assert_eq!(fitness.compression_ratio(&BASELINE), 1.0);
        check_deviation(5.0, fitness.score(&BASELINE));
    }

    #[test]
    fn lower_error_is_penalized() {
        let fitness = FitnessFunction::new(BASELINE, 2.0);
        let better = EvaluationResult {
            bits: 8000,
            error: 499,
        };
        let score = fitness.score(&better);
        assert!(score >= PENALTY);
        assert!(is_penalized(score));
    }

    #[test]
    fn smaller_output_scores_lower() {
        let fitness = FitnessFunction::new(BASELINE, 2.0);
        let smaller = EvaluationResult {
            bits: 4000,
            error: 1000,
        };
        // 2.0 + 2.0 * (1.0 + 0.5)
        check_deviation(5.0, fitness.score(&smaller));
        let larger = EvaluationResult {
            bits: 8000,
            error: 1000,
        };
        assert!(fitness.score(&smaller) < fitness.score(&larger));
    }

    #[test]
    fn zero_baseline() {
        assert_eq!(ratio(0, 0), 1.0);
        assert_eq!(ratio(7, 0), 7.0);
        assert_eq!(ratio(3, 4), 0.75);
    }
}
