//! Interval-halving root search shared by the rate, cash-flow and year-end solvers

/// Which half of the interval the next guess should come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    /// Guess was too low: move the lower bound up to it
    Raise,
    /// Guess was too high: move the upper bound down to it
    Lower,
}

/// Converged guess and the number of probes it took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub value: f64,
    pub iterations: u32,
}

/// Why a bisection stopped without converging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BisectionError {
    /// The divergence predicate fired; carries the guess being probed
    Diverged { guess: f64 },
    /// The iteration cap was reached
    Exhausted { iterations: u32 },
}

/// Search interval, stopping width and iteration cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisection {
    pub min: f64,
    pub max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Bisection {
    pub fn new(min: f64, max: f64, tolerance: f64) -> Self {
        Self {
            min,
            max,
            tolerance,
            max_iterations: 200,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Halve the interval until it is narrower than the tolerance
    ///
    /// `probe` evaluates a guess and says which way to move. `diverged` sees
    /// the interval before each probe and aborts the search when it returns
    /// true. The converged value is the last guess probed.
    pub fn solve<P, D>(&self, mut probe: P, diverged: D) -> Result<Convergence, BisectionError>
    where
        P: FnMut(f64) -> Steer,
        D: Fn(f64, f64) -> bool,
    {
        let (mut min, mut max) = (self.min, self.max);
        let mut guess = (min + max) / 2.0;
        let mut iterations = 0;

        while max - min > self.tolerance {
            if iterations >= self.max_iterations {
                return Err(BisectionError::Exhausted { iterations });
            }
            iterations += 1;
            guess = (min + max) / 2.0;

            if diverged(min, max) {
                return Err(BisectionError::Diverged { guess });
            }

            match probe(guess) {
                Steer::Raise => min = guess,
                Steer::Lower => max = guess,
            }
        }

        Ok(Convergence { value: guess, iterations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn never(_: f64, _: f64) -> bool {
        false
    }

    #[test]
    fn test_finds_square_root() {
        let search = Bisection::new(0.0, 10.0, 1e-9);
        let result = search
            .solve(|x| if x * x < 2.0 { Steer::Raise } else { Steer::Lower }, never)
            .unwrap();
        assert_abs_diff_eq!(result.value, 2f64.sqrt(), epsilon = 1e-8);
        assert!(result.iterations > 30);
    }

    #[test]
    fn test_divergence_predicate_aborts() {
        let search = Bisection::new(-1.0, 1.0, 1e-9);
        // Root beyond the interval: the lower bound creeps up to the edge
        let err = search
            .solve(|_| Steer::Raise, |min, _| min > 0.99)
            .unwrap_err();
        match err {
            BisectionError::Diverged { guess } => assert!(guess > 0.99),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_iteration_cap() {
        let search = Bisection::new(0.0, 1.0, 1e-12).with_max_iterations(5);
        let err = search.solve(|_| Steer::Lower, never).unwrap_err();
        assert_eq!(err, BisectionError::Exhausted { iterations: 5 });
    }

    #[test]
    fn test_already_narrow_interval_returns_midpoint() {
        let search = Bisection::new(1.0, 1.0, 1e-6);
        let result = search.solve(|_| Steer::Raise, never).unwrap();
        assert_eq!(result, Convergence { value: 1.0, iterations: 0 });
    }
}
