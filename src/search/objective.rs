/// Score a candidate parameter vector; lower is better.
///
/// Implementations may talk to the flight-plan collaborator while scoring,
/// hence `&mut self`, but must leave it as they found it before returning.
pub trait Objective {
    fn score(&mut self, params: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: FnMut(&[f64]) -> f64,
{
    fn score(&mut self, params: &[f64]) -> f64 {
        self(params)
    }
}

/// An objective that can tell the current mission time.
pub trait Timed {
    fn now(&self) -> f64;
}

/// Score reported for candidates that can no longer be flown.
pub const STALE_SCORE: f64 = f64::MAX;

/// Wraps an objective whose first parameter is a maneuver epoch and rejects
/// candidates that would be in the past (or too close to it) by the time they
/// could be executed.
#[derive(Debug, Clone)]
pub struct StalenessGuard<O> {
    inner: O,
    margin: f64,
}

impl<O> StalenessGuard<O> {
    pub fn new(inner: O, margin: f64) -> Self {
        Self { inner, margin }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Objective + Timed> Objective for StalenessGuard<O> {
    fn score(&mut self, params: &[f64]) -> f64 {
        match params.first() {
            Some(&epoch) if epoch >= self.inner.now() + self.margin => self.inner.score(params),
            _ => STALE_SCORE,
        }
    }
}

impl<O: Timed> Timed for StalenessGuard<O> {
    fn now(&self) -> f64 {
        self.inner.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        now: f64,
        value: f64,
        calls: usize,
    }

    impl Objective for Fixed {
        fn score(&mut self, _params: &[f64]) -> f64 {
            self.calls += 1;
            self.value
        }
    }

    impl Timed for Fixed {
        fn now(&self) -> f64 {
            self.now
        }
    }

    #[test]
    fn closures_are_objectives() {
        let mut f = |p: &[f64]| p.iter().sum::<f64>();
        assert_eq!(f.score(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn stale_epoch_scores_sentinel() {
        let mut guard = StalenessGuard::new(Fixed { now: 1000.0, value: -5.0, calls: 0 }, 15.0);
        assert_eq!(guard.score(&[1014.9, 0.0, 0.0, 0.0]), STALE_SCORE);
        assert_eq!(guard.score(&[900.0, 0.0, 0.0, 0.0]), STALE_SCORE);
        assert_eq!(guard.inner().calls, 0, "stale candidates must not reach the inner score");
    }

    #[test]
    fn fresh_epoch_passes_through() {
        let mut guard = StalenessGuard::new(Fixed { now: 1000.0, value: -5.0, calls: 0 }, 15.0);
        assert_eq!(guard.score(&[1015.0, 0.0]), -5.0);
        assert_eq!(guard.score(&[5000.0]), -5.0);
        assert_eq!(guard.into_inner().calls, 2);
    }

    #[test]
    fn empty_vector_is_stale() {
        let mut guard = StalenessGuard::new(Fixed { now: 0.0, value: 1.0, calls: 0 }, 15.0);
        assert_eq!(guard.score(&[]), STALE_SCORE);
    }
}
