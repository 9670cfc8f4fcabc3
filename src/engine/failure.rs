use rand::Rng;

/// Injectable failure strategy for reservation attempts. Production uses
/// `RandomFailure`; tests substitute deterministic policies.
pub trait FailurePolicy: Send + Sync {
    /// One fresh draw per call. Repeated calls are independent trials.
    fn should_fail(&self) -> bool;
}

/// Fails with the given probability on every call (independent Bernoulli
/// trials), simulating transient server errors.
pub struct RandomFailure {
    rate: f64,
}

impl RandomFailure {
    pub fn new(rate: f64) -> Self {
        RandomFailure {
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self) -> bool {
        rand::thread_rng().gen::<f64>() < self.rate
    }
}

/// Never fails. Used in tests and for deployments with injection disabled.
pub struct NoFailure;

impl FailurePolicy for NoFailure {
    fn should_fail(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_fails() {
        let policy = RandomFailure::new(0.0);
        assert!((0..1000).all(|_| !policy.should_fail()));
    }

    #[test]
    fn full_rate_always_fails() {
        let policy = RandomFailure::new(1.0);
        assert!((0..1000).all(|_| policy.should_fail()));
    }

    #[test]
    fn rate_is_clamped_to_unit_interval() {
        assert!(RandomFailure::new(5.0).should_fail());
        assert!(!RandomFailure::new(-1.0).should_fail());
    }
}
