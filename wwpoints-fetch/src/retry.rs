//! Re-authentication policy for poll cycles.

/// How many times one cycle may log in again after the service rejects its session.
///
/// Only authentication rejections are retried inside a cycle. Transient
/// failures wait for the next scheduled cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReauthPolicy {
    /// Maximum re-login + refetch rounds per cycle.
    pub max_reauth_attempts: u32,
}

impl ReauthPolicy {
    /// Creates a policy with the given bound.
    pub fn new(max_reauth_attempts: u32) -> Self {
        Self {
            max_reauth_attempts,
        }
    }

    /// Disables re-login within a cycle.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Returns true if another re-login is allowed after `attempts_made`.
    pub fn allows(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_reauth_attempts
    }
}

impl Default for ReauthPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_exactly_one() {
        let policy = ReauthPolicy::default();
        assert!(policy.allows(0));
        assert!(!policy.allows(1));
    }

    #[test]
    fn test_no_retry() {
        assert!(!ReauthPolicy::no_retry().allows(0));
    }
}
