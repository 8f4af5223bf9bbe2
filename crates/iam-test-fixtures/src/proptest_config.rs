//! Shared proptest configuration
//!
//! `PROPTEST_CASES` overrides the default case count:
//!
//! ```bash
//! PROPTEST_CASES=500 cargo test
//! ```

use proptest::test_runner::Config as ProptestConfig;

pub const DEFAULT_PROPTEST_CASES: u32 = 50;

/// Number of cases to run, from `PROPTEST_CASES` or [`DEFAULT_PROPTEST_CASES`]
#[must_use]
pub fn test_cases() -> u32 {
    std::env::var("PROPTEST_CASES").ok().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PROPTEST_CASES)
}

#[must_use]
pub fn proptest_config() -> ProptestConfig {
    ProptestConfig::with_cases(test_cases())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proptest_config_has_cases() {
        assert!(test_cases() > 0);
        assert!(proptest_config().cases > 0);
    }
}
