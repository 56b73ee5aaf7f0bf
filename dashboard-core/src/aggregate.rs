//! Order-preserving collection of batch results.
//!
//! The runner's barrier has already established that every slot is done;
//! these helpers only split successes from failures, leaving the decision
//! to show or hide failures to the presentation layer.

use crate::error::{FetchError, FetchResult};

/// One failed slot of a batch, keyed by its submission index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub index: usize,
    pub error: FetchError,
}

/// Keep the successful payloads, in input order.
pub fn collect<T>(results: Vec<FetchResult<T>>) -> Vec<T> {
    results.into_iter().filter_map(Result::ok).collect()
}

/// Split a batch into its successful payloads and its failures, both in
/// input order. Nothing is suppressed: every error slot comes back with
/// the index it was submitted under.
pub fn collect_with_failures<T>(results: Vec<FetchResult<T>>) -> (Vec<T>, Vec<Failure>) {
    let mut payloads = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(payload) => payloads.push(payload),
            Err(error) => failures.push(Failure { index, error }),
        }
    }

    (payloads, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_keeps_successes_in_input_order() {
        let results: Vec<FetchResult<u32>> = vec![
            Ok(10),
            Err(FetchError::transport("down")),
            Ok(30),
        ];

        assert_eq!(collect(results), vec![10, 30]);
    }

    #[test]
    fn failures_carry_their_submission_index() {
        let results: Vec<FetchResult<&str>> = vec![
            Ok("bitcoin"),
            Err(FetchError::not_found("coin", "invalidcoin")),
            Ok("ethereum"),
        ];

        let (payloads, failures) = collect_with_failures(results);

        assert_eq!(payloads, vec!["bitcoin", "ethereum"]);
        assert_eq!(
            failures,
            vec![Failure { index: 1, error: FetchError::not_found("coin", "invalidcoin") }]
        );
    }

    #[test]
    fn an_all_failure_batch_yields_no_payloads_and_all_failures() {
        let results: Vec<FetchResult<u32>> =
            vec![Err(FetchError::transport("a")), Err(FetchError::transport("b"))];

        let (payloads, failures) = collect_with_failures(results);

        assert!(payloads.is_empty());
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[1].index, 1);
    }
}
