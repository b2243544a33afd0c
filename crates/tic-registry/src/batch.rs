//! Per-item outcomes of batch operations.
//!
//! A batch never aborts on a failing item: every requested id gets a row,
//! in request order, either with a success detail or with the error text.

use serde::{Deserialize, Serialize};

use tic_core::TicError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemResult<K> {
    pub id: K,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<K> BatchItemResult<K> {
    pub fn succeeded(id: K, detail: impl Into<String>) -> Self {
        Self {
            id,
            success: true,
            detail: Some(detail.into()),
            error: None,
        }
    }

    pub fn failed(id: K, error: &TicError) -> Self {
        Self {
            id,
            success: false,
            detail: None,
            error: Some(error.to_string()),
        }
    }
}

/// Success and failure counts over a batch.
pub fn tally<K>(results: &[BatchItemResult<K>]) -> (usize, usize) {
    let succeeded = results.iter().filter(|r| r.success).count();
    (succeeded, results.len() - succeeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_and_shape() {
        let results = vec![
            BatchItemResult::succeeded(1, "basic-info"),
            BatchItemResult::failed(2, &TicError::not_found("change record", 2)),
            BatchItemResult::succeeded(3, "status"),
        ];
        assert_eq!(tally(&results), (2, 1));

        let value = serde_json::to_value(&results[1]).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "change record not found: 2");
        assert!(value.get("detail").is_none());
    }
}
