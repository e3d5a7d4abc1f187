/*!
 * Tests for error types and conversions
 */

use weblingo::errors::{ProviderError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "Internal error".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("Internal error"));
}

#[test]
fn test_providerError_kind_shouldNameVariant() {
    assert_eq!(ProviderError::Timeout("slow".to_string()).kind(), "Timeout");
    assert_eq!(ProviderError::RateLimitExceeded("429".to_string()).kind(), "RateLimitExceeded");
    assert_eq!(
        ProviderError::ApiError {
            status_code: 400,
            message: String::new()
        }
        .kind(),
        "ApiError"
    );
}

#[test]
fn test_translationError_missingTokenMap_shouldNameItem() {
    let error = TranslationError::MissingTokenMap("t_000042".to_string());
    assert!(format!("{}", error).contains("t_000042"));
}

#[test]
fn test_translationError_cache_shouldCarryReason() {
    let error = TranslationError::Cache("disk full".to_string());
    assert_eq!(format!("{}", error), "Translation cache error: disk full");
}
