/*!
 * Tests for error types and conversions
 */

use thesisrag::errors::{AppError, ConversionError, ProviderError, StoreError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection timeout".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection timeout"));
}

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
fn test_providerError_fromStatus_shouldPickVariant() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(502, "gateway".to_string()),
        ProviderError::ApiError { status_code: 502, .. }
    ));
}

#[test]
fn test_conversionError_timedOut_shouldMentionSeconds() {
    let display = ConversionError::TimedOut(300).to_string();
    assert!(display.contains("300 seconds"));
}

#[test]
fn test_storeError_notIndexed_shouldSuggestIndexCommand() {
    let display = StoreError::NotIndexed("vector_store/index.db".to_string()).to_string();
    assert!(display.contains("vector_store/index.db"));
    assert!(display.contains("index command"));
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let error: AppError = ProviderError::ParseError("Invalid JSON".to_string()).into();
    let display = format!("{}", error);
    assert!(display.contains("Provider error"));
    assert!(display.contains("Invalid JSON"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknown() {
    let error: AppError = anyhow::anyhow!("boom").into();
    assert!(format!("{}", error).contains("boom"));
}
