use std::io;
use transit_ecm::EcmError;
use transit_math::MathError;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(EcmError::from(io_error), EcmError::IoError(_)));

    let math_error = MathError::SingularMatrix { rank: 2, columns: 3 };
    assert!(matches!(
        EcmError::from(math_error),
        EcmError::MathError(MathError::SingularMatrix { rank: 2, columns: 3 })
    ));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(EcmError::from(json_error), EcmError::ConfigError(_)));
}

#[test]
fn test_error_display() {
    let error = EcmError::SearchExhaustionError { combinations: 27 };
    let message = error.to_string();
    assert!(message.contains("27"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let message = EcmError::from(io_error).to_string();
    assert!(message.contains("IO error"));
    assert!(message.contains("permission denied"));

    let error = EcmError::ValidationError("Insufficient data".to_string());
    assert_eq!(error.to_string(), "Validation error: Insufficient data");
}
