use regionstats_common::{RegionStatsError, REQUIRED_FIELDS_MESSAGE};

#[test]
fn test_missing_fields_display() {
    let err = RegionStatsError::MissingFields;
    assert_eq!(err.to_string(), "regions and threshold_ms are required");
}

#[test]
fn test_missing_fields_matches_constant() {
    assert_eq!(RegionStatsError::MissingFields.to_string(), REQUIRED_FIELDS_MESSAGE);
}

#[test]
fn test_malformed_body_display() {
    let err = RegionStatsError::MalformedBody("expected value at line 1 column 1".to_string());
    assert_eq!(err.to_string(), "invalid request body: expected value at line 1 column 1");
}

#[test]
fn test_error_equality() {
    let a = RegionStatsError::MalformedBody("x".to_string());
    let b = RegionStatsError::MalformedBody("x".to_string());
    let c = RegionStatsError::MalformedBody("y".to_string());

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, RegionStatsError::MissingFields);
}
