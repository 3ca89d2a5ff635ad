//! Assertion utilities for testing.

use mogreps_ingest::Bounds;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Assert that two floating-point values are approximately equal.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert the spatial part of a bounds record.
///
/// # Panics
///
/// Panics if any spatial key is unset or differs from the expected value.
pub fn assert_spatial_bounds(bounds: &Bounds, left: f64, right: f64, bottom: f64, top: f64) {
    let keys = [
        ("left", bounds.left, left),
        ("right", bounds.right, right),
        ("bottom", bounds.bottom, bottom),
        ("top", bounds.top, top),
    ];
    for (name, actual, expected) in keys {
        let actual = actual.unwrap_or_else(|| panic!("bound {} is not set", name));
        assert_approx_eq(actual, expected, None);
    }
}
