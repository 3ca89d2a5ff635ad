//! Common test utilities for mogreps-ingest.
//!
//! This module provides shared fixtures and assertions for the integration tests.

// Re-export all common test utilities
pub mod assertions;
pub mod test_data;
