//! Property-based tests for fractions and matrices.
