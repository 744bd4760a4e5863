//! Compression policy.

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionDecision {
    pub compress: bool,
}

/// Compress once the stored turn count is strictly above the threshold.
pub fn decide(turn_count: usize, threshold: usize) -> CompressionDecision {
    CompressionDecision {
        compress: turn_count > threshold,
    }
}
