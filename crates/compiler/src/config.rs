//! Compiler configuration.
//!
//! Most programs never need this -- [`crate::compile_source`] and friends
//! build a default [`CompilerConfig`] internally. It exists for embedders
//! that want to size the address space differently or fail fast on the
//! first error instead of collecting every one (§7).

/// Tunables for one compilation.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Cells available per segment before allocation reports a semantic
    /// error. The object-file format and the segment base addresses are
    /// fixed regardless of this value; only the exhaustion threshold moves.
    pub segment_size: i64,

    /// Stop at the first semantic error instead of collecting every one
    /// found during Pass 2. §7 collects by default so a single compile can
    /// report everything wrong with a program at once.
    pub stop_at_first_error: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            segment_size: patito_core::SEGMENT_SIZE,
            stop_at_first_error: false,
        }
    }
}

impl CompilerConfig {
    /// Create the default configuration (§4.2 segment size, collect-all
    /// error reporting).
    pub fn new() -> Self {
        CompilerConfig::default()
    }

    /// Override the per-segment cell budget (builder pattern).
    pub fn with_segment_size(mut self, size: i64) -> Self {
        self.segment_size = size;
        self
    }

    /// Stop at the first semantic error instead of collecting all of them.
    pub fn with_stop_at_first_error(mut self, stop: bool) -> Self {
        self.stop_at_first_error = stop;
        self
    }
}
