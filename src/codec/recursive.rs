//! Repeated compression with a diminishing-returns stopping rule.
//!
//! Each step compresses the previous step's base64 output again. Odd steps
//! use GZIP, even steps request ZSTD (which degrades to GZIP unless a real
//! codec is registered). After every step past the first:
//!
//! 1. `current >= best * 1.1` (10% regression): stop, keep `best`
//! 2. `best - current < best * 0.05` (under 5% gain): stop, keep `best`
//! 3. otherwise `current` becomes `best` and the loop continues
//!
//! The first step is always kept, so the output carries at least one codec
//! layer for non-empty input.

use super::registry::CodecRegistry;
use super::{Algorithm, CodecWarning};
use crate::error::Result;

/// Hard upper bound on recursion depth
pub const MAX_DEPTH: u32 = 10;

/// Regression factor that stops recursion
const REGRESSION_FACTOR: f64 = 1.1;

/// Minimum relative gain a step must achieve to be kept
const MIN_GAIN: f64 = 0.05;

/// One compression step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionStep {
    /// Output size in bytes after this step
    pub size_bytes: usize,
    /// Algorithm requested for this step
    pub algorithm: Algorithm,
    /// Whether the step was kept
    pub accepted: bool,
}

/// Ordered record of the steps taken by one recursive compression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecursionTrace {
    steps: Vec<RecursionStep>,
}

impl RecursionTrace {
    /// All steps, including the rejected one that stopped the loop
    pub fn steps(&self) -> &[RecursionStep] {
        &self.steps
    }

    /// Number of steps run
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when nothing ran (empty input)
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, size_bytes: usize, algorithm: Algorithm, accepted: bool) {
        self.steps.push(RecursionStep {
            size_bytes,
            algorithm,
            accepted,
        });
    }
}

/// Output of [`RecursiveCompressor::compress`]
#[derive(Debug, Clone)]
pub struct RecursiveOutput {
    /// Best base64 payload found
    pub data: String,
    /// Codec layers present in `data`
    pub layers: u32,
    /// Steps taken
    pub trace: RecursionTrace,
    /// Degradations from kept steps
    pub warnings: Vec<CodecWarning>,
}

/// Algorithm requested for a 1-based step number
pub fn step_algorithm(step: u32) -> Algorithm {
    if step % 2 == 0 {
        Algorithm::Zstd
    } else {
        Algorithm::Gzip
    }
}

/// Clamp a requested depth to `1..=MAX_DEPTH`
pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(1, MAX_DEPTH)
}

/// Recursive compressor over a codec registry
#[derive(Debug, Clone, Default)]
pub struct RecursiveCompressor {
    registry: CodecRegistry,
}

impl RecursiveCompressor {
    /// Create a compressor over `registry`
    pub fn new(registry: CodecRegistry) -> Self {
        Self { registry }
    }

    /// Compress up to `max_depth` times, stopping on diminishing returns.
    ///
    /// `max_depth <= 1` is a single GZIP pass. Depths above [`MAX_DEPTH`]
    /// are clamped.
    pub fn compress(&self, text: &str, max_depth: u32) -> Result<RecursiveOutput> {
        let max_depth = clamp_depth(max_depth);
        let mut trace = RecursionTrace::default();
        let mut warnings = Vec::new();

        if text.is_empty() {
            return Ok(RecursiveOutput {
                data: String::new(),
                layers: 0,
                trace,
                warnings,
            });
        }

        let first = self.step(text, 1, &mut warnings)?;
        let mut best_size = first.len();
        let mut best = first;
        let mut layers = 1;
        trace.push(best_size, step_algorithm(1), true);
        tracing::debug!(step = 1, size = best_size, "recursive compression");

        for step in 2..=max_depth {
            let algorithm = step_algorithm(step);
            let mut step_warnings = Vec::new();
            let current = self.step(&best, step, &mut step_warnings)?;
            let current_size = current.len();

            let regressed = current_size as f64 >= best_size as f64 * REGRESSION_FACTOR;
            let stalled = (best_size as f64 - current_size as f64) < best_size as f64 * MIN_GAIN;
            let accepted = !regressed && !stalled;

            trace.push(current_size, algorithm, accepted);
            tracing::debug!(step, size = current_size, %algorithm, accepted, "recursive compression");

            if !accepted {
                break;
            }

            for warning in step_warnings {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
            best = current;
            best_size = current_size;
            layers = step;
        }

        Ok(RecursiveOutput {
            data: best,
            layers,
            trace,
            warnings,
        })
    }

    /// Peel exactly `depth` codec layers off `text`.
    ///
    /// Recursion is not self-describing: `depth` must be the layer count
    /// reported by [`RecursiveOutput::layers`] (or recorded in an envelope).
    /// Depths outside `1..=10` are clamped.
    pub fn decompress(&self, text: &str, depth: u32) -> Result<String> {
        let depth = clamp_depth(depth);
        let gzip = self.registry.resolve(Algorithm::Gzip);

        let mut current = gzip.decompress(text)?;
        for layer in 2..=depth {
            tracing::debug!(layer, "peeling codec layer");
            current = gzip.decompress(&current)?;
        }
        Ok(current)
    }

    fn step(&self, input: &str, step: u32, warnings: &mut Vec<CodecWarning>) -> Result<String> {
        let resolved = self.registry.resolve(step_algorithm(step));
        if let Some(warning) = resolved.warning {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        resolved.compress(input)
    }
}
