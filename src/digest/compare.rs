// Comparison engine
// Reduces one or two digest computations to a verdict

use std::fmt;
use std::path::Path;

use super::algorithm::AlgorithmId;
use super::engine::{DigestEngine, DigestResult, ProgressFn};
use super::error::{DigestError, InputProblem};

/// Which comparison variant is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmMode {
    /// Single-algorithm variant: provided digests are length-checked up front
    Fixed(AlgorithmId),
    /// Multi-algorithm variant; `None` means nothing is selected yet
    Selectable(Option<AlgorithmId>),
}

impl AlgorithmMode {
    pub fn algorithm(self) -> Option<AlgorithmId> {
        match self {
            AlgorithmMode::Fixed(id) => Some(id),
            AlgorithmMode::Selectable(id) => id,
        }
    }
}

impl Default for AlgorithmMode {
    fn default() -> Self {
        AlgorithmMode::Selectable(Some(AlgorithmId::default()))
    }
}

#[derive(Debug)]
pub enum AbortReason {
    /// A required file selection was cancelled; no I/O happened
    SelectionCancelled,
    /// A digest computation failed
    Failed(DigestError),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::SelectionCancelled => write!(f, "selection cancelled"),
            AbortReason::Failed(err) => write!(f, "{} ({})", err.headline(), err.kind_label()),
        }
    }
}

/// Outcome of a comparison. `Mismatch` only ever means both sides were
/// computed (or supplied) successfully and differ.
#[derive(Debug)]
pub enum Verdict {
    Match,
    Mismatch,
    Aborted(AbortReason),
    InvalidInput(InputProblem),
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Match => write!(f, "Match: digests are identical"),
            Verdict::Mismatch => write!(f, "Mismatch: digests differ"),
            Verdict::Aborted(reason) => write!(f, "Aborted: {}", reason),
            Verdict::InvalidInput(problem) => write!(f, "Invalid input: {}", problem),
        }
    }
}

pub struct CompareEngine {
    engine: DigestEngine,
}

impl CompareEngine {
    pub fn new() -> Self {
        Self {
            engine: DigestEngine::new(),
        }
    }

    pub fn with_engine(engine: DigestEngine) -> Self {
        Self { engine }
    }

    /// Compare the contents of two files.
    ///
    /// Progress spans both computations as one 0..=100 sequence: the first file
    /// covers 0..=50 and the second 50..=100.
    pub fn compare_files(
        &self,
        first: Option<&Path>,
        second: Option<&Path>,
        mode: AlgorithmMode,
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> Verdict {
        let (Some(first), Some(second)) = (first, second) else {
            return log_verdict(Verdict::Aborted(AbortReason::SelectionCancelled));
        };
        let Some(algorithm) = mode.algorithm() else {
            return log_verdict(Verdict::InvalidInput(InputProblem::NoAlgorithm));
        };

        let first = match self.compute_scaled(first, algorithm, &mut on_progress, 0.0) {
            Ok(digest) => digest,
            Err(e) => return log_verdict(Verdict::Aborted(AbortReason::Failed(e))),
        };
        let second = match self.compute_scaled(second, algorithm, &mut on_progress, 50.0) {
            Ok(digest) => digest,
            Err(e) => return log_verdict(Verdict::Aborted(AbortReason::Failed(e))),
        };

        log_verdict(if first.hex == second.hex {
            Verdict::Match
        } else {
            Verdict::Mismatch
        })
    }

    /// Compare a file against a digest typed or pasted by the user.
    ///
    /// The comparison is exact: the provided value must be lowercase hex to match.
    pub fn compare_with_digest(
        &self,
        path: Option<&Path>,
        provided: Option<&str>,
        mode: AlgorithmMode,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Verdict {
        let Some(path) = path else {
            return log_verdict(Verdict::Aborted(AbortReason::SelectionCancelled));
        };
        let provided = match provided {
            Some(value) if !value.is_empty() => value,
            _ => return log_verdict(Verdict::InvalidInput(InputProblem::MissingValue)),
        };
        if let AlgorithmMode::Fixed(algorithm) = mode {
            let actual = provided.chars().count();
            if actual != algorithm.hex_len() {
                return log_verdict(Verdict::InvalidInput(InputProblem::WrongLength {
                    expected: algorithm.hex_len(),
                    actual,
                }));
            }
        }
        let Some(algorithm) = mode.algorithm() else {
            return log_verdict(Verdict::InvalidInput(InputProblem::NoAlgorithm));
        };

        match self.engine.compute(path, algorithm, on_progress) {
            Ok(digest) if digest.hex == provided => log_verdict(Verdict::Match),
            Ok(_) => log_verdict(Verdict::Mismatch),
            Err(e) => log_verdict(Verdict::Aborted(AbortReason::Failed(e))),
        }
    }

    /// Compute a single file's digest for display
    pub fn display_digest(
        &self,
        path: Option<&Path>,
        mode: AlgorithmMode,
        on_progress: Option<ProgressFn<'_>>,
    ) -> DigestResult {
        let path = path.ok_or(DigestError::Aborted)?;
        let algorithm = mode
            .algorithm()
            .ok_or(DigestError::InvalidInput(InputProblem::NoAlgorithm))?;
        self.engine.compute(path, algorithm, on_progress)
    }

    fn compute_scaled(
        &self,
        path: &Path,
        algorithm: AlgorithmId,
        on_progress: &mut Option<ProgressFn<'_>>,
        offset: f64,
    ) -> DigestResult {
        match on_progress {
            Some(report) => {
                let mut half = |p: f64| report(offset + p / 2.0);
                self.engine.compute(path, algorithm, Some(&mut half))
            }
            None => self.engine.compute(path, algorithm, None),
        }
    }
}

impl Default for CompareEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn log_verdict(verdict: Verdict) -> Verdict {
    match &verdict {
        Verdict::Match | Verdict::Mismatch => tracing::info!(%verdict, "comparison finished"),
        _ => tracing::warn!(%verdict, "comparison did not complete"),
    }
    verdict
}
