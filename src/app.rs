use std::path::PathBuf;

use ratatui::widgets::ListState;

use crate::config::Config;
use crate::digest::{supported_algorithms, AlgorithmMode, CompareEngine, Verdict};
use crate::task::{Executor, JobOutput, Sink, TaskState, Update};
use crate::ui::FileBrowser;

pub enum AppMode {
    Normal,
    /// File browser open; the purpose says what the chosen file is for
    Browse(PickPurpose),
    /// Typing or pasting the expected digest
    EditDigest,
    SelectAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickPurpose {
    DigestFile,
    CompareFirst,
    CompareSecond { first: PathBuf },
    VerifyFile,
}

impl PickPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            PickPurpose::DigestFile => "Select file",
            PickPurpose::CompareFirst => "Select first file",
            PickPurpose::CompareSecond { .. } => "Select second file",
            PickPurpose::VerifyFile => "Select file to verify",
        }
    }
}

/// What a result panel currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum PanelStatus {
    Idle,
    Running { progress: f64 },
    Done(String),
    /// Finished, but the outcome needs attention (a mismatch)
    Warning(String),
    Error(String),
}

impl PanelStatus {
    pub fn progress(&self) -> Option<f64> {
        match self {
            PanelStatus::Running { progress } => Some(*progress),
            _ => None,
        }
    }
}

pub struct App {
    pub config: Config,
    pub mode: AppMode,
    pub algorithm_mode: AlgorithmMode,
    pub algorithm_list: ListState,
    pub browser: FileBrowser,
    /// File chosen for the digest panel
    pub selected_file: Option<PathBuf>,
    /// Expected digest for file-vs-digest comparison
    pub expected_input: String,
    pub digest_status: PanelStatus,
    /// Last computed digest, shown in the digest panel
    pub digest_value: Option<String>,
    pub compare_status: PanelStatus,
    pub message: String,
    pub executor: Executor<JobOutput>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let algorithm_mode = config.algorithm_mode();
        let browser = FileBrowser::new(config.start_dir(), config.show_hidden);

        let mut algorithm_list = ListState::default();
        let current = algorithm_mode.algorithm().unwrap_or_default();
        algorithm_list.select(supported_algorithms().iter().position(|a| *a == current));

        let message = match algorithm_mode {
            AlgorithmMode::Fixed(id) => format!("Welcome to hashcheck ({} only)", id),
            AlgorithmMode::Selectable(_) => "Welcome to hashcheck - press ? for keys".to_string(),
        };

        Self {
            config,
            mode: AppMode::Normal,
            algorithm_mode,
            algorithm_list,
            browser,
            selected_file: None,
            expected_input: String::new(),
            digest_status: PanelStatus::Idle,
            digest_value: None,
            compare_status: PanelStatus::Idle,
            message,
            executor: Executor::new(),
            should_quit: false,
        }
    }

    /// Compute the digest of `selected_file` in the background
    pub fn start_digest(&mut self) {
        let Some(path) = self.selected_file.clone() else {
            self.message = "Select a file first (o)".to_string();
            return;
        };
        let mode = self.algorithm_mode;
        let restarted = self.executor.is_running(Sink::Digest);

        self.digest_value = None;
        self.digest_status = PanelStatus::Running { progress: 0.0 };
        self.message = if restarted {
            "Restarted digest; the previous result will be ignored".to_string()
        } else {
            "Computing digest, please wait...".to_string()
        };

        self.executor.spawn(Sink::Digest, move |reporter| {
            let mut report = |p: f64| reporter.report(p);
            JobOutput::Digest(CompareEngine::new().display_digest(Some(&path), mode, Some(&mut report)))
        });
    }

    /// Compare two files. `None` on either side means the selection was cancelled.
    pub fn start_compare_files(&mut self, first: Option<PathBuf>, second: Option<PathBuf>) {
        let mode = self.algorithm_mode;
        self.compare_status = PanelStatus::Running { progress: 0.0 };
        self.message = "Comparing, please wait...".to_string();

        self.executor.spawn(Sink::Compare, move |reporter| {
            let mut report = |p: f64| reporter.report(p);
            JobOutput::Verdict(CompareEngine::new().compare_files(
                first.as_deref(),
                second.as_deref(),
                mode,
                Some(&mut report),
            ))
        });
    }

    /// Compare a file against `expected_input`
    pub fn start_verify(&mut self, path: Option<PathBuf>) {
        let mode = self.algorithm_mode;
        let expected = self.expected_input.clone();
        self.compare_status = PanelStatus::Running { progress: 0.0 };
        self.message = "Comparing, please wait...".to_string();

        self.executor.spawn(Sink::Compare, move |reporter| {
            let mut report = |p: f64| reporter.report(p);
            JobOutput::Verdict(CompareEngine::new().compare_with_digest(
                path.as_deref(),
                Some(&expected),
                mode,
                Some(&mut report),
            ))
        });
    }

    /// Apply everything the workers have posted since the last frame (non-blocking)
    pub fn poll_background_tasks(&mut self) {
        for delivery in self.executor.poll() {
            match (delivery.sink, delivery.update) {
                (Sink::Digest, Update::Progress(progress)) => {
                    self.digest_status = PanelStatus::Running { progress };
                }
                (Sink::Compare, Update::Progress(progress)) => {
                    self.compare_status = PanelStatus::Running { progress };
                }
                (Sink::Digest, Update::Finished(JobOutput::Digest(result))) => match result {
                    Ok(digest) => {
                        self.digest_status = PanelStatus::Done(format!(
                            "{} of {}",
                            digest.algorithm,
                            digest.path.display()
                        ));
                        self.digest_value = Some(digest.hex);
                        self.message = "✓ Digest computed".to_string();
                    }
                    Err(e) => {
                        self.digest_status = PanelStatus::Error(e.headline());
                        self.message = format!("✗ {}", e.kind_label());
                    }
                },
                (Sink::Compare, Update::Finished(JobOutput::Verdict(verdict))) => {
                    self.message = match &verdict {
                        Verdict::Match => "✓ Comparison complete".to_string(),
                        Verdict::Mismatch => "⚠ Comparison complete".to_string(),
                        _ => "✗ Comparison did not complete".to_string(),
                    };
                    self.compare_status = match verdict {
                        Verdict::Match => PanelStatus::Done(verdict.to_string()),
                        Verdict::Mismatch => PanelStatus::Warning(verdict.to_string()),
                        other => PanelStatus::Error(other.to_string()),
                    };
                }
                (sink, Update::Finished(other)) => {
                    tracing::error!(?sink, ?other, "result delivered to the wrong panel");
                }
                (sink, Update::Failed(reason)) => {
                    let status = PanelStatus::Error(format!("Task failed: {}", reason));
                    match sink {
                        Sink::Digest => self.digest_status = status,
                        Sink::Compare => self.compare_status = status,
                    }
                    self.message = "✗ Task failed".to_string();
                }
            }
        }
    }

    pub fn task_state(&self, sink: Sink) -> TaskState {
        self.executor.state(sink)
    }

    /// Progress of whichever job is running, digest panel first
    pub fn active_progress(&self) -> Option<f64> {
        self.digest_status
            .progress()
            .or_else(|| self.compare_status.progress())
    }

    pub fn open_browser(&mut self, purpose: PickPurpose) {
        self.browser.refresh();
        self.message = format!("{} (Enter: choose, Backspace: up, Esc: cancel)", purpose.title());
        self.mode = AppMode::Browse(purpose);
    }

    /// Handle the end of a file selection; `None` means cancelled
    pub fn finish_pick(&mut self, purpose: PickPurpose, chosen: Option<PathBuf>) {
        self.mode = AppMode::Normal;
        match purpose {
            PickPurpose::DigestFile => match chosen {
                Some(path) => {
                    self.message = format!("Selected {}", path.display());
                    self.selected_file = Some(path);
                    self.reset_digest_panel();
                }
                None => self.message = "Selection cancelled".to_string(),
            },
            PickPurpose::CompareFirst => match chosen {
                Some(first) => self.open_browser(PickPurpose::CompareSecond { first }),
                None => self.start_compare_files(None, None),
            },
            PickPurpose::CompareSecond { first } => self.start_compare_files(Some(first), chosen),
            PickPurpose::VerifyFile => self.start_verify(chosen),
        }
    }

    pub fn select_algorithm(&mut self) {
        let Some(i) = self.algorithm_list.selected() else {
            return;
        };
        if let Some(&id) = supported_algorithms().get(i) {
            self.algorithm_mode = AlgorithmMode::Selectable(Some(id));
            self.reset_digest_panel();
            self.message = format!("Algorithm: {}", id.info().display_name);
            tracing::info!(algorithm = %id, "algorithm selected");
        }
        self.mode = AppMode::Normal;
    }

    /// Clear the digest panel after its file or algorithm changed. A job still
    /// running for the old selection is discarded so its result cannot land
    /// under the new header.
    fn reset_digest_panel(&mut self) {
        self.executor.discard(Sink::Digest);
        self.digest_value = None;
        self.digest_status = PanelStatus::Idle;
    }

    /// Append pasted or typed text to the expected digest, dropping line breaks
    pub fn push_input(&mut self, text: &str) {
        self.expected_input
            .extend(text.chars().filter(|c| *c != '\n' && *c != '\r'));
    }
}
