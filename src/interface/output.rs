use crate::binder::BindingResult;
use crate::interface::ValidationReport;
use crate::generators::GeneratedFiles;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Verbose => write!(f, "VERBOSE"),
        }
    }
}

/// Icon-prefixed console logger.
///
/// Errors and warnings go to stderr, everything else to stdout. A quiet logger only
/// emits errors and warnings so stdout can carry machine-readable output.
#[derive(Debug, Clone)]
pub struct Logger {
    verbose: bool,
    debug: bool,
    quiet: bool,
}

impl Logger {
    pub fn new(verbose: bool, debug: bool) -> Self {
        Self {
            verbose,
            debug,
            quiet: false,
        }
    }

    pub fn quiet() -> Self {
        Self {
            verbose: false,
            debug: false,
            quiet: true,
        }
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Error | LogLevel::Warning => true,
            LogLevel::Info => !self.quiet,
            LogLevel::Debug => !self.quiet && (self.debug || self.verbose),
            LogLevel::Verbose => !self.quiet && self.verbose,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }
        let icon = match level {
            LogLevel::Error => "❌",
            LogLevel::Warning => "⚠️",
            LogLevel::Info => "",
            LogLevel::Debug => "🔍",
            LogLevel::Verbose => "💬",
        };
        match (level, icon.is_empty()) {
            (LogLevel::Error | LogLevel::Warning, _) => eprintln!("{} {}", icon, message),
            (_, true) => println!("{}", message),
            (_, false) => println!("{} {}", icon, message),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Step and item progress for batch runs: a spinner normally, plain log lines when
/// verbose, nothing when quiet.
pub struct ProgressReporter {
    logger: Logger,
    progress_bar: Option<ProgressBar>,
    current_step: usize,
    total_steps: usize,
    step_name: String,
}

impl ProgressReporter {
    pub fn new(logger: Logger, total_steps: usize) -> Self {
        let progress_bar = if !logger.is_verbose() && !logger.is_quiet() {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(
                    style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
                );
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        Self {
            logger,
            progress_bar,
            current_step: 0,
            total_steps,
            step_name: String::new(),
        }
    }

    pub fn start_step(&mut self, step_name: &str) {
        self.current_step += 1;
        self.step_name = step_name.to_string();

        if self.logger.is_verbose() {
            let progress = if self.total_steps > 0 {
                format!(" ({}/{})", self.current_step, self.total_steps)
            } else {
                String::new()
            };
            self.logger.info(&format!("🚀 {}{}", step_name, progress));
        } else if let Some(ref pb) = self.progress_bar {
            pb.set_message(format!(
                "{} ({}/{})",
                step_name, self.current_step, self.total_steps
            ));
        }
    }

    pub fn complete_step(&mut self, message: Option<&str>) {
        if self.logger.is_verbose() {
            match message {
                Some(msg) => self.logger.info(&format!("✅ {} - {}", self.step_name, msg)),
                None => self.logger.info(&format!("✅ {}", self.step_name)),
            }
        }
    }

    /// Record a step that failed without stopping the batch
    pub fn fail_step(&mut self, error: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.suspend(|| {
                self.logger
                    .error(&format!("Failed {}: {}", self.step_name, error))
            });
        } else {
            self.logger
                .error(&format!("Failed {}: {}", self.step_name, error));
        }
    }

    pub fn update_progress(&self, message: &str) {
        self.logger.verbose(message);
    }

    pub fn finish(&self, total_message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
        if !self.logger.is_quiet() {
            println!("✓ {}", total_message);
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

pub fn print_generated_files(files: &[GeneratedFiles]) {
    for generated in files {
        println!("  📄 {}", generated.auto_file.display());
        if let Some(manual) = &generated.manual_file {
            let note = if generated.manual_created {
                "created"
            } else {
                "kept"
            };
            println!("  📄 {} ({})", manual.display(), note);
        }
    }
    if !files.is_empty() {
        println!("\n💡 Compile the generated sources, then run `ui-autobind bind`.");
    }
}

pub fn print_binding_result(result: &BindingResult) {
    print!("{}", result);
}

pub fn print_validations(report: &ValidationReport) {
    for (index, validation) in report.validations.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print!("{}", validation.report());
    }
    for name in &report.skipped {
        println!("- {}: nothing to validate", name);
    }
}
