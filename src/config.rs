//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// Default template file name, next to the executable
pub const TEMPLATE_FILE: &str = "template.json";

/// Default ringtone folder name, next to the executable
pub const RINGTONE_FOLDER: &str = "ringtone";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "seqtimer")]
#[command(about = "Count down a sequence of timers and ring an alarm when they finish")]
#[command(version)]
#[command(after_help = "Example: seqtimer \"25m 'Focus' [bell]; 5m 'Break'\"\n\
Keys while running: w pause/resume, Esc stop the final alarm, q quit")]
pub struct Config {
    /// Timer specs separated by ';', e.g. 1h30m'Label'[ringtone]; {template}
    #[arg(value_name = "SPEC")]
    pub specs: Vec<String>,

    /// List saved templates and exit
    #[arg(short, long)]
    pub list: bool,

    /// Save the given specs as a named template and exit
    #[arg(long, value_name = "NAME")]
    pub save_template: Option<String>,

    /// Template file (defaults to template.json next to the executable)
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Ringtone folder (defaults to ./ringtone next to the executable)
    #[arg(long, value_name = "DIR")]
    pub ringtones: Option<PathBuf>,

    /// Do not listen for keyboard controls
    #[arg(long)]
    pub no_keyboard: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListTemplates,
    SaveTemplate { name: String, raw: String },
    Run { input: String },
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Decide the mode; listing wins over saving, saving over running
    pub fn mode(&self) -> Mode {
        if self.list {
            Mode::ListTemplates
        } else if let Some(name) = &self.save_template {
            Mode::SaveTemplate {
                name: name.clone(),
                raw: self.joined_specs(),
            }
        } else {
            Mode::Run {
                input: self.joined_specs(),
            }
        }
    }

    /// All spec arguments joined with single spaces
    pub fn joined_specs(&self) -> String {
        self.specs.join(" ")
    }

    pub fn template_path(&self) -> PathBuf {
        self.templates
            .clone()
            .unwrap_or_else(|| base_dir().join(TEMPLATE_FILE))
    }

    pub fn ringtone_dir(&self) -> PathBuf {
        self.ringtones
            .clone()
            .unwrap_or_else(|| base_dir().join(RINGTONE_FOLDER))
    }

    /// Get the appropriate log level based on verbose flag.
    ///
    /// Quiet by default so log lines do not tear the live table.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Directory holding the executable, falling back to the working directory
fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
