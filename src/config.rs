/*!
 * Configuration handling for xmindctl
 */

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use log::LevelFilter;

use crate::codec::{Fidelity, FormatKind};
use crate::editor::{NewTopic, TopicEdit};
use crate::error::{Result, XmindError};
use crate::render::Style;

/// Command-line arguments for xmindctl
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "xmindctl",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect, convert and edit XMind mind maps",
    long_about = "Reads and writes both the XML-based (XMind 8) and JSON-based (XMind Zen) package formats. Topics are addressed by title; the first depth-first match wins."
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fields the JSON format stores
    #[clap(long, value_enum, default_value_t = Fidelity::default(), global = true)]
    pub zen_fidelity: Fidelity,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a new mind map with a single root topic
    Create {
        /// Output file path
        file: PathBuf,

        /// Root topic title
        #[clap(long, default_value = "Central Topic")]
        root: String,

        /// Sheet title
        #[clap(long, default_value = "Sheet 1")]
        sheet_title: String,

        /// Package format to write
        #[clap(long, value_enum, default_value_t = FormatKind::Zen)]
        format: FormatKind,
    },

    /// Print the topic tree
    Show {
        /// Mind map file
        file: PathBuf,

        /// Only this sheet (0-based)
        #[clap(long)]
        sheet: Option<usize>,
    },

    /// Convert to Markdown
    Markdown {
        /// Mind map file
        file: PathBuf,

        /// Output Markdown file (stdout when omitted)
        output: Option<PathBuf>,

        /// Output style
        #[clap(long, value_enum, default_value_t = Style::Headers)]
        style: Style,

        /// Only this sheet (0-based)
        #[clap(long)]
        sheet: Option<usize>,
    },

    /// Add a topic under a parent
    Add {
        /// Mind map file
        file: PathBuf,

        /// Parent topic title
        #[clap(long)]
        parent: String,

        /// New topic title
        #[clap(long)]
        topic: String,

        /// Note text
        #[clap(long)]
        note: Option<String>,

        /// Comment text
        #[clap(long)]
        comment: Option<String>,

        /// Marker id such as 'priority-1' or 'task-done' (repeatable)
        #[clap(long)]
        marker: Vec<String>,

        /// Label text (repeatable)
        #[clap(long)]
        label: Vec<String>,

        /// Only search this sheet (0-based)
        #[clap(long)]
        sheet: Option<usize>,
    },

    /// Edit a topic
    Edit {
        /// Mind map file
        file: PathBuf,

        /// Target topic title
        #[clap(long)]
        target: String,

        /// New title
        #[clap(long)]
        title: Option<String>,

        /// Replace the note (empty clears it)
        #[clap(long)]
        note: Option<String>,

        /// Replace the comment (empty clears it)
        #[clap(long)]
        comment: Option<String>,

        /// Marker id to add (repeatable)
        #[clap(long)]
        marker: Vec<String>,

        /// Label to add (repeatable)
        #[clap(long)]
        label: Vec<String>,

        /// Only search this sheet (0-based)
        #[clap(long)]
        sheet: Option<usize>,
    },

    /// Delete a topic and its subtopics
    Delete {
        /// Mind map file
        file: PathBuf,

        /// Topic to delete
        #[clap(long)]
        target: String,

        /// Only search this sheet (0-based)
        #[clap(long)]
        sheet: Option<usize>,
    },
}

/// Validated operation to run
#[derive(Debug, Clone)]
pub enum Operation {
    Create {
        sheet_title: String,
        root: String,
        format: FormatKind,
    },
    Show,
    Markdown {
        output: Option<PathBuf>,
        style: Style,
    },
    Add {
        parent: String,
        topic: NewTopic,
    },
    Edit {
        target: String,
        changes: TopicEdit,
    },
    Delete {
        target: String,
    },
}

impl Operation {
    /// Whether the operation rewrites the mind map file
    pub fn writes_document(&self) -> bool {
        !matches!(self, Operation::Show | Operation::Markdown { .. })
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Mind map file read and/or written
    pub file: PathBuf,

    /// What to do with it
    pub operation: Operation,

    /// Sheet restriction for lookups and rendering
    pub sheet: Option<usize>,

    /// Fields the JSON format stores
    pub zen_fidelity: Fidelity,

    /// Log level derived from `-v`
    pub log_level: LevelFilter,
}

impl Config {
    /// Create configuration from a parsed subcommand and global options
    pub fn from_args(command: Command, verbose: u8, zen_fidelity: Fidelity) -> Self {
        let log_level = match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };

        let (file, operation, sheet) = match command {
            Command::Create {
                file,
                root,
                sheet_title,
                format,
            } => (
                file,
                Operation::Create {
                    sheet_title,
                    root,
                    format,
                },
                None,
            ),
            Command::Show { file, sheet } => (file, Operation::Show, sheet),
            Command::Markdown {
                file,
                output,
                style,
                sheet,
            } => (file, Operation::Markdown { output, style }, sheet),
            Command::Add {
                file,
                parent,
                topic,
                note,
                comment,
                marker,
                label,
                sheet,
            } => (
                file,
                Operation::Add {
                    parent,
                    topic: NewTopic {
                        title: topic,
                        note,
                        comment,
                        markers: marker,
                        labels: label,
                    },
                },
                sheet,
            ),
            Command::Edit {
                file,
                target,
                title,
                note,
                comment,
                marker,
                label,
                sheet,
            } => (
                file,
                Operation::Edit {
                    target,
                    changes: TopicEdit {
                        title,
                        note,
                        comment,
                        markers: marker,
                        labels: label,
                    },
                },
                sheet,
            ),
            Command::Delete {
                file,
                target,
                sheet,
            } => (file, Operation::Delete { target }, sheet),
        };

        Self {
            file,
            operation,
            sheet,
            zen_fidelity,
            log_level,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.operation {
            Operation::Create { .. } => check_parent_dir(&self.file)?,
            _ => {
                if !self.file.is_file() {
                    return Err(XmindError::Config(format!(
                        "Mind map file not found: {}",
                        self.file.display()
                    )));
                }
            }
        }

        match &self.operation {
            Operation::Markdown {
                output: Some(output),
                ..
            } => {
                check_parent_dir(output)?;
                if output == &self.file {
                    return Err(XmindError::Config(format!(
                        "Markdown output would overwrite the mind map: {}",
                        output.display()
                    )));
                }
            }
            Operation::Edit { target, changes } if changes.is_empty() => {
                return Err(XmindError::InvalidArgument(format!(
                    "Nothing to change for '{}': pass --title, --note, --comment, --marker or --label",
                    target
                )));
            }
            _ => {}
        }

        Ok(())
    }
}

fn check_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(XmindError::Config(format!(
                "Output directory not found: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}
