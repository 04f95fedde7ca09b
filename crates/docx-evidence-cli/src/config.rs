use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use docx_evidence_core::{
    GenerationOptions, IdStrategy, InjectionOptions, DEFAULT_BASE, DEFAULT_MAX_WIDTH_CM,
    DEFAULT_SECONDARY_OFFSET, DEFAULT_STRIDE,
};

/// Configuration for the docx-evidence command.
#[derive(Parser, Debug, Clone)]
#[command(name = "docx-evidence")]
#[command(about = "Generate QA evidence and requirement documents from a Word template")]
pub struct Config {
    /// Path to the .docx template
    #[arg(long, env = "DOCX_TEMPLATE")]
    pub template: PathBuf,

    /// Directory the generated document is written to
    #[arg(long, default_value = ".", env = "DOCX_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Widest a screenshot may be rendered, in centimetres
    #[arg(long, default_value_t = DEFAULT_MAX_WIDTH_CM, env = "DOCX_MAX_WIDTH_CM")]
    pub max_width_cm: f64,

    /// How relationship and drawing ids for screenshots are chosen
    #[arg(long, value_enum, default_value = "above-existing", env = "DOCX_ID_MODE")]
    pub id_mode: IdMode,

    /// First id handed out (lower bound in above-existing mode)
    #[arg(long, default_value_t = DEFAULT_BASE, env = "DOCX_ID_BASE")]
    pub id_base: u64,

    /// Fixed token for media file names instead of the current time
    #[arg(long, env = "DOCX_ID_TOKEN")]
    pub id_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fill the evidence template and append screenshots
    Evidence {
        /// JSON file with the evidence form
        #[arg(long)]
        form: PathBuf,

        /// Screenshots, in the order they should appear
        images: Vec<PathBuf>,
    },
    /// Fill the requirement-request template
    Requirement {
        /// JSON file with the requirement form
        #[arg(long)]
        form: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    Fixed,
    AboveExisting,
}

impl Config {
    pub fn generation_options(&self) -> GenerationOptions {
        let id_strategy = match self.id_mode {
            IdMode::Fixed => IdStrategy::FixedRange {
                base: self.id_base,
                stride: DEFAULT_STRIDE,
                secondary_offset: DEFAULT_SECONDARY_OFFSET,
            },
            IdMode::AboveExisting => IdStrategy::AboveExisting {
                min_base: self.id_base,
                stride: DEFAULT_STRIDE,
                secondary_offset: DEFAULT_SECONDARY_OFFSET,
            },
        };

        GenerationOptions {
            injection: InjectionOptions {
                max_width_cm: self.max_width_cm,
                id_strategy,
            },
            id_token: self.id_token.clone(),
        }
    }
}
