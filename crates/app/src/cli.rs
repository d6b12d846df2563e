//! Command-line interface of the exam loader.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use exam_core::UnknownTypePolicy;
use exam_core::model::ExamDetails;

#[derive(Parser, Debug)]
#[command(name = "cbt-exam")]
#[command(version, about = "Load CBT exam definitions into a test session", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an exam definition table and print the resulting session
    Load(LoadArgs),
    /// Print the built-in mock exam
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Comma-separated exam definition
    pub definition: PathBuf,

    /// Test name shown to the candidate
    #[arg(long, env = "CBT_EXAM_NAME")]
    pub name: String,

    /// Test duration in minutes
    #[arg(long, env = "CBT_EXAM_DURATION_MINUTES")]
    pub duration: u32,

    /// Question paper the cropping regions refer to
    #[arg(long)]
    pub paper: Option<PathBuf>,

    /// Fail on unknown question types instead of keeping them as single choice
    #[arg(long, env = "CBT_REJECT_UNKNOWN_TYPES")]
    pub reject_unknown_types: bool,

    /// Print the whole session as JSON
    #[arg(long)]
    pub json: bool,
}

impl LoadArgs {
    pub fn details(&self) -> ExamDetails {
        ExamDetails::new(self.name.trim(), self.duration.saturating_mul(60))
    }

    pub fn unknown_types(&self) -> UnknownTypePolicy {
        if self.reject_unknown_types {
            UnknownTypePolicy::Reject
        } else {
            UnknownTypePolicy::SingleChoice
        }
    }
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Seed for the demo statuses; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the whole session as JSON
    #[arg(long)]
    pub json: bool,
}
