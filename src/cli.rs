// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use cvgrep::config::ConfigOutputFormat;

/// cvgrep - Local semantic resume search and Q&A tool
///
/// Detects resume section headers, chunks the document by section, embeds
/// each chunk, and answers similarity queries from a persistent local index.
#[derive(Parser, Debug)]
#[command(name = "cvgrep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<ConfigOutputFormat> for OutputFormat {
    fn from(format: ConfigOutputFormat) -> Self {
        match format {
            ConfigOutputFormat::Text => OutputFormat::Text,
            ConfigOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Segment a resume, embed its chunks, and add them to the store
    #[command(alias = "i")]
    Ingest {
        /// Path to the extracted resume text file
        document: String,

        /// Store directory (defaults to ./.cvgrep, walking up to parents)
        #[arg(short, long)]
        store: Option<String>,

        /// Minimum similarity for header detection
        #[arg(long)]
        threshold: Option<f32>,

        /// Suppress the ingest summary
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Show detected section headers with confidence tiers
    Headers {
        /// Path to the extracted resume text file
        document: String,

        /// Minimum similarity for header detection
        #[arg(long)]
        threshold: Option<f32>,

        /// Include medium- and low-confidence candidates
        #[arg(short, long)]
        all: bool,
    },

    /// Retrieve the chunks most similar to a question
    #[command(alias = "s")]
    Search {
        /// Question or free-text query
        question: String,

        /// Store directory (defaults to ./.cvgrep, walking up to parents)
        #[arg(short, long)]
        store: Option<String>,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,
    },

    /// Ingest a resume, retrieve context, and generate an answer
    Ask {
        /// Path to the extracted resume text file
        document: String,

        /// Question to answer from the resume
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<usize>,

        /// Store directory (defaults to ./.cvgrep)
        #[arg(short, long)]
        store: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
