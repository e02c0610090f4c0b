use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconstruct ancestral metadata values on every labeled tree node
    Reconstruct {
        /// Newick tree (may be compressed)
        #[arg(short = 't', long = "tree")]
        tree: PathBuf,

        /// Metadata table; tab-separated for .tsv/.txt/.tsv.gz, comma-separated otherwise
        #[arg(short = 'm', long = "metadata")]
        metadata: PathBuf,

        /// Output table; gzip-compressed when ending in .gz
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// Comma-separated fields to reconstruct (default: every column but the ID column)
        #[arg(short = 'f', long = "fields")]
        fields: Option<String>,

        /// Metadata column matched against tree labels (default: first column)
        #[arg(short = 'q', long = "id-field")]
        id_field: Option<String>,

        /// Report every candidate value for unresolved nodes instead of leaving them empty
        #[arg(short = 'a', long = "tolerate-ambiguity")]
        tolerate_ambiguity: bool,

        /// Number of fields reconstructed in parallel
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        threads: Option<u16>,

        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// TOML configuration file (default: per-user config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Count the descendants of every labeled tree node
    NumDescendants {
        /// Newick tree (may be compressed)
        #[arg(short = 't', long = "tree")]
        tree: PathBuf,

        /// Tab-separated output table; gzip-compressed when ending in .gz
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// TOML configuration file (default: per-user config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
