use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "lexi", about = "HSK vocabulary tooling and LLM entry generation", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// HSK level (1-7); every level when omitted
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(1..=7))]
    pub level: Option<u8>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Words per batch
    #[arg(long, global = true)]
    pub batch: Option<usize>,

    #[arg(long, global = true)]
    pub raw_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// JSON config file; environment variables still apply on top
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug output on the console
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate target-language entries for HSK words
    Generate {
        #[arg(value_enum)]
        language: Language,
    },
    /// Add meanings, translations and examples to HSK words
    Enrich,
    /// Fill missing Vietnamese translations in a JSON word list
    Translate {
        /// Array of rows with `simplified`, `english`, `pinyin`, `hsk_level`
        file: PathBuf,
    },
    /// Compare the exclusive and inclusive HSK datasets
    Compare,
    /// Report HSK words absent from the enriched files
    Missing,
    /// Audit generated entry files
    Validate {
        #[arg(value_enum)]
        language: Language,
        /// A single file instead of every `{stem}_{level}.json` in the output dir
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Vietnamese,
    Cantonese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Vietnamese => "vietnamese",
            Language::Cantonese => "cantonese",
        }
    }
}

impl Command {
    /// Log file prefix
    pub fn tool_name(&self) -> String {
        match self {
            Command::Generate { language } => format!("generate_{}", language.as_str()),
            Command::Enrich => "enrich".to_string(),
            Command::Translate { .. } => "translate".to_string(),
            Command::Compare => "compare".to_string(),
            Command::Missing => "missing".to_string(),
            Command::Validate { language, .. } => format!("validate_{}", language.as_str()),
        }
    }
}
