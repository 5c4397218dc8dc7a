use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use lexi_config::Config;
use lexi_core::audit::AuditReport;
use lexi_core::compare::{DatasetComparison, LevelAnalysis, analyze_levels, compare_datasets, level_words};
use lexi_core::dataset::{load_records, write_json};
use lexi_lang_cantonese::CantoneseGenerator;
use lexi_lang_chinese::enrichment::Enricher;
use lexi_lang_chinese::missing::{enriched_path, missing_report};
use lexi_lang_chinese::{HskLevel, HskLevels, HskLoader};
use lexi_lang_vietnamese::{MeaningTranslator, VietnameseGenerator};
use lexi_llm::{EntryGenerator, OllamaClient, RetryPolicy, TextGenerator};
use serde::Serialize;

use crate::cli::{Command, CommonArgs, Language};
use crate::pipeline::{self, Pacing, output_path};

pub async fn run(command: Command, args: &CommonArgs, config: &Config) -> anyhow::Result<()> {
    let levels = selected_levels(args.level);

    match command {
        Command::Generate { language } => match language {
            Language::Vietnamese => generate(&VietnameseGenerator::new(), &levels, config).await,
            Language::Cantonese => generate(&CantoneseGenerator::new(), &levels, config).await,
        },
        Command::Enrich => enrich(&levels, config).await,
        Command::Translate { file } => translate(&file, args.level, config).await,
        Command::Compare => compare(config),
        Command::Missing => missing(config),
        Command::Validate { language, file } => validate(language, file.as_deref(), &levels, config),
    }
}

pub fn selected_levels(level: Option<u8>) -> Vec<HskLevel> {
    match level.and_then(HskLevel::from_number) {
        Some(level) => vec![level],
        None => HskLevel::ALL.to_vec(),
    }
}

/// Client that already answered a model check
async fn connect(config: &Config) -> anyhow::Result<OllamaClient> {
    let client = OllamaClient::new(&config.ollama).context("Failed to build Ollama client")?;
    client
        .check_health()
        .await
        .with_context(|| format!("Ollama at {} is not usable", config.ollama.base_url))?;

    let metadata = client.metadata();
    tracing::info!("Using {} model {}", metadata.name, metadata.model);
    Ok(client)
}

async fn generate<G: EntryGenerator>(generator: &G, levels: &[HskLevel], config: &Config) -> anyhow::Result<()> {
    let client = connect(config).await?;
    let loader = HskLoader::new(&config.paths.raw_dir);
    let policy = RetryPolicy::from_config(&config.generation);
    let pacing = Pacing::from_config(&config.generation);

    let summaries = pipeline::generate_levels(
        generator,
        &client,
        &loader,
        levels,
        &config.paths.output_dir,
        &policy,
        &pacing,
    )
    .await
    .context("Failed to write generated entries")?;

    let failed: usize = summaries.iter().map(|s| s.failed).sum();
    let generated: usize = summaries.iter().map(|s| s.generated).sum();
    tracing::info!(
        "{} generation finished: {} levels, {} generated, {} failed",
        generator.language(),
        summaries.len(),
        generated,
        failed
    );
    Ok(())
}

async fn enrich(levels: &[HskLevel], config: &Config) -> anyhow::Result<()> {
    let client = connect(config).await?;
    let loader = HskLoader::new(&config.paths.raw_dir);
    let index = HskLevels::from_extractions(&loader.extract_all());
    let enricher = Enricher::new(
        client,
        RetryPolicy::from_config(&config.generation),
        Duration::from_millis(config.generation.item_delay_ms),
    );

    for level in levels {
        let words = match loader.source_words(*level) {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", level.as_str(), e);
                continue;
            }
        };

        let enriched = enricher.enrich_batch(&words, &index).await;
        let path = enriched_path(&config.paths.enriched_dir, *level);
        write_json(&path, &enriched).with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(
            "{}: enriched {}/{} items, saved to {}",
            level.as_str(),
            enriched.len(),
            words.len(),
            path.display()
        );
    }

    Ok(())
}

async fn translate(file: &Path, level: Option<u8>, config: &Config) -> anyhow::Result<()> {
    let mut rows = load_records(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let backup = PathBuf::from(format!("{}.backup", file.display()));
    match fs::copy(file, &backup) {
        Ok(_) => tracing::info!("Created backup: {}", backup.display()),
        Err(e) => tracing::warn!("Failed to create backup: {}", e),
    }

    let client = connect(config).await?;
    let translator = MeaningTranslator::new(client, Duration::from_millis(config.generation.item_delay_ms));

    translator
        .translate_rows(&mut rows, level, |rows| match write_json(file, rows) {
            Ok(()) => tracing::info!("Progress saved"),
            Err(e) => tracing::warn!("Couldn't save progress: {}", e),
        })
        .await;

    write_json(file, &rows).with_context(|| format!("Failed to write {}", file.display()))?;
    tracing::info!("Updated file saved: {}", file.display());
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub exclusive: LevelAnalysis,
    pub inclusive: LevelAnalysis,
    pub comparison: DatasetComparison,
}

pub fn comparison_report(exclusive_dir: &Path, inclusive_dir: &Path) -> ComparisonReport {
    let exclusive = HskLoader::new(exclusive_dir).extract_all();
    let inclusive = HskLoader::new(inclusive_dir).extract_all();

    ComparisonReport {
        exclusive: analyze_levels(&exclusive),
        inclusive: analyze_levels(&inclusive),
        comparison: compare_datasets(
            "exclusive",
            &level_words(&exclusive),
            "inclusive",
            &level_words(&inclusive),
        ),
    }
}

fn compare(config: &Config) -> anyhow::Result<()> {
    let report = comparison_report(&config.paths.raw_dir, &config.paths.inclusive_dir);

    let (common, exclusive_only, inclusive_only) = report.comparison.overall.counts();
    tracing::info!(
        "Common: {}, only exclusive: {}, only inclusive: {}",
        common,
        exclusive_only,
        inclusive_only
    );
    for (word, levels) in &report.exclusive.duplicates {
        tracing::warn!("{} appears in several exclusive levels: {:?}", word, levels);
    }

    let path = config.paths.output_dir.join("hsk_comparison.json");
    write_json(&path, &report).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Comparison saved to {}", path.display());
    Ok(())
}

fn missing(config: &Config) -> anyhow::Result<()> {
    let loader = HskLoader::new(&config.paths.raw_dir);
    let report = missing_report(&loader, &config.paths.enriched_dir);

    tracing::info!(
        "{} words missing from enriched files, {} extra",
        report.total_missing,
        report.total_extra
    );

    let path = config.paths.output_dir.join("missing_vocabulary.json");
    write_json(&path, &report).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Missing vocabulary saved to {}", path.display());
    Ok(())
}

fn audit(language: Language, path: &Path) -> Result<AuditReport, lexi_core::LoadError> {
    match language {
        Language::Vietnamese => lexi_lang_vietnamese::audit::audit_file(path),
        Language::Cantonese => lexi_lang_cantonese::audit::audit_file(path),
    }
}

fn output_stem(language: Language) -> &'static str {
    match language {
        Language::Vietnamese => VietnameseGenerator::new().output_stem(),
        Language::Cantonese => CantoneseGenerator::new().output_stem(),
    }
}

/// Audit one file, or every generated level file present; returns reports by file name
pub fn audit_outputs(
    language: Language,
    file: Option<&Path>,
    levels: &[HskLevel],
    output_dir: &Path,
) -> anyhow::Result<BTreeMap<String, AuditReport>> {
    let files: Vec<PathBuf> = match file {
        Some(file) => vec![file.to_path_buf()],
        None => levels
            .iter()
            .map(|level| output_path(output_dir, output_stem(language), level.number()))
            .filter(|path| path.exists())
            .collect(),
    };

    let mut reports = BTreeMap::new();
    for path in files {
        let report = audit(language, &path).with_context(|| format!("Failed to audit {}", path.display()))?;

        for issue in &report.issues {
            tracing::warn!("{}#{} {}: {}", path.display(), issue.index, issue.headword, issue.problem);
        }
        tracing::info!(
            "{}: {}/{} valid, {} failed, {} issues",
            path.display(),
            report.valid_entries,
            report.total_entries,
            report.failed_entries,
            report.issues.len()
        );

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        reports.insert(name, report);
    }

    Ok(reports)
}

fn validate(language: Language, file: Option<&Path>, levels: &[HskLevel], config: &Config) -> anyhow::Result<()> {
    let reports = audit_outputs(language, file, levels, &config.paths.output_dir)?;
    if reports.is_empty() {
        tracing::warn!("No {} files found in {}", language.as_str(), config.paths.output_dir.display());
        return Ok(());
    }

    let path = config
        .paths
        .output_dir
        .join(format!("{}_audit.json", output_stem(language)));
    write_json(&path, &reports).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Audit saved to {}", path.display());
    Ok(())
}
