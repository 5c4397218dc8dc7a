use std::path::{Path, PathBuf};
use std::time::Duration;

use lexi_config::generation::GenerationConfig;
use lexi_core::dataset::write_json;
use lexi_core::{LoadError, SourceWord};
use lexi_lang_chinese::{HskLevel, HskLoader};
use lexi_llm::{EntryGenerator, RetryPolicy, TextGenerator, generate_entry};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Pacing {
    pub batch_size: usize,
    pub item_delay: Duration,
    pub batch_delay: Duration,
}

impl Pacing {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            item_delay: Duration::from_millis(config.item_delay_ms),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub level: u8,
    pub generated: usize,
    pub failed: usize,
    pub output: PathBuf,
}

pub fn output_path(dir: &Path, stem: &str, level: u8) -> PathBuf {
    dir.join(format!("{stem}_{level}.json"))
}

pub fn progress_path(dir: &Path, stem: &str, level: u8) -> PathBuf {
    dir.join(format!("{stem}_{level}_progress.json"))
}

/// Generate entries for one level's words in batches.
///
/// Every word yields an entry: the accepted one or the generator's
/// placeholder. The progress file is rewritten after each batch.
pub async fn generate_level<G: EntryGenerator>(
    generator: &G,
    client: &dyn TextGenerator,
    words: &[SourceWord],
    level: u8,
    output_dir: &Path,
    policy: &RetryPolicy,
    pacing: &Pacing,
) -> Result<LevelSummary, LoadError> {
    let stem = generator.output_stem();
    let progress = progress_path(output_dir, stem, level);
    let total_batches = words.len().div_ceil(pacing.batch_size);

    let mut entries = Vec::with_capacity(words.len());
    let mut failed = 0;

    let provider = client.metadata();
    tracing::info!(
        "Generating {} entries for HSK {} with {}/{}: {} words in {} batches",
        generator.language(),
        level,
        provider.name,
        provider.model,
        words.len(),
        total_batches
    );

    for (batch_index, batch) in words.chunks(pacing.batch_size).enumerate() {
        tracing::info!("Batch {}/{} ({} words)", batch_index + 1, total_batches, batch.len());

        for (i, word) in batch.iter().enumerate() {
            let generated = generate_entry(generator, client, word, Some(level), policy).await;

            if let Some(reason) = &generated.failure {
                failed += 1;
                tracing::warn!("Failed {} after {} attempts: {}", word.chinese_word, generated.attempts, reason);
            } else {
                tracing::info!("Generated {} ({} attempts)", word.chinese_word, generated.attempts);
            }
            entries.push(generated.entry);

            if i + 1 < batch.len() {
                tokio::time::sleep(pacing.item_delay).await;
            }
        }

        write_json(&progress, &entries)?;
        tracing::debug!("Progress saved: {} entries", entries.len());

        if batch_index + 1 < total_batches {
            tracing::info!("Waiting {:?} before next batch...", pacing.batch_delay);
            tokio::time::sleep(pacing.batch_delay).await;
        }
    }

    let output = output_path(output_dir, stem, level);
    write_json(&output, &entries)?;

    let summary = LevelSummary {
        level,
        generated: entries.len() - failed,
        failed,
        output,
    };

    tracing::info!(
        "HSK {} done: {} generated, {} failed, saved to {}",
        level,
        summary.generated,
        summary.failed,
        summary.output.display()
    );

    Ok(summary)
}

/// Run [`generate_level`] over `levels`; levels without a source file are skipped
pub async fn generate_levels<G: EntryGenerator>(
    generator: &G,
    client: &dyn TextGenerator,
    loader: &HskLoader,
    levels: &[HskLevel],
    output_dir: &Path,
    policy: &RetryPolicy,
    pacing: &Pacing,
) -> Result<Vec<LevelSummary>, LoadError> {
    let mut summaries = Vec::new();

    for level in levels {
        let words = match loader.source_words(*level) {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", level.as_str(), e);
                continue;
            }
        };

        if words.is_empty() {
            tracing::warn!("No words found for {}", level.as_str());
            continue;
        }

        let summary =
            generate_level(generator, client, &words, level.number(), output_dir, policy, pacing).await?;
        summaries.push(summary);
    }

    Ok(summaries)
}
