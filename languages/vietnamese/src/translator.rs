use std::time::Duration;

use lexi_llm::{GenerationOptions, GenerationRequest, TextGenerator, recover_json};
use serde::Serialize;
use serde_json::Value;

const THINK_SYSTEM: &str = "You are a highly skilled translator from Chinese to Vietnamese.
Think carefully about the best translation for the given Chinese word.
Consider all possible meanings and cultural nuances.
You can think out loud about different possible translations.
Be detailed in your reasoning, but conclude with a clear final translation.";

const EXTRACT_SYSTEM: &str = "You are a Vietnamese translation extractor.
I'll give you a detailed thinking process about translating a Chinese word to Vietnamese.
Your job is to extract ONLY the final Vietnamese translation from this thinking process.

Output format:
{
  \"translation\": \"the Vietnamese translation word or phrase\",
  \"confidence\": a number from 1-5 where 5 is highest confidence
}

Just output the JSON object, nothing else.";

const DIRECT_SYSTEM: &str = "You are a translator from Chinese to Vietnamese.
Your task is to provide ONLY the Vietnamese translation of the Chinese word.
Just the translated word or phrase, no explanation, no formatting, no JSON.";

const ANSWER_PREFIXES: &[&str] = &["Vietnamese translation:", "Vietnamese:", "Translation:"];

/// Rows are saved after this many translations
pub const SAVE_EVERY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationResult {
    pub translation: String,
    /// 1-5, 0 when nothing could be produced
    pub confidence: u8,
}

impl TranslationResult {
    pub fn empty() -> Self {
        Self {
            translation: String::new(),
            confidence: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.translation.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TranslationStats {
    pub total: usize,
    pub already_translated: usize,
    pub translated: usize,
    pub errors: usize,
}

/// Translates English meanings of Chinese words into Vietnamese by letting
/// the model reason first and then extracting its answer.
pub struct MeaningTranslator<G> {
    generator: G,
    item_delay: Duration,
}

impl<G: TextGenerator> MeaningTranslator<G> {
    pub fn new(generator: G, item_delay: Duration) -> Self {
        Self {
            generator,
            item_delay,
        }
    }

    pub async fn translate(&self, word: &str, english: &str) -> TranslationResult {
        let Some(thinking) = self.think(word, english).await else {
            tracing::warn!("Thinking step failed for {}, using direct translation", word);
            return self.direct(word, english).await;
        };

        match self.extract(&thinking).await {
            Some(result) => result,
            None => self.direct(word, "").await,
        }
    }

    async fn think(&self, word: &str, english: &str) -> Option<String> {
        let mut prompt = format!("Think about how to translate this Chinese word to Vietnamese: {word}");
        if !english.is_empty() {
            prompt.push_str(&format!("\nMeaning in English: {english}"));
        }
        prompt.push_str("\n\nThink step by step about the best translation:");

        let request = GenerationRequest::new(THINK_SYSTEM, prompt)
            .with_options(GenerationOptions::new(0.7).num_predict(300));

        tracing::info!("Step 1: asking model to think about {}", word);
        match self.generator.generate(&request).await {
            Ok(text) => {
                tracing::debug!("Thinking response:\n{}", text);
                let trimmed = text.trim();
                (!trimmed.is_empty() && trimmed != "<think>").then_some(text)
            }
            Err(e) => {
                tracing::error!("Error in thinking step: {}", e);
                None
            }
        }
    }

    async fn extract(&self, thinking: &str) -> Option<TranslationResult> {
        let prompt = format!(
            "Below is a detailed thinking process about translating a Chinese word to Vietnamese.\n\
             Extract ONLY the final Vietnamese translation word or phrase.\n\n\
             Thinking process:\n{thinking}\n\n\
             Output the Vietnamese translation in JSON format:"
        );
        let request = GenerationRequest::new(EXTRACT_SYSTEM, prompt)
            .with_options(GenerationOptions::new(0.1).num_predict(100));

        tracing::info!("Step 2: asking model to extract the final translation");
        match self.generator.generate(&request).await {
            Ok(text) => {
                tracing::debug!("Extraction response:\n{}", text);
                parse_extraction(&text)
            }
            Err(e) => {
                tracing::error!("Error in extraction step: {}", e);
                None
            }
        }
    }

    async fn direct(&self, word: &str, english: &str) -> TranslationResult {
        let mut prompt = format!("Translate this Chinese word to Vietnamese: {word}");
        if !english.is_empty() {
            prompt.push_str(&format!("\nMeaning in English: {english}"));
        }
        prompt.push_str("\n\nJust respond with the Vietnamese translation, nothing else:");

        let request = GenerationRequest::new(DIRECT_SYSTEM, prompt)
            .with_options(GenerationOptions::new(0.1).num_predict(20));

        tracing::info!("Using direct translation fallback for {}", word);
        match self.generator.generate(&request).await {
            Ok(text) => {
                let translation = clean_direct_answer(&text);
                if translation.is_empty() {
                    TranslationResult::empty()
                } else {
                    TranslationResult {
                        translation,
                        confidence: 2,
                    }
                }
            }
            Err(e) => {
                tracing::error!("Error in fallback translation: {}", e);
                TranslationResult::empty()
            }
        }
    }

    /// Fill the `vietnamese` field of rows that lack one.
    ///
    /// Rows need `simplified`; `english` and `pinyin` give context. When
    /// `level` is set, rows whose `hsk_level` differs are left alone.
    /// `save` is called every [`SAVE_EVERY`] processed rows.
    pub async fn translate_rows<F>(&self, rows: &mut [Value], level: Option<u8>, mut save: F) -> TranslationStats
    where
        F: FnMut(&[Value]),
    {
        let mut stats = TranslationStats {
            total: rows.len(),
            ..Default::default()
        };

        for i in 0..rows.len() {
            let row = &rows[i];
            if level.is_some_and(|level| row_level(row) != Some(level)) {
                continue;
            }
            if has_translation(row) {
                stats.already_translated += 1;
                continue;
            }

            let field = |name: &str| row.get(name).and_then(Value::as_str).unwrap_or("").to_string();
            let simplified = field("simplified");
            if simplified.is_empty() {
                continue;
            }
            let english = field("english");
            let pinyin = field("pinyin");

            tracing::info!(
                "Translating [{}/{}]: {} ({} - {})",
                i + 1,
                stats.total,
                simplified,
                pinyin,
                english
            );

            let result = self.translate(&simplified, &english).await;
            if result.is_empty() {
                stats.errors += 1;
                tracing::error!("  -> Translation failed");
            } else {
                tracing::info!("  -> {} (confidence: {}/5)", result.translation, result.confidence);
                if let Some(object) = rows[i].as_object_mut() {
                    object.insert("vietnamese".to_string(), Value::String(result.translation));
                }
                stats.translated += 1;
            }

            tokio::time::sleep(self.item_delay).await;

            if (i + 1) % SAVE_EVERY == 0 {
                save(&*rows);
            }
        }

        tracing::info!(
            "Total: {}, already translated: {}, newly translated: {}, errors: {}",
            stats.total,
            stats.already_translated,
            stats.translated,
            stats.errors
        );
        stats
    }
}

/// Read `{"translation", "confidence"}` out of a step-2 reply, or accept a
/// short bare answer
pub fn parse_extraction(text: &str) -> Option<TranslationResult> {
    if let Some(recovery) = recover_json(text, &["translation"]) {
        if let Some(translation) = recovery.value.get("translation").and_then(Value::as_str) {
            let confidence = recovery
                .value
                .get("confidence")
                .and_then(|c| c.as_u64().or_else(|| c.as_str().and_then(|s| s.trim().parse().ok())))
                .map_or(3, |c| c.min(5) as u8);

            return Some(TranslationResult {
                translation: translation.trim().to_string(),
                confidence,
            });
        }
    }

    tracing::warn!("Failed to parse JSON response, trying the reply as a bare answer");
    let cleaned = lexi_llm::repair::strip_think_block(text)
        .trim()
        .trim_matches('`')
        .trim();

    if !cleaned.is_empty() && cleaned.split_whitespace().count() <= 5 && cleaned.chars().count() < 50 {
        return Some(TranslationResult {
            translation: cleaned.to_string(),
            confidence: 2,
        });
    }

    None
}

/// First line of a direct answer with any "Vietnamese:"-style prefix removed
pub fn clean_direct_answer(text: &str) -> String {
    let mut answer = lexi_llm::repair::strip_think_block(text).trim();

    for prefix in ANSWER_PREFIXES {
        if answer
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            answer = answer[prefix.len()..].trim();
        }
    }

    answer.lines().next().unwrap_or("").trim().to_string()
}

/// Rows without `hsk_level` count as level 1; unreadable levels match none
fn row_level(row: &Value) -> Option<u8> {
    match row.get("hsk_level") {
        None | Some(Value::Null) => Some(1),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    }
}

/// Existing translations count unless they look like leftover markup
fn has_translation(row: &Value) -> bool {
    row.get("vietnamese")
        .and_then(Value::as_str)
        .map(str::trim)
        .is_some_and(|v| !v.is_empty() && !v.starts_with('<') && !v.starts_with('"'))
}
