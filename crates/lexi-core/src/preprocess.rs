use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Headword cleanup shared by every dataset
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // NFC keeps Vietnamese tone marks composed
        let text: String = text.nfc().collect();

        text.replace(['\n', '\r', '\u{feff}'], "").trim().to_string()
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

pub fn normalize_word(text: &str) -> String {
    DefaultPreprocessor.process(text)
}
