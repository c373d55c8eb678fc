//! Prompt builder for phrase → gesture-sequence translation.
//!
//! [`PromptBuilder`] renders the user message sent to the model: the closed
//! list of available clips, the approximation rule, the strict output-format
//! rule, one example answer and finally the input phrase.  The fixed system
//! message is [`SYSTEM_INSTRUCTION`].

use crate::gesture::GestureVocabulary;

// ---------------------------------------------------------------------------
// Fixed texts
// ---------------------------------------------------------------------------

/// System role message sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "Ты полезный переводчик с русского на видео-жесты.";

const INTRO: &str = "\
Ты — ассистент, который переводит текст на русский жестовый язык, используя \
ограниченное количество жестов. У тебя есть только следующие видеофайлы с жестами:";

const RULES: &str = "\
Если точных соответствий жестам нет, **постарайся передать общий смысл фразы**, \
используя только доступные жесты. Допускается упрощение или перефразирование, но \
**использовать можно только приведённые выше жесты**. Не добавляй пояснений. \
Ответ должен быть **строго в виде списка файлов .mp4**, в том порядке, в котором \
их нужно склеить.";

const EXAMPLE: &str = "Пример ответа:\n['привет.mp4', 'ты.mp4', 'как.mp4']";

const PHRASE_LABEL: &str = "Входная фраза:";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds translation prompts for a fixed vocabulary.
///
/// Output is a pure function of the vocabulary and the phrase.
///
/// # Example
/// ```rust
/// use sign_translator::gesture::GestureVocabulary;
/// use sign_translator::llm::PromptBuilder;
///
/// let builder = PromptBuilder::new(GestureVocabulary::builtin());
/// let prompt = builder.build("привет как ты");
/// assert!(prompt.contains("- привет.mp4"));
/// assert!(prompt.ends_with("привет как ты"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    vocabulary: GestureVocabulary,
}

impl PromptBuilder {
    pub fn new(vocabulary: GestureVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Build the user message for `phrase`.
    ///
    /// Structure (in order):
    /// 1. Intro
    /// 2. One `- <label>.mp4` line per vocabulary entry
    /// 3. Approximation + output-format rules
    /// 4. Example answer
    /// 5. Input phrase
    pub fn build(&self, phrase: &str) -> String {
        let mut prompt = String::with_capacity(1024 + phrase.len());
        prompt.push_str(INTRO);
        prompt.push_str("\n\n");
        for file in self.vocabulary.file_names() {
            prompt.push_str("- ");
            prompt.push_str(&file);
            prompt.push('\n');
        }
        prompt.push('\n');
        prompt.push_str(RULES);
        prompt.push_str("\n\n");
        prompt.push_str(EXAMPLE);
        prompt.push_str("\n\n");
        prompt.push_str(PHRASE_LABEL);
        prompt.push(' ');
        prompt.push_str(phrase);
        prompt
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vocabulary_entry_is_listed() {
        let vocab = GestureVocabulary::builtin();
        let prompt = PromptBuilder::new(vocab.clone()).build("тест");

        for label in vocab.labels() {
            assert!(
                prompt.contains(&format!("{label}.mp4")),
                "prompt must list {label}.mp4"
            );
        }
    }

    #[test]
    fn entries_keep_vocabulary_order() {
        let vocab = GestureVocabulary::new(["я", "дом", "идти"]).unwrap();
        let prompt = PromptBuilder::new(vocab).build("я иду домой");

        let pos = |needle: &str| prompt.find(needle).unwrap();
        assert!(pos("- я.mp4") < pos("- дом.mp4"));
        assert!(pos("- дом.mp4") < pos("- идти.mp4"));
    }

    #[test]
    fn unlisted_gestures_do_not_appear() {
        let vocab = GestureVocabulary::new(["я"]).unwrap();
        let prompt = PromptBuilder::new(vocab).build("ты");
        assert!(!prompt.contains("- ты.mp4"));
    }

    #[test]
    fn contains_rules_and_phrase_last() {
        let builder = PromptBuilder::new(GestureVocabulary::builtin());
        let prompt = builder.build("где работа");

        assert!(prompt.contains("общий смысл"), "approximation rule");
        assert!(prompt.contains("строго в виде списка"), "output-format rule");
        assert!(prompt.contains("Не добавляй пояснений"), "no prose rule");
        assert!(prompt.ends_with("Входная фраза: где работа"));
    }

    #[test]
    fn build_is_deterministic() {
        let builder = PromptBuilder::new(GestureVocabulary::builtin());
        assert_eq!(builder.build("когда"), builder.build("когда"));
    }
}
