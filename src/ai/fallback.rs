//! Offline replies: image-request deflection and keyword-driven templates
//! used when no AI credential is configured.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_IMAGE_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)generate image|create image|show image|draw|picture|visual").unwrap()
});

// first match wins
static RE_WORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)what does "?([a-zA-Z]+)"? mean"#,
        r#"(?i)define "?([a-zA-Z]+)"?"#,
        r#"(?i)meaning of "?([a-zA-Z]+)"?"#,
        r#"(?i)what is "?([a-zA-Z]+)"?"#,
        r#"(?i)synonyms? for "?([a-zA-Z]+)"?"#,
        r#"(?i)examples? (?:of|with) "?([a-zA-Z]+)"?"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Meaning,
    Synonym,
    Example,
    Grammar,
    Greeting,
    Help,
}

pub fn is_image_request(text: &str) -> bool {
    RE_IMAGE_INTENT.is_match(text)
}

/// The subject of an image request, with the first trigger phrase removed
pub fn image_subject(text: &str) -> String {
    RE_IMAGE_INTENT.replace(text, "").trim().to_string()
}

pub fn image_reply(text: &str) -> String {
    let subject = image_subject(text);
    format!(
        "I'd love to generate an image for \"{subject}\", but I can only work with text. However, I can help you with:\n\n\
         • Detailed descriptions of \"{subject}\"\n\
         • Creative writing about the concept\n\
         • Finding related vocabulary words\n\
         • Suggesting where to find similar images online\n\n\
         Would you like me to describe \"{subject}\" in detail instead?"
    )
}

pub fn extract_word(text: &str) -> Option<String> {
    RE_WORD_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|word| word.as_str().to_string())
}

pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|keyword| lower.contains(keyword));

    if has(&["mean", "define", "what is"]) {
        Intent::Meaning
    } else if has(&["synonym", "similar word"]) {
        Intent::Synonym
    } else if has(&["example", "sentence"]) {
        Intent::Example
    } else if has(&["grammar", "usage"]) {
        Intent::Grammar
    } else if lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| matches!(word, "hello" | "hi" | "hey"))
    {
        Intent::Greeting
    } else {
        Intent::Help
    }
}

pub fn reply(text: &str) -> String {
    let word = extract_word(text);
    let intent = classify(text);
    tracing::debug!(?intent, word = word.as_deref(), "offline reply");

    match (intent, word) {
        (Intent::Meaning, Some(word)) => format!(
            "I'd be happy to help you with \"{word}\"! While I don't have my full AI powers available right now, I recommend:\n\n\
             • Use the Search tab to look up \"{word}\" in our dictionary\n\
             • The dictionary will provide definitions, pronunciations, and examples\n\
             • You can also bookmark it for later reference\n\n\
             For AI-powered responses, add a Gemini API key to your configuration!"
        ),
        (Intent::Meaning, None) => "I can help you find word meanings! Try asking: \"What does [word] mean?\" or use the Search tab to look up any word in our dictionary.".to_string(),
        (Intent::Synonym, Some(word)) => format!(
            "Looking for synonyms for \"{word}\"? Here's what I suggest:\n\n\
             • Search for \"{word}\" in the Search tab\n\
             • Our dictionary often includes synonyms in the word definitions\n\
             • You can also try searching for related words\n\n\
             With a Gemini API key, I could provide comprehensive synonym lists instantly!"
        ),
        (Intent::Synonym, None) => "I can help you find synonyms! Try asking \"What are synonyms for [word]?\" For now, use the Search tab to look up words - many definitions include synonyms and related terms.".to_string(),
        (Intent::Example, Some(word)) => format!(
            "Want to see \"{word}\" in context? Here are some quick examples:\n\n\
             • \"The {word} was impressive.\"\n\
             • \"She demonstrated great {word}.\"\n\
             • \"This is a perfect example of {word}.\"\n\n\
             For more detailed and contextual examples, search for \"{word}\" in the Search tab, or add a Gemini API key for AI-generated examples!"
        ),
        (Intent::Example, None) => "I can help create example sentences! Tell me which word you'd like to see in context. You can also use the Search tab to find real examples in our dictionary definitions.".to_string(),
        (Intent::Grammar, _) => "I can help with grammar and word usage! Here are some quick tips:\n\n\
             • For specific words, use the Search tab to see proper usage\n\
             • Pay attention to the part of speech (noun, verb, adjective, etc.)\n\
             • Look at example sentences in definitions\n\n\
             With a Gemini API key, I could provide detailed grammar explanations and usage rules!".to_string(),
        (Intent::Greeting, _) => "Hello! I'm your vocabulary assistant. I can help you with words, meanings, and language questions. Try asking me about any word, or use the Search tab to explore our dictionary!\n\n\
             For full AI capabilities, add a Gemini API key to unlock advanced features.".to_string(),
        (Intent::Help, _) => "I'm here to help with vocabulary and language! You can:\n\n\
             • Ask about word meanings: \"What does [word] mean?\"\n\
             • Request synonyms: \"Synonyms for [word]?\"\n\
             • Get example sentences: \"Example sentences with [word]\"\n\
             • Use the Search tab for full dictionary lookups\n\n\
             Add a Gemini API key for advanced AI responses and detailed explanations!".to_string(),
    }
}
