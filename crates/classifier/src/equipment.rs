use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static EQUIPMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Equipment: (.+?)\.?(?:\n|$)").expect("EQUIPMENT_LINE regex")
});
static LEADING_ARTICLE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\b(?:the|a|an) (.+)")
        .case_insensitive(true)
        .build()
        .expect("LEADING_ARTICLE regex")
});

const FALLBACK_WORDS: usize = 3;

/// Pulls the equipment name out of a vision model description.
///
/// Prefers an explicit `Equipment: <name>.` line, then the noun phrase that
/// follows an article in the first sentence, then the first few words.
pub fn extract_equipment_name(description: &str) -> String {
    if let Some(name) = EQUIPMENT_LINE
        .captures(description)
        .and_then(|caps| caps.get(1))
    {
        return clean(name.as_str());
    }

    let first_sentence = description.split('.').next().unwrap_or_default();
    if let Some(phrase) = LEADING_ARTICLE
        .captures(first_sentence)
        .and_then(|caps| caps.get(1))
    {
        return clean(phrase.as_str());
    }

    description
        .split_whitespace()
        .take(FALLBACK_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

// Models like to wrap the name in markdown emphasis.
fn clean(raw: &str) -> String {
    raw.trim().trim_matches('*').trim().trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_explicit_equipment_line() {
        let description = "Equipment: Leg Press Machine.\nThe leg press targets the quads.";
        assert_eq!(extract_equipment_name(description), "Leg Press Machine");
    }

    #[test]
    fn equipment_line_at_end_of_text() {
        assert_eq!(
            extract_equipment_name("Some intro.\nEquipment: Cable Crossover"),
            "Cable Crossover"
        );
    }

    #[test]
    fn strips_markdown_emphasis_around_name() {
        assert_eq!(
            extract_equipment_name("**Equipment: Smith Machine.**\nUsed for squats."),
            "Smith Machine"
        );
    }

    #[test]
    fn falls_back_to_article_phrase_in_first_sentence() {
        let description = "This is a rowing machine. It works the back.";
        assert_eq!(extract_equipment_name(description), "rowing machine");
    }

    #[test]
    fn article_match_is_case_insensitive() {
        assert_eq!(
            extract_equipment_name("THE PEC DECK is shown. Another sentence."),
            "PEC DECK is shown"
        );
    }

    #[test]
    fn article_must_be_a_whole_word() {
        assert_eq!(
            extract_equipment_name("Plyometric Panama box"),
            "Plyometric Panama box"
        );
    }

    #[test]
    fn falls_back_to_first_three_words() {
        assert_eq!(extract_equipment_name("Kettlebell"), "Kettlebell");
        assert_eq!(
            extract_equipment_name("Adjustable dumbbell bench press setup"),
            "Adjustable dumbbell bench"
        );
    }
}
