//! Statistics and extractions derived from generated text.
//!
//! Everything here reads the text and never changes it. Keyword counts are
//! literal, case-sensitive substring counts with no word-boundary check.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::catalog::Category;
use crate::Error;

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[^.!?]+[.!?]*").expect("sentence pattern is valid"));

/// Text-complexity scores in the Flesch family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadabilityMetrics {
    /// Flesch-Kincaid grade level.
    pub grade_level: f64,
    /// Flesch reading ease (higher is easier).
    pub reading_ease: f64,
    /// Words per sentence.
    pub avg_sentence_length: f64,
}

/// What was pulled out of the text for its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extraction {
    WhyQuestions { questions: Vec<String> },
    ProblemCount { count: usize },
    ApplicationCount { count: usize },
}

impl Extraction {
    /// Label shown above or before the extracted value.
    pub fn label(&self) -> &'static str {
        match self {
            Extraction::WhyQuestions { .. } => "Questions that ask 'Why':",
            Extraction::ProblemCount { .. } => "Number of problems created:",
            Extraction::ApplicationCount { .. } => "Number of real-world uses explained:",
        }
    }
}

/// Result of analyzing one generated response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub readability: ReadabilityMetrics,
    pub extraction: Extraction,
}

/// Analyze `text` for `category`.
///
/// Fails with [`Error::InvalidInput`] when the text has no words.
pub fn analyze(text: &str, category: Category) -> Result<Analysis, Error> {
    let readability = readability(text)?;
    let extraction = match category {
        Category::Explanation => Extraction::WhyQuestions {
            questions: why_questions(text),
        },
        Category::Practice => Extraction::ProblemCount {
            count: count_keyword(text, "Problem"),
        },
        Category::Applications => Extraction::ApplicationCount {
            count: count_keyword(text, "Application"),
        },
    };

    Ok(Analysis {
        readability,
        extraction,
    })
}

/// Compute grade level, reading ease, and average sentence length.
pub fn readability(text: &str) -> Result<ReadabilityMetrics, Error> {
    let words = words(text);
    if words.is_empty() {
        return Err(Error::invalid_input(
            "readability is undefined for text without words",
        ));
    }

    let word_count = words.len() as f64;
    let sentences = sentence_count(text) as f64;
    let syllables: usize = words.iter().map(|word| syllable_count(word)).sum();

    let avg_sentence_length = word_count / sentences;
    let avg_syllables_per_word = syllables as f64 / word_count;

    Ok(ReadabilityMetrics {
        grade_level: 0.39 * avg_sentence_length + 11.8 * avg_syllables_per_word - 15.59,
        reading_ease: 206.835 - 1.015 * avg_sentence_length - 84.6 * avg_syllables_per_word,
        avg_sentence_length,
    })
}

/// Sentences split on `.` that mention "why", each trimmed and turned into a question.
pub fn why_questions(text: &str) -> Vec<String> {
    text.split('.')
        .filter(|candidate| candidate.to_lowercase().contains("why"))
        .map(|candidate| format!("{}?", candidate.trim()))
        .collect()
}

/// Non-overlapping occurrences of `keyword`.
pub fn count_keyword(text: &str, keyword: &str) -> usize {
    text.matches(keyword).count()
}

/// Whitespace-separated tokens with punctuation (apostrophes aside) removed.
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| !c.is_ascii_punctuation() || *c == '\'')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Sentence count where fragments of two words or fewer do not count; at least 1.
fn sentence_count(text: &str) -> usize {
    let sentences = SENTENCE
        .find_iter(text)
        .filter(|sentence| words(sentence.as_str()).len() > 2)
        .count();
    sentences.max(1)
}

/// Vowel-group syllable estimate for a single word.
fn syllable_count(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    // Silent trailing "e", except the "-le" ending as in "table".
    let n = letters.len();
    if n > 2 && letters[n - 1] == 'e' && !is_vowel(letters[n - 2]) {
        let le_ending = letters[n - 2] == 'l' && !is_vowel(letters[n - 3]);
        if !le_ending && count > 1 {
            count -= 1;
        }
    }

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_practice_counts_problems() {
        let analysis = analyze("Problem 1. Problem 2. Problem 3.", Category::Practice).unwrap();
        assert_eq!(analysis.extraction, Extraction::ProblemCount { count: 3 });
    }

    #[test]
    fn test_keyword_counts_are_case_sensitive_and_unbounded() {
        assert_eq!(count_keyword("problem Problem PROBLEM", "Problem"), 1);
        assert_eq!(count_keyword("Problems and subProblem", "Problem"), 2);
        assert_eq!(count_keyword("Applications: Application 1", "Application"), 2);
    }

    #[test]
    fn test_applications_counts_applications() {
        let text = "Application 1: bridges. Application 2: fountains.";
        let analysis = analyze(text, Category::Applications).unwrap();
        assert_eq!(analysis.extraction, Extraction::ApplicationCount { count: 2 });
    }

    #[test]
    fn test_explanation_extracts_why_question() {
        let analysis = analyze(
            "This works. Why does it work? Because math.",
            Category::Explanation,
        )
        .unwrap();

        match analysis.extraction {
            Extraction::WhyQuestions { questions } => {
                assert_eq!(questions.len(), 1);
                assert!(questions[0].starts_with("Why does it work"));
                assert!(questions[0].ends_with('?'));
            }
            other => panic!("Expected why questions, got {other:?}"),
        }
    }

    #[test]
    fn test_why_questions_keep_order_and_case_insensitive() {
        let questions = why_questions("WHY is a > 0. Nothing here. So, why roots");
        assert_eq!(questions, vec!["WHY is a > 0?", "So, why roots?"]);
    }

    #[test]
    fn test_no_why_sentences_is_valid() {
        assert!(why_questions("Quadratics have two roots.").is_empty());
    }

    #[test]
    fn test_empty_text_is_invalid_for_every_category() {
        for category in Category::ALL {
            assert!(matches!(analyze("", category), Err(Error::InvalidInput(_))));
            assert!(matches!(
                analyze("  \n ... ", category),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_readability_of_simple_sentence() {
        let metrics = readability("The cat sat on the mat.").unwrap();
        assert!((metrics.avg_sentence_length - 6.0).abs() < TOLERANCE);
        assert!((metrics.reading_ease - 116.145).abs() < TOLERANCE);
        assert!((metrics.grade_level - (-1.45)).abs() < TOLERANCE);
    }

    #[test]
    fn test_short_fragments_do_not_count_as_sentences() {
        // "Yes." is too short to count, so all eight words fall in one sentence.
        let metrics = readability("Yes. The roots of this equation are real.").unwrap();
        assert!((metrics.avg_sentence_length - 8.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_syllable_estimates() {
        assert_eq!(syllable_count("cat"), 1);
        assert_eq!(syllable_count("make"), 1);
        assert_eq!(syllable_count("table"), 2);
        assert_eq!(syllable_count("quadratic"), 3);
        assert_eq!(syllable_count("equation"), 3);
        assert_eq!(syllable_count("42"), 1);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let text = "Why does the parabola open upward? Because a is positive.";
        assert_eq!(
            analyze(text, Category::Explanation).unwrap(),
            analyze(text, Category::Explanation).unwrap()
        );
    }
}
