// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section header detection for resume text.
//!
//! Candidate lines are matched against a canonical catalog of section names
//! through a layered chain: exact match, close substring match, then
//! embedding cosine similarity. Each layer short-circuits the next. Only
//! high-confidence matches drive chunking; lower tiers are kept so callers
//! can surface near-misses for diagnostics.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::embedding::EmbeddingProvider;

/// Default minimum cosine similarity for a line to count as a header.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Lines with more words than this are never considered headers.
pub const MAX_HEADER_WORDS: usize = 5;

/// Similarity above this is high confidence.
const HIGH_CUTOFF: f32 = 0.8;

/// Similarity above this (and at most `HIGH_CUTOFF`) is medium confidence.
const MEDIUM_CUTOFF: f32 = 0.7;

/// Score assigned to close substring matches.
const SUBSTRING_SCORE: f32 = 0.95;

/// Maximum character-length difference for a substring match to count.
const SUBSTRING_SLACK: usize = 2;

/// Canonical section names resumes commonly use.
pub const COMMON_HEADERS: &[&str] = &[
    // Education
    "Education",
    "Academic Background",
    "Educational Background",
    "Academic Qualifications",
    "University",
    "School",
    // Experience
    "Experience",
    "Work Experience",
    "Professional Experience",
    "Employment History",
    "Career",
    "Work History",
    "Employment",
    "Professional Background",
    "Job Experience",
    // Skills
    "Skills",
    "Technical Skills",
    "Core Competencies",
    "Technologies",
    "Programming Languages",
    "Software Skills",
    "Tools",
    "Languages",
    "Technical Proficiencies",
    "Expertise",
    "Competencies",
    // Projects
    "Projects",
    "Personal Projects",
    "Academic Projects",
    "Key Projects",
    "Notable Projects",
    "Selected Projects",
    "Portfolio",
    // Achievements
    "Honors",
    "Awards",
    "Honors and Awards",
    "Achievements",
    "Recognition",
    "Accomplishments",
    "Distinctions",
    // Certifications
    "Certifications",
    "Certificates",
    "Professional Certifications",
    "Licenses",
    "Credentials",
    // Other common sections
    "Publications",
    "Research",
    "Activities",
    "Extracurricular",
    "Volunteer",
    "Volunteering",
    "Leadership",
    "Interests",
    "Summary",
    "Objective",
    "Profile",
    "About",
    "Contact",
    "References",
    "Additional Information",
    "Other",
    "Miscellaneous",
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LEADING_DECOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-=_•*+]+\s*").unwrap());
static TRAILING_DECOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[-=_•*+]+$").unwrap());
static TRAILING_COLONS: Lazy<Regex> = Lazy::new(|| Regex::new(r":+$").unwrap());

/// Normalizes a line for matching: collapses whitespace, strips decorative
/// glyph runs and trailing colons, trims, and lowercases.
///
/// The strip passes repeat until nothing changes, so interleaved runs like
/// `"skills:-•"` fully erode. The result is a fixpoint:
/// `normalize_line(normalize_line(x)) == normalize_line(x)`.
pub fn normalize_line(line: &str) -> String {
    let mut cleaned = WHITESPACE.replace_all(line.trim(), " ").into_owned();

    loop {
        let before = cleaned.len();
        cleaned = LEADING_DECOR.replace(&cleaned, "").into_owned();
        cleaned = TRAILING_DECOR.replace(&cleaned, "").into_owned();
        cleaned = TRAILING_COLONS.replace(&cleaned, "").into_owned();
        if cleaned.len() == before {
            break;
        }
    }

    cleaned.trim().to_lowercase()
}

/// Quick filter that rejects lines which cannot be headers, so the embedding
/// layer never runs on body text.
pub fn is_potential_header(cleaned: &str) -> bool {
    !cleaned.is_empty() && cleaned.split_whitespace().count() <= MAX_HEADER_WORDS
}

/// Confidence tier assigned to a detected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    fn from_score(score: f32) -> Self {
        if score > HIGH_CUTOFF {
            Confidence::High
        } else if score > MEDIUM_CUTOFF {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// A line classified as a section header.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderCandidate {
    /// Position of the line in the source document.
    pub line_index: usize,
    /// The line as it appears in the document.
    pub original_text: String,
    /// Normalized form used for matching.
    pub cleaned_text: String,
    /// Similarity to the best catalog entry, in `[0, 1]`.
    pub similarity_score: f32,
    /// The catalog entry that matched.
    pub matched_reference: String,
    /// Confidence tier; only `High` entries feed chunking.
    pub confidence: Confidence,
}

/// The lowercased catalog paired with per-entry embeddings, computed once.
pub struct ReferenceSet {
    names: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl ReferenceSet {
    /// Embeds the canonical catalog with the given provider.
    pub fn build(provider: &mut dyn EmbeddingProvider) -> Result<Self> {
        let names: Vec<String> = COMMON_HEADERS.iter().map(|h| h.to_lowercase()).collect();
        let embeddings = provider.embed_texts(&names)?;
        Ok(Self { names, embeddings })
    }
}

/// Classifies lines as section headers against a [`ReferenceSet`].
pub struct HeaderClassifier<'a> {
    provider: &'a mut dyn EmbeddingProvider,
    references: ReferenceSet,
    threshold: f32,
}

impl<'a> HeaderClassifier<'a> {
    /// Builds a classifier, embedding the reference catalog up front.
    pub fn new(provider: &'a mut dyn EmbeddingProvider, threshold: f32) -> Result<Self> {
        let references = ReferenceSet::build(provider)?;
        Ok(Self {
            provider,
            references,
            threshold,
        })
    }

    /// Classifies a single line.
    ///
    /// Returns `None` when the line fails the quick pre-filter or scores
    /// below the threshold on every matching layer.
    pub fn classify_line(
        &mut self,
        line_index: usize,
        line: &str,
    ) -> Result<Option<HeaderCandidate>> {
        let cleaned = normalize_line(line);
        if !is_potential_header(&cleaned) {
            return Ok(None);
        }

        let matched = match exact_match(&cleaned, &self.references) {
            Some(hit) => Some(hit),
            None => match substring_match(&cleaned, &self.references) {
                Some(hit) => Some(hit),
                None => self.embedding_match(&cleaned)?,
            },
        };

        Ok(matched.map(|(score, reference)| HeaderCandidate {
            line_index,
            original_text: line.trim().to_string(),
            cleaned_text: cleaned,
            similarity_score: score,
            matched_reference: reference,
            confidence: Confidence::from_score(score),
        }))
    }

    /// Scans every line of `text` and returns all candidates at or above the
    /// threshold, in document order.
    pub fn detect_headers(&mut self, text: &str) -> Result<Vec<HeaderCandidate>> {
        let mut candidates = Vec::new();
        for (line_index, line) in text.lines().enumerate() {
            if let Some(candidate) = self.classify_line(line_index, line)? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }

    /// Embedding layer: cosine similarity of the cleaned line against every
    /// reference embedding, keeping the best.
    fn embedding_match(&mut self, cleaned: &str) -> Result<Option<(f32, String)>> {
        let line_embedding = self.provider.embed_one(cleaned)?;

        let mut best: Option<(f32, usize)> = None;
        for (idx, reference) in self.references.embeddings.iter().enumerate() {
            let score = cosine_similarity(&line_embedding, reference);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, idx));
            }
        }

        Ok(best.and_then(|(score, idx)| {
            if score >= self.threshold {
                Some((score, self.references.names[idx].clone()))
            } else {
                None
            }
        }))
    }
}

/// Extracts the original text of high-confidence candidates, in order.
pub fn confirmed_headers(candidates: &[HeaderCandidate]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.confidence == Confidence::High)
        .map(|c| c.original_text.clone())
        .collect()
}

/// Exact-match layer.
fn exact_match(cleaned: &str, references: &ReferenceSet) -> Option<(f32, String)> {
    references
        .names
        .iter()
        .find(|name| name.as_str() == cleaned)
        .map(|name| (1.0, name.clone()))
}

/// Substring layer: either side contains the other and the lengths are
/// within `SUBSTRING_SLACK` characters.
fn substring_match(cleaned: &str, references: &ReferenceSet) -> Option<(f32, String)> {
    let cleaned_len = cleaned.chars().count();
    references
        .names
        .iter()
        .find(|name| {
            let name_len = name.chars().count();
            let close = cleaned_len.abs_diff(name_len) <= SUBSTRING_SLACK;
            close && (cleaned.contains(name.as_str()) || name.contains(cleaned))
        })
        .map(|name| (SUBSTRING_SCORE, name.clone()))
}

/// Computes cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::DummyProvider;
    use std::collections::HashMap;

    /// Provider returning canned vectors per text, zeros otherwise.
    struct StubProvider {
        vectors: HashMap<String, Vec<f32>>,
        dimension: usize,
    }

    impl StubProvider {
        fn new(dimension: usize, vectors: &[(&str, Vec<f32>)]) -> Self {
            Self {
                vectors: vectors
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                dimension,
            }
        }
    }

    impl EmbeddingProvider for StubProvider {
        fn model_id(&self) -> &str {
            "stub"
        }

        fn batch_size(&self) -> usize {
            64
        }

        fn embed_texts(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(t.as_str())
                        .cloned()
                        .unwrap_or_else(|| vec![0.0; self.dimension])
                })
                .collect())
        }
    }

    #[test]
    fn normalize_strips_decorations_and_case() {
        assert_eq!(normalize_line("  EDUCATION:  "), "education");
        assert_eq!(normalize_line("--- SKILLS ---"), "skills");
        assert_eq!(normalize_line("• Work   Experience •"), "work experience");
        assert_eq!(normalize_line("===="), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "  EDUCATION:  ",
            "--- SKILLS ---",
            "skills•-:•",
            "a:•",
            "•:-=_ mixed :::",
            "",
            "plain text line",
        ];
        for input in inputs {
            let once = normalize_line(input);
            assert_eq!(normalize_line(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn prefilter_rejects_long_and_empty_lines() {
        assert!(is_potential_header("skills"));
        assert!(is_potential_header("honors and awards"));
        assert!(!is_potential_header(""));
        assert!(!is_potential_header(
            "worked on many projects across several different teams"
        ));
    }

    #[test]
    fn exact_match_wins_with_full_score() {
        let mut provider = DummyProvider::new(4);
        let mut classifier = HeaderClassifier::new(&mut provider, DEFAULT_THRESHOLD).unwrap();

        let candidate = classifier
            .classify_line(0, "EDUCATION:")
            .unwrap()
            .expect("exact match");
        assert_eq!(candidate.similarity_score, 1.0);
        assert_eq!(candidate.confidence, Confidence::High);
        assert_eq!(candidate.matched_reference, "education");
        assert_eq!(candidate.cleaned_text, "education");
    }

    #[test]
    fn close_substring_match_is_high_confidence() {
        let mut provider = DummyProvider::new(4);
        let mut classifier = HeaderClassifier::new(&mut provider, DEFAULT_THRESHOLD).unwrap();

        // "skill" is one character off the catalog entry "skills".
        let candidate = classifier
            .classify_line(3, "SKILL")
            .unwrap()
            .expect("substring match");
        assert_eq!(candidate.similarity_score, 0.95);
        assert_eq!(candidate.confidence, Confidence::High);
        assert_eq!(candidate.matched_reference, "skills");
    }

    #[test]
    fn distant_substring_falls_through() {
        // Contains the catalog entry "employment" but is far longer than the
        // two-character slack, so the substring layer must not claim it; zero
        // embeddings leave the embedding layer scoreless.
        let mut provider = DummyProvider::new(4);
        let mut classifier = HeaderClassifier::new(&mut provider, DEFAULT_THRESHOLD).unwrap();

        let result = classifier
            .classify_line(0, "my long employment story")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn embedding_layer_assigns_confidence_tiers() {
        // "education" embeds to the x axis and every other reference to the
        // z axis; test lines live in the x-y plane, so their cosine against
        // "education" is exactly their x component and 0 elsewhere.
        let lowered: Vec<(String, Vec<f32>)> = COMMON_HEADERS
            .iter()
            .map(|h| {
                let vector = if h.eq_ignore_ascii_case("education") {
                    vec![1.0, 0.0, 0.0]
                } else {
                    vec![0.0, 0.0, 1.0]
                };
                (h.to_lowercase(), vector)
            })
            .collect();
        let mut entries: Vec<(&str, Vec<f32>)> = lowered
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        let in_plane = |x: f32| vec![x, (1.0 - x * x).sqrt(), 0.0];
        entries.push(("academics", in_plane(0.9)));
        entries.push(("schoolwork", in_plane(0.75)));
        entries.push(("coursework", in_plane(0.65)));
        entries.push(("gardening", in_plane(0.3)));

        let mut provider = StubProvider::new(3, &entries);
        let mut classifier = HeaderClassifier::new(&mut provider, DEFAULT_THRESHOLD).unwrap();

        let high = classifier.classify_line(0, "Academics").unwrap().unwrap();
        assert_eq!(high.confidence, Confidence::High);
        assert_eq!(high.matched_reference, "education");
        assert!((high.similarity_score - 0.9).abs() < 1e-4);

        let medium = classifier.classify_line(1, "Schoolwork").unwrap().unwrap();
        assert_eq!(medium.confidence, Confidence::Medium);

        let low = classifier.classify_line(2, "Coursework").unwrap().unwrap();
        assert_eq!(low.confidence, Confidence::Low);

        assert!(classifier.classify_line(3, "Gardening").unwrap().is_none());
    }

    #[test]
    fn detect_headers_scans_in_document_order() {
        let mut provider = DummyProvider::new(4);
        let mut classifier = HeaderClassifier::new(&mut provider, DEFAULT_THRESHOLD).unwrap();

        let text = "EDUCATION\nBachelor of Arts in Marketing, minor in Spanish studies\nEXPERIENCE\nXYZ Corp";
        let candidates = classifier.detect_headers(text).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].line_index, 0);
        assert_eq!(candidates[0].original_text, "EDUCATION");
        assert_eq!(candidates[1].line_index, 2);
        assert_eq!(candidates[1].original_text, "EXPERIENCE");
    }

    #[test]
    fn confirmed_headers_keeps_only_high_confidence() {
        let make = |text: &str, confidence| HeaderCandidate {
            line_index: 0,
            original_text: text.to_string(),
            cleaned_text: text.to_lowercase(),
            similarity_score: 0.9,
            matched_reference: text.to_lowercase(),
            confidence,
        };
        let candidates = vec![
            make("EDUCATION", Confidence::High),
            make("Hobbies", Confidence::Medium),
            make("Misc", Confidence::Low),
            make("SKILLS", Confidence::High),
        ];

        assert_eq!(confirmed_headers(&candidates), vec!["EDUCATION", "SKILLS"]);
    }
}
