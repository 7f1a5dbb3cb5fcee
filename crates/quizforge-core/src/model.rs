//! Core data model types for quizforge.
//!
//! Questions, responses and evaluation results are all tagged with a
//! [`QuestionType`]. The tag is the only thing a caller needs in order to route
//! a question to its handlers in the registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminator identifying which question variant a value belongs to.
///
/// `Matching`, `ShortAnswer` and `DiagramLabelling` are reserved: they parse
/// and serialize, but ship without a registered handler bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    #[serde(alias = "fill-blank")]
    Completion,
    Matching,
    ShortAnswer,
    DiagramLabelling,
}

impl QuestionType {
    /// Every known tag, in display order.
    pub const ALL: [QuestionType; 5] = [
        QuestionType::MultipleChoice,
        QuestionType::Completion,
        QuestionType::Matching,
        QuestionType::ShortAnswer,
        QuestionType::DiagramLabelling,
    ];

    /// The canonical wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::Completion => "completion",
            QuestionType::Matching => "matching",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::DiagramLabelling => "diagram-labelling",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "completion" | "fill-blank" | "fill_blank" => Ok(QuestionType::Completion),
            "matching" => Ok(QuestionType::Matching),
            "short-answer" | "short_answer" => Ok(QuestionType::ShortAnswer),
            "diagram-labelling" | "diagram-labeling" | "diagram_labelling" => {
                Ok(QuestionType::DiagramLabelling)
            }
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Question difficulty as assigned by the generation pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// The slice of source text a question was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContext {
    /// Start offset into the source text.
    pub start: usize,
    /// End offset into the source text.
    pub end: usize,
    /// The excerpt itself.
    #[serde(default)]
    pub excerpt: String,
}

/// One of the four option positions of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
    #[serde(alias = "c")]
    C,
    #[serde(alias = "d")]
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    /// Zero-based position in the option list.
    pub fn index(&self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(OptionLetter::A),
            "B" => Ok(OptionLetter::B),
            "C" => Ok(OptionLetter::C),
            "D" => Ok(OptionLetter::D),
            other => Err(format!("unknown option: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Question payloads
// ---------------------------------------------------------------------------

/// Payload of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceContent {
    /// Option texts, in A-D order.
    pub options: Vec<String>,
    /// The single correct option.
    pub correct_answer: OptionLetter,
}

impl MultipleChoiceContent {
    /// Text for an option, if the question carries a non-empty one.
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        self.options
            .get(letter.index())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Payload of a completion (fill-in-the-blank) question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionContent {
    /// Sentence with one blank marker (a run of three or more underscores) per blank.
    pub template: String,
    /// Blanks in order of appearance.
    #[serde(default)]
    pub blanks: Vec<Blank>,
}

/// A single blank in a completion question.
///
/// Upstream producers describe the acceptance set either as an explicit
/// `acceptedAnswers` list or as a primary `answer` plus `alternatives`. Both
/// shapes are merged into `accepted_answers` on deserialization, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBlank")]
pub struct Blank {
    /// Matched against `BlankAnswer::blank_id` when grading.
    pub id: String,
    /// Character offset of the blank in the template.
    pub position: usize,
    /// Never empty.
    pub accepted_answers: Vec<String>,
    /// Compare without case folding. Whitespace is trimmed either way.
    pub case_sensitive: bool,
    /// Shown under the rendered template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Blank {
    pub fn new(id: impl Into<String>, position: usize, accepted: &[&str]) -> Self {
        Self {
            id: id.into(),
            position,
            accepted_answers: accepted.iter().map(|s| s.to_string()).collect(),
            case_sensitive: false,
            hint: None,
        }
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The answer shown first when displaying the acceptance set.
    pub fn primary_answer(&self) -> &str {
        self.accepted_answers.first().map(String::as_str).unwrap_or("")
    }

    /// How many accepted answers exist beyond the primary one.
    pub fn alternate_count(&self) -> usize {
        self.accepted_answers.len().saturating_sub(1)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlank {
    id: RawId,
    #[serde(default)]
    position: usize,
    #[serde(default)]
    accepted_answers: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, alias = "alternates")]
    alternatives: Vec<String>,
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default)]
    hint: Option<String>,
}

impl TryFrom<RawBlank> for Blank {
    type Error = String;

    fn try_from(raw: RawBlank) -> Result<Self, Self::Error> {
        let id = String::from(raw.id);

        let mut accepted: Vec<String> = Vec::new();
        let candidates = raw
            .answer
            .into_iter()
            .chain(raw.accepted_answers)
            .chain(raw.alternatives);
        for candidate in candidates {
            let trimmed = candidate.trim();
            if !trimmed.is_empty() && !accepted.iter().any(|a| a == trimmed) {
                accepted.push(trimmed.to_string());
            }
        }

        if accepted.is_empty() {
            return Err(format!("blank '{id}' has no accepted answers"));
        }

        Ok(Blank {
            id,
            position: raw.position,
            accepted_answers: accepted,
            case_sensitive: raw.case_sensitive,
            hint: raw
                .hint
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty()),
        })
    }
}

/// Type-specific question payload.
///
/// Questions of a reserved or not-yet-implemented type keep their payload as
/// opaque JSON so they still load and can be routed to a fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuestionContent {
    MultipleChoice(MultipleChoiceContent),
    Completion(CompletionContent),
    Opaque(Value),
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A question as produced by the generation pipeline. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawQuestion")]
pub struct GeneratedQuestion {
    /// Unique within a question set.
    pub id: String,
    /// Routing key into the registry.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// The prompt text.
    pub question: String,
    pub difficulty: Difficulty,
    /// Shown after grading; may be empty.
    pub explanation: String,
    /// Where in the source text the question was generated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    pub content: QuestionContent,
}

impl GeneratedQuestion {
    pub fn multiple_choice(
        id: impl Into<String>,
        question: impl Into<String>,
        options: &[&str],
        correct_answer: OptionLetter,
    ) -> Self {
        Self {
            id: id.into(),
            question_type: QuestionType::MultipleChoice,
            question: question.into(),
            difficulty: Difficulty::default(),
            explanation: String::new(),
            source_context: None,
            content: QuestionContent::MultipleChoice(MultipleChoiceContent {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct_answer,
            }),
        }
    }

    pub fn completion(
        id: impl Into<String>,
        question: impl Into<String>,
        template: impl Into<String>,
        blanks: Vec<Blank>,
    ) -> Self {
        Self {
            id: id.into(),
            question_type: QuestionType::Completion,
            question: question.into(),
            difficulty: Difficulty::default(),
            explanation: String::new(),
            source_context: None,
            content: QuestionContent::Completion(CompletionContent {
                template: template.into(),
                blanks,
            }),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_source_context(mut self, context: SourceContext) -> Self {
        self.source_context = Some(context);
        self
    }

    pub fn as_multiple_choice(&self) -> Option<&MultipleChoiceContent> {
        match &self.content {
            QuestionContent::MultipleChoice(content) => Some(content),
            _ => None,
        }
    }

    pub fn as_completion(&self) -> Option<&CompletionContent> {
        match &self.content {
            QuestionContent::Completion(content) => Some(content),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: RawId,
    #[serde(rename = "type", alias = "questionType")]
    question_type: QuestionType,
    #[serde(alias = "prompt")]
    question: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    source_context: Option<SourceContext>,
    #[serde(default)]
    content: Value,
}

impl TryFrom<RawQuestion> for GeneratedQuestion {
    type Error = String;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let id = String::from(raw.id);
        let content = match raw.question_type {
            QuestionType::MultipleChoice => serde_json::from_value(raw.content)
                .map(QuestionContent::MultipleChoice)
                .map_err(|e| format!("question '{id}': invalid multiple-choice content: {e}"))?,
            QuestionType::Completion => serde_json::from_value(raw.content)
                .map(QuestionContent::Completion)
                .map_err(|e| format!("question '{id}': invalid completion content: {e}"))?,
            _ => QuestionContent::Opaque(raw.content),
        };

        Ok(GeneratedQuestion {
            id,
            question_type: raw.question_type,
            question: raw.question,
            difficulty: raw.difficulty,
            explanation: raw.explanation,
            source_context: raw.source_context,
            content,
        })
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The value submitted for one blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankAnswer {
    /// May have drifted from the question's blank ids.
    pub blank_id: String,
    /// Empty when the blank was left unanswered.
    #[serde(default)]
    pub value: String,
}

impl BlankAnswer {
    pub fn new(blank_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            blank_id: blank_id.into(),
            value: value.into(),
        }
    }
}

/// A user's answer in canonical tagged form.
///
/// The engine itself receives responses as raw JSON, since upstream shapes
/// are not guaranteed; this type builds the canonical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionResponse {
    #[serde(rename_all = "camelCase")]
    MultipleChoice { selected_option: String },
    #[serde(alias = "fill-blank")]
    Completion { answers: Vec<BlankAnswer> },
}

impl QuestionResponse {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionResponse::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionResponse::Completion { .. } => QuestionType::Completion,
        }
    }

    /// The canonical raw JSON form of this response.
    pub fn to_raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Responses for a question set, keyed by question index.
///
/// Recording a response for an index that already has one replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSheet {
    responses: BTreeMap<usize, Value>,
}

impl ResponseSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question_index: usize, response: Value) {
        self.responses.insert(question_index, response);
    }

    pub fn get(&self, question_index: usize) -> Option<&Value> {
        self.responses.get(&question_index)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.responses.iter().map(|(i, v)| (*i, v))
    }
}

// ---------------------------------------------------------------------------
// Evaluation results
// ---------------------------------------------------------------------------

/// Every question is worth exactly one point.
pub const MAX_SCORE: f64 = 1.0;

/// Per-blank credit breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCredit {
    /// Blanks answered correctly.
    pub earned: u32,
    /// Blanks in the question.
    pub possible: u32,
    /// One `blank-<id>-correct` / `blank-<id>-incorrect` tag per blank, in blank order.
    pub details: Vec<String>,
}

/// The graded outcome of one question/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvaluationResult {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// True only for a full score.
    pub is_correct: bool,
    /// In `[0, 1]`.
    pub score: f64,
    /// Always [`MAX_SCORE`].
    pub max_score: f64,
    /// Display text of the expected answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// Human-readable verdict for the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Set only by types that award partial credit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_credit: Option<PartialCredit>,
}

impl QuestionEvaluationResult {
    /// Build a result; the score is clamped into `[0, 1]`.
    pub fn new(question_type: QuestionType, score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, MAX_SCORE)
        } else {
            0.0
        };
        Self {
            question_type,
            is_correct: score >= MAX_SCORE,
            score,
            max_score: MAX_SCORE,
            correct_answer: None,
            feedback: None,
            partial_credit: None,
        }
    }

    pub fn with_correct_answer(mut self, correct_answer: impl Into<String>) -> Self {
        self.correct_answer = Some(correct_answer.into());
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_partial_credit(mut self, partial_credit: PartialCredit) -> Self {
        self.partial_credit = Some(partial_credit);
        self
    }

    pub fn band(&self) -> FeedbackBand {
        FeedbackBand::from_score(self.score)
    }
}

/// Score bands that feedback wording and styling key off.
///
/// Lower bounds are inclusive: 1.0 is `Perfect`, `[0.7, 1.0)` is `Good`,
/// `[0.4, 0.7)` is `Partial`, anything below is `NeedsPractice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackBand {
    Perfect,
    Good,
    Partial,
    NeedsPractice,
}

impl FeedbackBand {
    pub const GOOD_THRESHOLD: f64 = 0.7;
    pub const PARTIAL_THRESHOLD: f64 = 0.4;

    pub fn from_score(score: f64) -> Self {
        if score >= MAX_SCORE {
            FeedbackBand::Perfect
        } else if score >= Self::GOOD_THRESHOLD {
            FeedbackBand::Good
        } else if score >= Self::PARTIAL_THRESHOLD {
            FeedbackBand::Partial
        } else {
            FeedbackBand::NeedsPractice
        }
    }
}

/// A persistence-facing answer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnswer {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// The response exactly as submitted, kept for re-processing.
    pub raw: Value,
    /// Precomputed user-facing text for the answer.
    pub display_text: String,
    /// Query-friendly facts (blank count, option count, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl StructuredAnswer {
    pub fn new(question_type: QuestionType, raw: Value, display_text: impl Into<String>) -> Self {
        Self {
            question_type,
            raw,
            display_text: display_text.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultipleChoice.to_string(), "multiple-choice");
        assert_eq!(QuestionType::DiagramLabelling.to_string(), "diagram-labelling");
        assert_eq!(
            "fill-blank".parse::<QuestionType>().unwrap(),
            QuestionType::Completion
        );
        assert_eq!(
            "Multiple_Choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn question_type_serde_accepts_alias() {
        let t: QuestionType = serde_json::from_value(json!("fill-blank")).unwrap();
        assert_eq!(t, QuestionType::Completion);
        assert_eq!(
            serde_json::to_value(QuestionType::ShortAnswer).unwrap(),
            json!("short-answer")
        );
    }

    #[test]
    fn option_letter_parse() {
        assert_eq!(" b ".parse::<OptionLetter>().unwrap(), OptionLetter::B);
        assert_eq!(OptionLetter::from_index(3), Some(OptionLetter::D));
        assert_eq!(OptionLetter::from_index(4), None);
        assert!("E".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn blank_accepts_both_ingest_shapes() {
        let listed: Blank = serde_json::from_value(json!({
            "id": "b1",
            "position": 4,
            "acceptedAnswers": ["quit", "resign", "leave"]
        }))
        .unwrap();
        let primary: Blank = serde_json::from_value(json!({
            "id": "b1",
            "position": 4,
            "answer": "quit",
            "alternatives": ["resign", "leave"]
        }))
        .unwrap();
        assert_eq!(listed, primary);
        assert_eq!(primary.primary_answer(), "quit");
        assert_eq!(primary.alternate_count(), 2);
    }

    #[test]
    fn blank_merges_and_dedups() {
        let blank: Blank = serde_json::from_value(json!({
            "id": 7,
            "answer": " park ",
            "acceptedAnswers": ["park", "garden", ""]
        }))
        .unwrap();
        assert_eq!(blank.id, "7");
        assert_eq!(blank.accepted_answers, vec!["park", "garden"]);
        assert!(!blank.case_sensitive);
    }

    #[test]
    fn blank_without_answers_is_rejected() {
        let result: Result<Blank, _> = serde_json::from_value(json!({
            "id": "b1",
            "acceptedAnswers": ["  "]
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no accepted answers"), "got: {err}");
    }

    #[test]
    fn question_deserializes_by_tag() {
        let q: GeneratedQuestion = serde_json::from_value(json!({
            "id": "q1",
            "type": "fill-blank",
            "question": "Complete the sentence",
            "difficulty": "easy",
            "content": {
                "template": "The ___ is shining.",
                "blanks": [{ "id": "b1", "position": 4, "answer": "sun" }]
            }
        }))
        .unwrap();
        assert_eq!(q.question_type, QuestionType::Completion);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.as_completion().unwrap().blanks.len(), 1);
        assert!(q.as_multiple_choice().is_none());
    }

    #[test]
    fn reserved_type_keeps_opaque_content() {
        let q: GeneratedQuestion = serde_json::from_value(json!({
            "id": "q9",
            "type": "matching",
            "question": "Match the pairs",
            "content": { "pairs": [["a", "1"]] }
        }))
        .unwrap();
        assert_eq!(q.question_type, QuestionType::Matching);
        assert!(matches!(q.content, QuestionContent::Opaque(_)));
    }

    #[test]
    fn mismatched_content_is_an_error() {
        let result: Result<GeneratedQuestion, _> = serde_json::from_value(json!({
            "id": "q1",
            "type": "multiple-choice",
            "question": "?",
            "content": { "template": "___", "blanks": [] }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn question_serializes_to_tagged_shape() {
        let q = GeneratedQuestion::multiple_choice(
            "q1",
            "Capital of France?",
            &["Berlin", "Paris", "Rome", "Madrid"],
            OptionLetter::B,
        );
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "multiple-choice");
        assert_eq!(value["content"]["correctAnswer"], "B");
        let back: GeneratedQuestion = serde_json::from_value(value).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn response_raw_shape() {
        let response = QuestionResponse::Completion {
            answers: vec![BlankAnswer::new("b1", "sun")],
        };
        assert_eq!(
            response.to_raw(),
            json!({ "type": "completion", "answers": [{ "blankId": "b1", "value": "sun" }] })
        );
        let mc = QuestionResponse::MultipleChoice {
            selected_option: "C".into(),
        };
        assert_eq!(
            mc.to_raw(),
            json!({ "type": "multiple-choice", "selectedOption": "C" })
        );
    }

    #[test]
    fn response_sheet_last_write_wins() {
        let mut sheet = ResponseSheet::new();
        sheet.record(0, json!("first"));
        sheet.record(0, json!("second"));
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.get(0), Some(&json!("second")));
    }

    #[test]
    fn evaluation_score_is_clamped() {
        let result = QuestionEvaluationResult::new(QuestionType::Completion, 1.5);
        assert_eq!(result.score, 1.0);
        assert!(result.is_correct);
        let result = QuestionEvaluationResult::new(QuestionType::Completion, f64::NAN);
        assert_eq!(result.score, 0.0);
        assert!(!result.is_correct);
    }

    #[test]
    fn feedback_band_boundaries_are_inclusive() {
        assert_eq!(FeedbackBand::from_score(1.0), FeedbackBand::Perfect);
        assert_eq!(FeedbackBand::from_score(7.0 / 10.0), FeedbackBand::Good);
        assert_eq!(FeedbackBand::from_score(0.69), FeedbackBand::Partial);
        assert_eq!(FeedbackBand::from_score(2.0 / 5.0), FeedbackBand::Partial);
        assert_eq!(FeedbackBand::from_score(0.39), FeedbackBand::NeedsPractice);
        assert_eq!(FeedbackBand::from_score(0.0), FeedbackBand::NeedsPractice);
    }
}
