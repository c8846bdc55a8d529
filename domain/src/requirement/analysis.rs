//! Requirement completeness analysis.

use crate::agent::response::extract_json_object;
use serde::{Deserialize, Serialize};

/// Score at or above which a request is considered complete
pub const COMPLETENESS_THRESHOLD: f64 = 0.7;

/// Guidance questions produced for an incomplete request
pub const MIN_GUIDANCE_QUESTIONS: usize = 2;
pub const MAX_GUIDANCE_QUESTIONS: usize = 3;

/// Rough size of the work a request implies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }

    fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "simple" | "low" | "easy" => Complexity::Simple,
            "complex" | "high" | "hard" => Complexity::Complex,
            _ => Complexity::Moderate,
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed-ended question asking the user to fill a missing element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceQuestion {
    pub question: String,
    /// Concrete answer choices (at least two)
    pub options: Vec<String>,
    /// Missing element this question targets
    pub target: Option<String>,
}

impl GuidanceQuestion {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            options,
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn is_closed_ended(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.iter().filter(|o| !o.trim().is_empty()).count() >= 2
    }
}

/// Result of the pre-flight completeness check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    pub is_complete: bool,
    pub completeness_score: f64,
    pub missing_elements: Vec<String>,
    pub guidance_questions: Vec<GuidanceQuestion>,
    pub suggested_capabilities: Vec<String>,
    pub complexity: Complexity,
}

impl RequirementAnalysis {
    /// A complete analysis with the given score
    pub fn complete(score: f64) -> Self {
        Self {
            is_complete: true,
            completeness_score: score,
            missing_elements: Vec::new(),
            guidance_questions: Vec::new(),
            suggested_capabilities: Vec::new(),
            complexity: Complexity::default(),
        }
        .normalize()
    }

    pub fn with_suggested_capability(mut self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        if !self.suggested_capabilities.contains(&capability) {
            self.suggested_capabilities.push(capability);
        }
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Enforce the completeness rules.
    ///
    /// - score is clamped to `0.0..=1.0`
    /// - `is_complete` is exactly `score >= COMPLETENESS_THRESHOLD`
    /// - complete: no guidance questions
    /// - incomplete: 2 to 3 closed-ended questions, padded from
    ///   `missing_elements` when the analyzer produced too few
    pub fn normalize(mut self) -> Self {
        self.completeness_score = if self.completeness_score.is_nan() {
            0.0
        } else {
            self.completeness_score.clamp(0.0, 1.0)
        };
        self.is_complete = self.completeness_score >= COMPLETENESS_THRESHOLD;

        if self.is_complete {
            self.guidance_questions.clear();
            return self;
        }

        self.guidance_questions.retain(|q| q.is_closed_ended());
        for q in &mut self.guidance_questions {
            q.options.retain(|o| !o.trim().is_empty());
        }

        let mut pad = self
            .missing_elements
            .iter()
            .filter(|m| {
                !self
                    .guidance_questions
                    .iter()
                    .any(|q| q.target.as_deref() == Some(m.as_str()))
            })
            .map(|m| question_for_missing(m))
            .collect::<Vec<_>>()
            .into_iter();
        while self.guidance_questions.len() < MIN_GUIDANCE_QUESTIONS {
            match pad.next() {
                Some(q) => self.guidance_questions.push(q),
                None => break,
            }
        }
        for generic in generic_questions() {
            if self.guidance_questions.len() >= MIN_GUIDANCE_QUESTIONS {
                break;
            }
            self.guidance_questions.push(generic);
        }

        self.guidance_questions.truncate(MAX_GUIDANCE_QUESTIONS);
        self
    }
}

fn question_for_missing(element: &str) -> GuidanceQuestion {
    GuidanceQuestion::new(
        format!("Can you provide the {}?", element),
        vec![
            format!("Yes, I will provide the {}", element),
            format!("The {} is unknown", element),
            "Not applicable to my case".to_string(),
        ],
    )
    .with_target(element)
}

fn generic_questions() -> Vec<GuidanceQuestion> {
    vec![
        GuidanceQuestion::new(
            "What outcome are you looking for?",
            vec![
                "Legal opinion".to_string(),
                "Contract review".to_string(),
                "Dispute strategy".to_string(),
                "Document drafting".to_string(),
            ],
        )
        .with_target("desired outcome"),
        GuidanceQuestion::new(
            "Which jurisdiction applies?",
            vec![
                "Mainland China".to_string(),
                "Hong Kong".to_string(),
                "Other / not sure".to_string(),
            ],
        )
        .with_target("jurisdiction"),
    ]
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(alias = "score")]
    completeness_score: f64,
    #[serde(default)]
    missing_elements: Vec<String>,
    #[serde(default, alias = "questions")]
    guidance_questions: Vec<RawQuestion>,
    #[serde(default, alias = "suggested_agents")]
    suggested_capabilities: Vec<String>,
    #[serde(default)]
    complexity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuestion {
    Structured {
        question: String,
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        target: Option<String>,
    },
    Plain(String),
}

/// Parse analyzer output. Returns `None` when no usable analysis is present.
pub fn parse_requirement_analysis(output: &str) -> Option<RequirementAnalysis> {
    let json = extract_json_object(output)?;
    let raw: RawAnalysis = serde_json::from_str(json).ok()?;

    let guidance_questions = raw
        .guidance_questions
        .into_iter()
        .map(|q| match q {
            RawQuestion::Structured {
                question,
                options,
                target,
            } => GuidanceQuestion {
                question,
                options,
                target,
            },
            // Open-ended; dropped by normalize()
            RawQuestion::Plain(question) => GuidanceQuestion::new(question, Vec::new()),
        })
        .collect();

    Some(
        RequirementAnalysis {
            is_complete: false,
            completeness_score: raw.completeness_score,
            missing_elements: raw.missing_elements,
            guidance_questions,
            suggested_capabilities: raw.suggested_capabilities,
            complexity: raw
                .complexity
                .as_deref()
                .map(Complexity::parse_lenient)
                .unwrap_or_default(),
        }
        .normalize(),
    )
}
