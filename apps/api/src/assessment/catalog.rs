//! Question Catalog — the static, immutable set of assessment items.
//!
//! The catalog is partitioned into four disjoint groups, one per step. Category
//! names are unique across groups so that trait levels share a single namespace.

use serde::{Deserialize, Serialize};

/// Item type. Each type maps to exactly one assessment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Trait,
    Interest,
    Value,
    Skill,
}

impl QuestionType {
    /// Likert scale for traits/interests/values, proficiency rating for skills.
    pub fn scale_label(self) -> &'static str {
        match self {
            QuestionType::Skill => "rating",
            _ => "likert",
        }
    }
}

/// The four assessment steps, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Personality,
    Interests,
    Values,
    Skills,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Personality, Step::Interests, Step::Values, Step::Skills];
    pub const FIRST: Step = Step::Personality;
    pub const LAST: Step = Step::Skills;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Step::from_index)
    }

    pub fn question_type(self) -> QuestionType {
        match self {
            Step::Personality => QuestionType::Trait,
            Step::Interests => QuestionType::Interest,
            Step::Values => QuestionType::Value,
            Step::Skills => QuestionType::Skill,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personality => "Personality",
            Step::Interests => "Interests",
            Step::Values => "Work Values",
            Step::Skills => "Skills",
        }
    }
}

pub const PERSONALITY_CATEGORIES: [&str; 5] = [
    "openness",
    "conscientiousness",
    "extraversion",
    "agreeableness",
    "emotional_stability",
];

pub const INTEREST_CATEGORIES: [&str; 5] = ["technology", "arts", "business", "science", "helping"];

pub const VALUE_CATEGORIES: [&str; 5] = [
    "work_life_balance",
    "financial_security",
    "impact",
    "autonomy",
    "stability",
];

pub const SKILL_CATEGORIES: [&str; 5] = [
    "technical",
    "communication",
    "leadership",
    "problem_solving",
    "creativity",
];

/// Minimum and maximum accepted response for every item type.
pub const MIN_RESPONSE: i64 = 1;
pub const MAX_RESPONSE: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    pub category: &'static str,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

const fn q(
    id: &'static str,
    text: &'static str,
    category: &'static str,
    question_type: QuestionType,
) -> Question {
    Question {
        id,
        text,
        category,
        question_type,
    }
}

use QuestionType::{Interest, Skill, Trait, Value};

static STANDARD_QUESTIONS: &[Question] = &[
    // Personality
    q("p1", "I enjoy exploring new ideas and unfamiliar concepts.", "openness", Trait),
    q("p2", "I like experimenting with unconventional ways of doing things.", "openness", Trait),
    q("p3", "I plan my work carefully and follow through on commitments.", "conscientiousness", Trait),
    q("p4", "I pay close attention to details and quality.", "conscientiousness", Trait),
    q("p5", "I feel energized when working with groups of people.", "extraversion", Trait),
    q("p6", "I am comfortable speaking up and taking the lead in conversations.", "extraversion", Trait),
    q("p7", "I go out of my way to help colleagues succeed.", "agreeableness", Trait),
    q("p8", "I prefer cooperation over competition.", "agreeableness", Trait),
    q("p9", "I stay calm under pressure and tight deadlines.", "emotional_stability", Trait),
    q("p10", "I recover quickly from setbacks and criticism.", "emotional_stability", Trait),
    // Interests
    q("i1", "I enjoy building software, gadgets, or technical systems.", "technology", Interest),
    q("i2", "I like learning how new technologies work.", "technology", Interest),
    q("i3", "I enjoy drawing, writing, music, or other creative work.", "arts", Interest),
    q("i4", "I care about visual design and aesthetics.", "arts", Interest),
    q("i5", "I am interested in how companies make money and grow.", "business", Interest),
    q("i6", "I enjoy negotiating, selling, or persuading others.", "business", Interest),
    q("i7", "I like running experiments and analyzing results.", "science", Interest),
    q("i8", "I am curious about how the natural world works.", "science", Interest),
    q("i9", "I find it rewarding to teach, coach, or care for people.", "helping", Interest),
    q("i10", "I want my work to directly improve other people's lives.", "helping", Interest),
    // Work values
    q("v1", "Having time for life outside of work is essential to me.", "work_life_balance", Value),
    q("v2", "A high salary and financial security are top priorities for me.", "financial_security", Value),
    q("v3", "I want my work to make a meaningful difference in society.", "impact", Value),
    q("v4", "I value the freedom to decide how and when I work.", "autonomy", Value),
    q("v5", "A predictable, secure job matters more to me than rapid change.", "stability", Value),
    // Skills
    q("s1", "Rate your technical and digital skills.", "technical", Skill),
    q("s2", "Rate your written and verbal communication skills.", "communication", Skill),
    q("s3", "Rate your ability to lead and motivate a team.", "leadership", Skill),
    q("s4", "Rate your analytical problem-solving skills.", "problem_solving", Skill),
    q("s5", "Rate your ability to generate original ideas.", "creativity", Skill),
];

/// An immutable view over a question set.
#[derive(Debug, Clone, Copy)]
pub struct QuestionCatalog {
    questions: &'static [Question],
}

impl QuestionCatalog {
    pub const fn new(questions: &'static [Question]) -> Self {
        Self { questions }
    }

    /// The catalog served to every session.
    pub fn standard() -> Self {
        Self::new(STANDARD_QUESTIONS)
    }

    #[cfg(test)]
    pub fn questions(&self) -> &'static [Question] {
        self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn get(&self, id: &str) -> Option<&'static Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Questions belonging to one step, in catalog order.
    pub fn for_step(&self, step: Step) -> impl Iterator<Item = &'static Question> {
        let question_type = step.question_type();
        self.questions
            .iter()
            .filter(move |question| question.question_type == question_type)
    }

    /// Questions of one category (within one item type), in catalog order.
    pub fn for_category(
        &self,
        question_type: QuestionType,
        category: &'static str,
    ) -> impl Iterator<Item = &'static Question> {
        self.questions.iter().filter(move |question| {
            question.question_type == question_type && question.category == category
        })
    }
}
