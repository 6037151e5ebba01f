//! Archetype Matcher — discretizes a score profile into trait levels and picks
//! the best-matching career archetype from an ordered catalog.
//!
//! Algorithm:
//! 1. personality/interest: ≥75 → high, ≥50 → medium, else low.
//!    skills (raw 1–5): ≥4 → high, else medium. Values are not leveled.
//! 2. For each archetype, count required traits whose level matches exactly.
//! 3. Strictly highest count wins; on ties the earlier archetype is kept.
//! 4. No archetype with at least one match → `DEFAULT_ARCHETYPE`.
//!
//! `ARCHETYPES` order is part of the observable contract: reordering entries
//! changes tie-break results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scoring::ScoreProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// Leveling for scores normalized to 0–100.
    pub fn from_normalized(score: u32) -> Self {
        if score >= 75 {
            Level::High
        } else if score >= 50 {
            Level::Medium
        } else {
            Level::Low
        }
    }

    /// Leveling for raw 1–5 skill ratings. Skills never level as `Low`.
    pub fn from_skill_rating(rating: u32) -> Self {
        if rating >= 4 {
            Level::High
        } else {
            Level::Medium
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeDefinition {
    pub name: &'static str,
    pub required_traits: &'static [(&'static str, Level)],
    pub careers: &'static [&'static str],
    pub summary: &'static str,
}

/// Outcome of local matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchetypeMatch {
    pub personality_type: String,
    pub trait_levels: BTreeMap<String, Level>,
    pub matched_traits: usize,
    pub careers: Vec<String>,
    pub summary: String,
}

pub const DEFAULT_ARCHETYPE: ArchetypeDefinition = ArchetypeDefinition {
    name: "Balanced Professional",
    required_traits: &[],
    careers: &["Business Analyst", "Project Coordinator", "Operations Specialist"],
    summary: "Your profile is well balanced without one dominant pattern, which suits \
        versatile roles that combine coordination, analysis and collaboration.",
};

use Level::{High, Low, Medium};

pub static ARCHETYPES: &[ArchetypeDefinition] = &[
    ArchetypeDefinition {
        name: "Innovative Technologist",
        required_traits: &[
            ("openness", High),
            ("technology", High),
            ("technical", High),
            ("problem_solving", High),
        ],
        careers: &["Software Engineer", "Data Scientist", "Machine Learning Engineer", "Systems Architect"],
        summary: "You are curious and drawn to technology, and you enjoy solving hard \
            technical problems with new approaches.",
    },
    ArchetypeDefinition {
        name: "Strategic Leader",
        required_traits: &[
            ("conscientiousness", High),
            ("extraversion", High),
            ("business", High),
            ("leadership", High),
        ],
        careers: &["Product Manager", "Management Consultant", "Operations Director", "Entrepreneur"],
        summary: "You are organized and outgoing, with a head for business and the \
            confidence to set direction for a team.",
    },
    ArchetypeDefinition {
        name: "Creative Communicator",
        required_traits: &[
            ("openness", High),
            ("extraversion", Medium),
            ("arts", High),
            ("communication", High),
            ("creativity", High),
        ],
        careers: &["UX Designer", "Content Strategist", "Creative Director", "Brand Manager"],
        summary: "You combine imagination with a talent for expression and do your best \
            work shaping ideas into stories, designs and experiences.",
    },
    ArchetypeDefinition {
        name: "Compassionate Helper",
        required_traits: &[
            ("agreeableness", High),
            ("emotional_stability", Medium),
            ("helping", High),
            ("communication", High),
        ],
        careers: &["Counselor", "Registered Nurse", "Human Resources Specialist", "Teacher"],
        summary: "You are empathetic and supportive, and you find meaning in work that \
            directly improves other people's lives.",
    },
    ArchetypeDefinition {
        name: "Analytical Investigator",
        required_traits: &[
            ("conscientiousness", High),
            ("extraversion", Low),
            ("science", High),
            ("problem_solving", High),
        ],
        careers: &["Research Scientist", "Financial Analyst", "Data Analyst", "Epidemiologist"],
        summary: "You are methodical and independent, and you enjoy digging into data \
            and evidence to understand how things work.",
    },
    ArchetypeDefinition {
        name: "Steady Organizer",
        required_traits: &[
            ("conscientiousness", High),
            ("emotional_stability", High),
            ("business", Medium),
            ("technical", Medium),
        ],
        careers: &["Project Coordinator", "Accountant", "Operations Analyst", "Quality Assurance Specialist"],
        summary: "You are dependable and composed, and you thrive on bringing structure \
            and reliability to complex work.",
    },
];

/// Levels every personality, interest and skill category.
pub fn trait_levels(scores: &ScoreProfile) -> BTreeMap<String, Level> {
    let normalized = scores
        .personality
        .iter()
        .chain(scores.interests.iter())
        .map(|(category, &score)| (category.clone(), Level::from_normalized(score)));
    let skills = scores
        .skills
        .iter()
        .map(|(category, &rating)| (category.clone(), Level::from_skill_rating(rating)));
    normalized.chain(skills).collect()
}

/// Matches against the built-in catalog. Never fails.
pub fn match_archetype(scores: &ScoreProfile) -> ArchetypeMatch {
    match_archetype_in(scores, ARCHETYPES)
}

/// Matches against an arbitrary ordered catalog.
pub fn match_archetype_in(scores: &ScoreProfile, catalog: &[ArchetypeDefinition]) -> ArchetypeMatch {
    let levels = trait_levels(scores);

    let mut best: Option<(&ArchetypeDefinition, usize)> = None;
    for archetype in catalog {
        let matched = count_matches(archetype, &levels);
        // Strictly greater: the first archetype keeps a tie.
        if matched > best.map_or(0, |(_, count)| count) {
            best = Some((archetype, matched));
        }
    }

    let (archetype, matched_traits) = best.unwrap_or((&DEFAULT_ARCHETYPE, 0));
    ArchetypeMatch {
        personality_type: archetype.name.to_string(),
        trait_levels: levels,
        matched_traits,
        careers: archetype.careers.iter().map(|c| c.to_string()).collect(),
        summary: archetype.summary.to_string(),
    }
}

fn count_matches(archetype: &ArchetypeDefinition, levels: &BTreeMap<String, Level>) -> usize {
    archetype
        .required_traits
        .iter()
        .filter(|(dimension, level)| levels.get(*dimension) == Some(level))
        .count()
}
