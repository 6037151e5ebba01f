use chrono::Utc;

use super::archetypes::{ArchetypeMatch, Level};
use super::enrichment::Enrichment;
use super::models::{AssessmentResult, SkillGap};
use super::scoring::ScoreProfile;

/// Merges the local archetype match with the enrichment outcome.
///
/// Precedence:
/// - `scores` always come from the local calculator.
/// - On success, enrichment fields win when present and non-empty; an omitted
///   personality type falls back to the local archetype, an omitted explanation to
///   the archetype summary, and missing skill gaps to gaps derived from the user's
///   own skill ratings.
/// - On fallback, the fallback dataset is used as is.
pub fn assemble(local: &ArchetypeMatch, enrichment: Enrichment, scores: ScoreProfile) -> AssessmentResult {
    let (personality_type, explanation, recommended_careers, skill_gaps, next_steps) = match enrichment {
        Enrichment::Success(success) => {
            let skill_gaps = if success.skill_gaps.is_empty() {
                derive_skill_gaps(&scores)
            } else {
                success.skill_gaps
            };
            (
                success
                    .personality_type
                    .unwrap_or_else(|| local.personality_type.clone()),
                success.explanation.unwrap_or_else(|| local.summary.clone()),
                success.recommended_careers,
                skill_gaps,
                success.next_steps,
            )
        }
        Enrichment::Fallback(fallback) => (
            fallback.personality_type,
            fallback.explanation,
            fallback.recommended_careers,
            fallback.skill_gaps,
            fallback.next_steps,
        ),
    };

    AssessmentResult {
        scores,
        personality_type,
        archetype: local.personality_type.clone(),
        archetype_careers: local.careers.clone(),
        explanation,
        trait_levels: local.trait_levels.clone(),
        recommended_careers,
        skill_gaps,
        next_steps,
        completed_at: Utc::now(),
    }
}

/// One gap per skill that did not level `high`, weakest first.
fn derive_skill_gaps(scores: &ScoreProfile) -> Vec<SkillGap> {
    let mut weak: Vec<(&String, u32)> = scores
        .skills
        .iter()
        .filter(|(_, &rating)| Level::from_skill_rating(rating) != Level::High)
        .map(|(skill, &rating)| (skill, rating))
        .collect();
    // Stable: equal ratings keep category order.
    weak.sort_by_key(|(_, rating)| *rating);

    weak.into_iter()
        .map(|(skill, rating)| SkillGap {
            skill: display_name(skill),
            importance: if rating <= 2 { "High" } else { "Medium" }.to_string(),
            resources: vec![resource_hint(skill).to_string()],
        })
        .collect()
}

fn display_name(category: &str) -> String {
    category
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn resource_hint(category: &str) -> &'static str {
    match category {
        "technical" => "Hands-on courses on freeCodeCamp or Coursera",
        "communication" => "Toastmasters or a business writing workshop",
        "leadership" => "Lead a small cross-team project or volunteer initiative",
        "problem_solving" => "Case-study practice and structured thinking exercises",
        "creativity" => "Design thinking workshops and side projects",
        _ => "Online courses and mentoring",
    }
}
