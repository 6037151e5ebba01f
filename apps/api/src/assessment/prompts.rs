// Prompts for the LLM-backed recommendation service.
// The model must answer in the same JSON shape as the HTTP recommendation endpoint.

pub const RECOMMENDATION_SYSTEM: &str = "You are an experienced career counselor. \
    You interpret psychometric assessment scores and recommend realistic career paths. \
    You MUST respond with valid JSON only, with no text outside the JSON object.";

pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"A user completed a four-part career assessment.

Scores:
- personality (0-100 per trait): {personality_json}
- interests (0-100 per area): {interests_json}
- work values (1-5, 0 = unanswered): {values_json}
- skills (self-rated 1-5, 0 = unanswered): {skills_json}

Raw answers by question id (1-5): {answers_json}

Return a JSON object with exactly these fields:
{
  "recommendedCareers": [{"title": string, "match": number 0-100, "description": string}],
  "personalityType": string,
  "explanation": string,
  "skillGaps": [{"skill": string, "importance": "High" | "Medium" | "Low", "resources": [string]}],
  "nextSteps": [string]
}

Recommend 3 to 5 careers ordered from best to weakest match.
Base every recommendation on the scores above. Do not invent scores."#;
