/// Prompt asking the model to compare one candidate against one job
/// description and return the structured comparison shape that
/// [`crate::schema::parse_comparison`] validates.
pub fn build_comparison_prompt(jd_text: &str, cv_text: &str, candidate_id: &str) -> String {
    format!(
        r#"You are an experienced technical recruiter. Compare the candidate CV below against the job description and produce a structured assessment.

INSTRUCTIONS:
1. Judge only what the CV states; do not invent experience
2. Weigh essential requirements of the job description most heavily
3. Score from 0 (no fit) to 10 (exceptional fit); decimals are allowed
4. Output ONLY valid JSON, nothing else
5. Use the exact schema below

SCHEMA:
{{
  "cv_id": "{candidate_id}",
  "skills_evaluation": ["short statement about skills alignment"],
  "experience_evaluation": ["short statement about experience alignment"],
  "additional_points": ["notable extras beyond the requirements"],
  "overall_assessment": "two or three sentence summary",
  "ranking_score": 7.5
}}

RULES:
- Each evaluation list holds 1-6 short statements
- "ranking_score" must be a number between 0 and 10
- Output ONLY the JSON object, no markdown, no explanations

JOB DESCRIPTION:
{jd_text}

CANDIDATE CV (id: {candidate_id}):
{cv_text}

JSON OUTPUT:"#
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{invalid_json}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#
    )
}
