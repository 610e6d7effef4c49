use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validated structured comparison for one (job description, candidate)
/// pair. Created once per candidate per ranking request and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub candidate_id: String,
    /// 0-10, granularity is up to the model.
    pub score: f32,
    pub skills_evaluation: Vec<String>,
    pub experience_evaluation: Vec<String>,
    pub additional_points: Vec<String>,
    pub overall_assessment: String,
}

/// Raw wire shape produced by the model. Kept separate from
/// [`CandidateEvaluation`] so that validation is a deliberate step and
/// a half-parsed response can never leak into the ranking.
#[derive(Debug, Deserialize)]
struct RawComparison {
    cv_id: Option<String>,
    skills_evaluation: Vec<String>,
    experience_evaluation: Vec<String>,
    #[serde(default)]
    additional_points: Vec<String>,
    overall_assessment: Option<String>,
    ranking_score: serde_json::Value,
}

/// Parse and validate a model response. The response is untrusted: the
/// score must be a finite number and the narrative fields must already
/// have deserialized as lists of strings, otherwise the whole response
/// is rejected and the caller treats it like a failed call.
pub fn parse_comparison(response: &str, expected_id: &str) -> Result<CandidateEvaluation> {
    let raw: RawComparison =
        serde_json::from_str(response).context("Comparison response is not the expected shape")?;

    let score = match raw.ranking_score {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN) as f32,
        other => bail!("ranking_score is not numeric: {other}"),
    };
    if !score.is_finite() {
        bail!("ranking_score is not a finite number");
    }
    let score = score.clamp(0.0, 10.0);

    // The model sometimes echoes a mangled id; the requested one wins.
    if let Some(ref returned) = raw.cv_id {
        if returned != expected_id {
            warn!(
                expected = expected_id,
                returned, "Comparison echoed a different cv_id, overriding"
            );
        }
    }

    Ok(CandidateEvaluation {
        candidate_id: expected_id.to_string(),
        score,
        skills_evaluation: raw.skills_evaluation,
        experience_evaluation: raw.experience_evaluation,
        additional_points: raw.additional_points,
        overall_assessment: raw.overall_assessment.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> String {
        serde_json::json!({
            "cv_id": "cv-1",
            "skills_evaluation": ["strong Rust"],
            "experience_evaluation": ["8 years backend"],
            "additional_points": ["open source maintainer"],
            "overall_assessment": "Great fit.",
            "ranking_score": 8.5
        })
        .to_string()
    }

    #[test]
    fn parses_a_valid_response() {
        let eval = parse_comparison(&valid_body(), "cv-1").unwrap();
        assert_eq!(eval.candidate_id, "cv-1");
        assert_eq!(eval.score, 8.5);
        assert_eq!(eval.skills_evaluation, vec!["strong Rust"]);
        assert_eq!(eval.overall_assessment, "Great fit.");
    }

    #[test]
    fn rejects_non_numeric_score() {
        let body = valid_body().replace("8.5", "\"very good\"");
        assert!(parse_comparison(&body, "cv-1").is_err());
    }

    #[test]
    fn rejects_non_string_narratives() {
        let body = valid_body().replace("[\"strong Rust\"]", "[1,2,3]");
        assert!(parse_comparison(&body, "cv-1").is_err());
    }

    #[test]
    fn rejects_non_json_garbage() {
        assert!(parse_comparison("the candidate is fine", "cv-1").is_err());
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let high = valid_body().replace("8.5", "14.0");
        assert_eq!(parse_comparison(&high, "cv-1").unwrap().score, 10.0);
        let low = valid_body().replace("8.5", "-3.0");
        assert_eq!(parse_comparison(&low, "cv-1").unwrap().score, 0.0);
    }

    #[test]
    fn overrides_a_mismatched_echoed_id() {
        let body = valid_body().replace("cv-1", "cv-mangled");
        let eval = parse_comparison(&body, "cv-1").unwrap();
        assert_eq!(eval.candidate_id, "cv-1");
    }
}
