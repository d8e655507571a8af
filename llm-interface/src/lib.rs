pub mod openai;
pub mod reply;
pub mod request;

pub use openai::OpenAiScorer;
pub use reply::{parse_reply, LabeledFields};
pub use request::ScoreRequest;

use trendscout_core::{CoreError, LlmError, ScoreResult};

/// Remote judge of merchandise potential. Returns the raw reply text; parsing
/// is left to [`parse_reply`] so that every provider degrades the same way.
pub trait Scorer {
    async fn score(&self, request: &ScoreRequest) -> Result<String, CoreError>;
}

/// Zero-score result standing in for a failed scorer call. Rejections by the
/// provider read "API error"; transport or decoding failures read
/// "Analysis failed".
pub fn failure_result(error: &CoreError) -> ScoreResult {
    match error {
        CoreError::Llm(
            LlmError::InvalidApiKey { .. }
            | LlmError::RateLimitExceeded { .. }
            | LlmError::UnexpectedStatus { .. }
            | LlmError::ServiceUnavailable { .. },
        ) => ScoreResult::failed(ScoreResult::API_ERROR),
        _ => ScoreResult::failed(ScoreResult::ANALYSIS_FAILED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_result_labels() {
        let rejected = CoreError::Llm(LlmError::UnexpectedStatus {
            provider: "openai".to_string(),
            status_code: 400,
            body: String::new(),
        });
        let result = failure_result(&rejected);
        assert_eq!(result.score, 0);
        assert_eq!(result.rationale, "API error");

        let timeout = CoreError::Llm(LlmError::RequestTimeout {
            provider: "openai".to_string(),
        });
        assert_eq!(failure_result(&timeout).rationale, "Analysis failed");

        let garbled = CoreError::Llm(LlmError::InvalidResponseFormat {
            provider: "openai".to_string(),
        });
        assert_eq!(failure_result(&garbled).rationale, "Analysis failed");
    }

    #[test]
    fn test_non_scorer_errors_are_analysis_failures() {
        let reddit_status = CoreError::RequestFailed {
            message: "418".to_string(),
            status_code: Some(418),
        };
        assert_eq!(failure_result(&reddit_status).rationale, "Analysis failed");

        let internal = CoreError::Internal {
            message: "boom".to_string(),
        };
        assert_eq!(failure_result(&internal).score, 0);
    }

    struct CannedScorer(Result<String, LlmError>);

    impl Scorer for CannedScorer {
        async fn score(&self, _request: &ScoreRequest) -> Result<String, CoreError> {
            self.0.clone().map_err(CoreError::from)
        }
    }

    fn request() -> ScoreRequest {
        ScoreRequest {
            post_id: "p1".to_string(),
            title: "Touch grass daily".to_string(),
            community: "meirl".to_string(),
            score: 900,
            velocity: 450.0,
            top_comments: Vec::new(),
            buying_signal_count: 0,
            buying_signal_excerpts: Vec::new(),
            paths: Vec::new(),
        }
    }

    fn score_with(scorer: &CannedScorer) -> ScoreResult {
        tokio_test::block_on(async {
            match scorer.score(&request()).await {
                Ok(reply) => parse_reply(&reply),
                Err(e) => failure_result(&e),
            }
        })
    }

    #[test]
    fn test_scorer_reply_and_failure_degrade_alike() {
        let good = CannedScorer(Ok("SCORE: 9\nANALYSIS: Punchy".to_string()));
        let result = score_with(&good);
        assert_eq!(result.score, 9);
        assert_eq!(result.rationale, "Punchy");

        let limited = CannedScorer(Err(LlmError::RateLimitExceeded {
            provider: "openai".to_string(),
        }));
        let result = score_with(&limited);
        assert_eq!(result.score, 0);
        assert_eq!(result.rationale, "API error");
    }
}
