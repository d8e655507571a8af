use llm_interface::{failure_result, parse_reply, ScoreRequest, Scorer};
use std::time::Duration;
use tracing::{debug, info, warn};
use trendscout_core::{Candidate, ErrorReporter, ScoreResult, ScorerSettings, Tier, TierCutoffs};

use crate::pacing::Pacer;

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub result: ScoreResult,
    pub tier: Tier,
}

#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// In rank order.
    pub scored: Vec<ScoredCandidate>,
    /// Candidates past the budget, in rank order.
    pub unscored: Vec<Candidate>,
}

/// Sends ranked candidates to the scorer, at most `budget` per run, one at a
/// time with a pause between calls.
pub struct Dispatcher<'a, S> {
    scorer: &'a S,
    settings: &'a ScorerSettings,
    tiers: TierCutoffs,
    pacer: Pacer,
    reporter: ErrorReporter,
}

impl<'a, S: Scorer> Dispatcher<'a, S> {
    pub fn new(
        scorer: &'a S,
        settings: &'a ScorerSettings,
        tiers: TierCutoffs,
        delay: Duration,
    ) -> Self {
        Self {
            scorer,
            settings,
            tiers,
            pacer: Pacer::new(delay),
            reporter: ErrorReporter::new(),
        }
    }

    pub async fn dispatch(&mut self, mut ranked: Vec<Candidate>) -> DispatchOutcome {
        let budget = self.settings.budget.min(ranked.len());
        let unscored = ranked.split_off(budget);

        if !unscored.is_empty() {
            info!(
                budget = self.settings.budget,
                unscored = unscored.len(),
                "Reached analysis limit for this run"
            );
            for candidate in &unscored {
                debug!(post_id = %candidate.post.id, priority = candidate.priority, "Left unscored");
            }
        }

        let mut scored = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let (result, tier) = self.score(&candidate).await;
            scored.push(ScoredCandidate {
                candidate,
                result,
                tier,
            });
        }

        DispatchOutcome { scored, unscored }
    }

    /// One scorer call. Failures come back as a zero score, never as an error.
    pub async fn score(&mut self, candidate: &Candidate) -> (ScoreResult, Tier) {
        let request = ScoreRequest::from_candidate(
            candidate,
            self.settings.context_comments,
            self.settings.comment_excerpt_chars,
        );

        self.pacer.wait().await;
        let result = match self.scorer.score(&request).await {
            Ok(reply) => parse_reply(&reply),
            Err(e) => {
                self.reporter.report(&e);
                warn!(post_id = %candidate.post.id, "Scoring failed: {}", e);
                failure_result(&e)
            }
        };

        let tier = self.tiers.classify(result.score);
        info!(
            post_id = %candidate.post.id,
            community = %candidate.community,
            velocity = candidate.velocity,
            score = result.score,
            tier = %tier,
            "Scored candidate"
        );
        (result, tier)
    }
}
