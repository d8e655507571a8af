use chrono::{DateTime, Utc};
use llm_interface::Scorer;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, info_span, warn, Instrument};
use trendscout_core::rank::rank;
use trendscout_core::signals::extract;
use trendscout_core::velocity::estimate;
use trendscout_core::{
    AppConfig, Candidate, CommentSort, ContentSource, CoreError, ErrorReporter, ListingKind, Post,
    Qualifier, SeenStore, Tier,
};
use uuid::Uuid;

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::notify::{Alert, Notifier};
use crate::pacing::Pacer;
use crate::summary::RunSummary;

const LISTINGS: [ListingKind; 2] = [ListingKind::Hot, ListingKind::Rising];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Collecting,
    Ranking,
    Scoring,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Collecting => "collecting",
            RunPhase::Ranking => "ranking",
            RunPhase::Scoring => "scoring",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// One scan pass: collect and qualify posts from every configured community,
/// rank the pool, score the head of it and push high-tier results.
pub struct ScanRunner<S, C, N, K> {
    config: AppConfig,
    qualifier: Qualifier,
    source: S,
    scorer: C,
    notifier: N,
    seen: K,
    phase: RunPhase,
    reporter: ErrorReporter,
}

impl<S, C, N, K> ScanRunner<S, C, N, K>
where
    S: ContentSource,
    C: Scorer,
    N: Notifier,
    K: SeenStore,
{
    pub fn new(config: AppConfig, source: S, scorer: C, notifier: N, seen: K) -> Self {
        let qualifier = config.qualifier();
        Self {
            config,
            qualifier,
            source,
            scorer,
            notifier,
            seen,
            phase: RunPhase::Idle,
            reporter: ErrorReporter::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn seen(&self) -> &K {
        &self.seen
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn scorer(&self) -> &C {
        &self.scorer
    }

    pub async fn run(&mut self) -> RunSummary {
        self.run_at(Utc::now()).await
    }

    /// Runs one pass with velocities measured against `now`.
    pub async fn run_at(&mut self, now: DateTime<Utc>) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("scan_run", run_id = %run_id);
        let mut summary = RunSummary::new(run_id, Utc::now());

        self.execute(now, &mut summary).instrument(span).await;
        summary
    }

    async fn execute(&mut self, now: DateTime<Utc>, summary: &mut RunSummary) {
        info!(
            communities = self.config.communities.len(),
            budget = self.config.scorer.budget,
            "Starting selective scan"
        );

        self.enter(RunPhase::Collecting);
        let pool = self.collect(now, summary).await;
        summary.candidates_found = pool.len();

        self.enter(RunPhase::Ranking);
        let ranked = rank(pool, self.config.thresholds.buying_signal_bonus);

        self.enter(RunPhase::Scoring);
        let outcome = {
            let mut dispatcher = Dispatcher::new(
                &self.scorer,
                &self.config.scorer,
                self.config.tiers,
                self.config.pacing.scorer_delay(),
            );
            dispatcher.dispatch(ranked).await
        };
        self.deliver(outcome, summary).await;

        self.enter(RunPhase::Done);
        summary.finished_at = Some(Utc::now());
        info!(
            communities_checked = summary.communities_checked,
            communities_failed = summary.communities_failed,
            posts_observed = summary.posts_observed,
            candidates = summary.candidates_found,
            scored = summary.candidates_scored,
            high = summary.high,
            medium = summary.medium,
            "Scan complete. Found {} high-potential ideas",
            summary.high
        );
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(from = %self.phase, to = %phase, "Run phase");
        self.phase = phase;
    }

    async fn collect(&mut self, now: DateTime<Utc>, summary: &mut RunSummary) -> Vec<Candidate> {
        let mut pool = Vec::new();
        let mut pacer = Pacer::new(self.config.pacing.community_delay());
        let communities = self.config.communities.clone();

        for community in &communities {
            pacer.wait().await;
            summary.communities_checked += 1;

            let posts = match self.fetch_community(community).await {
                Ok(posts) => posts,
                Err(e) => {
                    self.reporter.report(&e);
                    warn!(community = %community, "Error scanning community: {}", e);
                    summary.communities_failed += 1;
                    continue;
                }
            };

            let before = pool.len();
            for post in posts {
                if let Some(candidate) = self.observe(post, now, summary).await {
                    pool.push(candidate);
                }
            }
            debug!(
                community = %community,
                candidates = pool.len() - before,
                "Community collected"
            );
        }

        pool
    }

    /// Hot followed by rising. Either listing failing fails the community.
    async fn fetch_community(&self, community: &str) -> Result<Vec<Post>, CoreError> {
        let mut posts = Vec::new();
        for kind in LISTINGS {
            let listing = self
                .source
                .list_posts(community, kind, self.config.listing_limit)
                .await?;
            posts.extend(listing);
        }
        Ok(posts)
    }

    async fn observe(
        &mut self,
        post: Post,
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) -> Option<Candidate> {
        summary.posts_observed += 1;
        if self.seen.has(&post.id) {
            summary.duplicates_skipped += 1;
            return None;
        }
        self.seen.mark(&post.id);

        let velocity = estimate(&post, now, &self.config.velocity);

        if let Some(exclusion) = self.qualifier.exclusion(&post) {
            summary.posts_excluded += 1;
            debug!(post_id = %post.id, reason = %exclusion, "Excluded");
            return None;
        }
        if velocity < self.qualifier.min_inclusion_velocity() {
            debug!(post_id = %post.id, velocity, "Too slow for any path");
            return None;
        }

        let comments = match self
            .source
            .list_comments(&post.id, CommentSort::Top, self.config.signal_comment_limit)
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                self.reporter.report(&e);
                summary.comment_fetch_failures += 1;
                Vec::new()
            }
        };

        let signals = extract(&comments, &self.config.buying_phrases);
        let qualification = self.qualifier.qualify(&post, velocity, &signals);
        if !qualification.eligible {
            return None;
        }

        info!(
            post_id = %post.id,
            community = %post.community,
            velocity,
            buying_signals = qualification.buying_signal_count,
            "Candidate: {}",
            post.title
        );
        summary.record_paths(&qualification.paths);
        Some(Candidate::new(post, velocity, qualification, comments))
    }

    async fn deliver(&mut self, outcome: DispatchOutcome, summary: &mut RunSummary) {
        summary.candidates_scored = outcome.scored.len();
        summary.unscored = outcome
            .unscored
            .iter()
            .map(|c| c.post.id.clone())
            .collect();

        for scored in &outcome.scored {
            summary.record_tier(scored.tier);
            match scored.tier {
                Tier::High => {
                    let alert = Alert::new(&scored.candidate, &scored.result, scored.tier);
                    match self.notifier.send(&alert).await {
                        Ok(()) => summary.notifications_sent += 1,
                        Err(e) => {
                            self.reporter.report(&e);
                            warn!(post_id = %alert.post_id, "Notification failed: {}", e);
                            summary.notifications_failed += 1;
                        }
                    }
                }
                Tier::Medium => info!(
                    post_id = %scored.candidate.post.id,
                    score = scored.result.score,
                    "Medium potential ({}/10): {}",
                    scored.result.score,
                    scored.candidate.post.title
                ),
                Tier::Low => debug!(
                    post_id = %scored.candidate.post.id,
                    score = scored.result.score,
                    "Low potential"
                ),
            }
        }
    }
}
