use chrono::{DateTime, Duration, TimeZone, Utc};
use llm_interface::{ScoreRequest, Scorer};
use scan_service::{Alert, Notifier, RunPhase, ScanRunner};
use std::cell::RefCell;
use std::collections::HashMap;
use trendscout_core::{
    AppConfig, Comment, CommentSort, ContentSource, CoreError, InMemorySeenStore, ListingKind,
    NotifyError, Pacing, Post, QualificationPath, RedditApiError, SeenStore,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn post(id: &str, community: &str, score: i64, hours_old: i64, comments: u32) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Professional overthinker number {}", id),
        score,
        created_at: now() - Duration::hours(hours_old),
        comment_count: comments,
        community: community.to_string(),
        permalink: format!("/r/{}/comments/{}/", community, id),
    }
}

#[derive(Default)]
struct FakeSource {
    listings: HashMap<(String, ListingKind), Vec<Post>>,
    broken: Vec<String>,
    comments: HashMap<String, Vec<Comment>>,
    broken_comments: Vec<String>,
    comment_calls: RefCell<Vec<String>>,
}

impl FakeSource {
    fn with(mut self, community: &str, kind: ListingKind, posts: Vec<Post>) -> Self {
        self.listings.insert((community.to_string(), kind), posts);
        self
    }

    fn with_comments(mut self, post_id: &str, bodies: &[&str]) -> Self {
        self.comments.insert(
            post_id.to_string(),
            bodies.iter().map(|b| Comment::new(*b, 10)).collect(),
        );
        self
    }
}

impl ContentSource for FakeSource {
    async fn list_posts(
        &self,
        community: &str,
        kind: ListingKind,
        _limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        if self.broken.iter().any(|c| c == community) {
            return Err(RedditApiError::Forbidden {
                resource: community.to_string(),
            }
            .into());
        }
        Ok(self
            .listings
            .get(&(community.to_string(), kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_comments(
        &self,
        post_id: &str,
        sort: CommentSort,
        _limit: u32,
    ) -> Result<Vec<Comment>, CoreError> {
        assert_eq!(sort, CommentSort::Top);
        self.comment_calls.borrow_mut().push(post_id.to_string());
        if self.broken_comments.iter().any(|id| id == post_id) {
            return Err(RedditApiError::RequestTimeout.into());
        }
        Ok(self.comments.get(post_id).cloned().unwrap_or_default())
    }
}

struct FakeScorer {
    reply: String,
    calls: RefCell<Vec<String>>,
}

impl FakeScorer {
    fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Scorer for FakeScorer {
    async fn score(&self, request: &ScoreRequest) -> Result<String, CoreError> {
        self.calls.borrow_mut().push(request.post_id.clone());
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
struct FakeNotifier {
    sent: RefCell<Vec<Alert>>,
    fail: bool,
}

impl Notifier for FakeNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), CoreError> {
        if self.fail {
            return Err(NotifyError::WebhookRejected { status_code: 500 }.into());
        }
        self.sent.borrow_mut().push(alert.clone());
        Ok(())
    }
}

fn config(communities: &[&str]) -> AppConfig {
    AppConfig {
        communities: communities.iter().map(|c| c.to_string()).collect(),
        pacing: Pacing::none(),
        ..AppConfig::default()
    }
}

type Runner = ScanRunner<FakeSource, FakeScorer, FakeNotifier, InMemorySeenStore>;

fn runner(config: AppConfig, source: FakeSource, reply: &str) -> Runner {
    ScanRunner::new(
        config,
        source,
        FakeScorer::replying(reply),
        FakeNotifier::default(),
        InMemorySeenStore::new(),
    )
}

#[tokio::test]
async fn test_high_score_reaches_notifier() {
    // 3000 upvotes in 2 hours: velocity 1500.
    let source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![post("p1", "meirl", 3000, 2, 150)],
    );
    let mut runner = runner(
        config(&["meirl"]),
        source,
        "SCORE: 9\nANALYSIS: Great hook\n",
    );
    assert_eq!(runner.phase(), RunPhase::Idle);

    let summary = runner.run_at(now()).await;

    assert_eq!(runner.phase(), RunPhase::Done);
    assert_eq!(summary.candidates_found, 1);
    assert_eq!(summary.candidates_scored, 1);
    assert_eq!(summary.high, 1);
    assert_eq!(summary.notifications_sent, 1);
    assert!(summary.finished_at.is_some());

    let sent = runner.notifier().sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].post_id, "p1");
    assert_eq!(sent[0].result.score, 9);
    assert_eq!(sent[0].result.rationale, "Great hook");
    assert_eq!(sent[0].result.variations, "");
    assert!((sent[0].velocity - 1500.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_missing_score_is_low_and_silent() {
    let source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![post("p1", "meirl", 3000, 2, 150)],
    );
    let mut runner = runner(config(&["meirl"]), source, "ANALYSIS: Decent but generic");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.candidates_scored, 1);
    assert_eq!(summary.low, 1);
    assert_eq!(summary.notifications_sent, 0);
    assert!(runner.notifier().sent.borrow().is_empty());
}

#[tokio::test]
async fn test_duplicate_across_listings_is_qualified_once() {
    let shared = post("p1", "antiwork", 3000, 2, 150);
    let source = FakeSource::default()
        .with("antiwork", ListingKind::Hot, vec![shared.clone()])
        .with("antiwork", ListingKind::Rising, vec![shared]);
    let mut runner = runner(config(&["antiwork"]), source, "SCORE: 5");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.posts_observed, 2);
    assert_eq!(summary.duplicates_skipped, 1);
    assert_eq!(summary.candidates_found, 1);
    assert_eq!(runner.seen().len(), 1);
    assert_eq!(*runner.scorer().calls.borrow(), vec!["p1"]);
}

#[tokio::test]
async fn test_budget_caps_scorer_calls() {
    let posts: Vec<Post> = (0..5)
        .map(|i| post(&format!("p{}", i), "meirl", 2400 + i * 200, 2, 150))
        .collect();
    let source = FakeSource::default().with("meirl", ListingKind::Hot, posts);
    let mut config = config(&["meirl"]);
    config.scorer.budget = 2;
    let mut runner = runner(config, source, "SCORE: 7");

    let summary = runner.run_at(now()).await;

    // Highest velocity first.
    assert_eq!(*runner.scorer().calls.borrow(), vec!["p4", "p3"]);
    assert_eq!(summary.candidates_found, 5);
    assert_eq!(summary.candidates_scored, 2);
    assert_eq!(summary.unscored, vec!["p2", "p1", "p0"]);
    assert_eq!(summary.medium, 2);
}

#[tokio::test]
async fn test_buying_signal_path_and_priority() {
    // 800 upvotes in 2 hours: velocity 400, below the normal threshold.
    let source = FakeSource::default()
        .with(
            "funny",
            ListingKind::Hot,
            vec![
                post("wanted", "funny", 800, 2, 60),
                post("fast", "funny", 2200, 2, 60),
            ],
        )
        .with_comments(
            "wanted",
            &["I NEED this on a shirt", "Where can I buy this?", "lol"],
        );
    let mut runner = runner(config(&["funny"]), source, "SCORE: 2");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.candidates_found, 2);
    assert_eq!(summary.path_count(QualificationPath::BuyingSignal), 1);
    assert_eq!(summary.path_count(QualificationPath::HighVelocity), 1);
    // 400 + 1000 bonus outranks 1100.
    assert_eq!(*runner.scorer().calls.borrow(), vec!["wanted", "fast"]);
}

#[tokio::test]
async fn test_failing_community_is_skipped() {
    let mut source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![post("p1", "meirl", 3000, 2, 150)],
    );
    source.broken.push("private_sub".to_string());
    let mut runner = runner(config(&["private_sub", "meirl"]), source, "SCORE: 8");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.communities_checked, 2);
    assert_eq!(summary.communities_failed, 1);
    assert_eq!(summary.candidates_found, 1);
    assert_eq!(summary.notifications_sent, 1);
}

#[tokio::test]
async fn test_comment_fetches_are_gated() {
    let mut brand = post("brand", "meirl", 3000, 2, 150);
    brand.title = "Nike just dropped the best ad ever".to_string();
    let source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![
            brand,
            post("slow", "meirl", 100, 2, 150),
            post("stale", "meirl", 90000, 30, 150),
            post("quiet", "meirl", 3000, 2, 5),
            post("good", "meirl", 3000, 2, 150),
        ],
    );
    let mut runner = runner(config(&["meirl"]), source, "SCORE: 3");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.posts_excluded, 2);
    assert_eq!(summary.candidates_found, 1);
    assert_eq!(*runner.source().comment_calls.borrow(), vec!["good"]);
}

#[tokio::test]
async fn test_comment_failure_counts_as_no_comments() {
    let mut source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![post("p1", "meirl", 3000, 2, 150)],
    );
    source.broken_comments.push("p1".to_string());
    let mut runner = runner(config(&["meirl"]), source, "SCORE: 8");

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.comment_fetch_failures, 1);
    assert_eq!(summary.candidates_found, 1);
    assert_eq!(summary.path_count(QualificationPath::HighVelocity), 1);
}

#[tokio::test]
async fn test_notifier_failure_is_counted() {
    let source = FakeSource::default().with(
        "meirl",
        ListingKind::Hot,
        vec![post("p1", "meirl", 3000, 2, 150)],
    );
    let mut runner = ScanRunner::new(
        config(&["meirl"]),
        source,
        FakeScorer::replying("SCORE: 10"),
        FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        },
        InMemorySeenStore::new(),
    );

    let summary = runner.run_at(now()).await;

    assert_eq!(summary.high, 1);
    assert_eq!(summary.notifications_sent, 0);
    assert_eq!(summary.notifications_failed, 1);
    assert_eq!(runner.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_communities_are_paced() {
    let mut config = config(&["meirl", "nursing", "teachers"]);
    config.pacing.community_delay_ms = 60;
    let mut runner = runner(config, FakeSource::default(), "SCORE: 1");

    let started = tokio::time::Instant::now();
    let summary = runner.run_at(now()).await;

    assert_eq!(summary.communities_checked, 3);
    assert!(started.elapsed() >= std::time::Duration::from_millis(120));
}
