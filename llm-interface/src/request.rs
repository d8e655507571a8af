use serde::Serialize;
use trendscout_core::signals::truncate_chars;
use trendscout_core::{Candidate, QualificationPath};

pub const SYSTEM_PROMPT: &str = "You are an expert at identifying phrases that sell on t-shirts. \
Be very selective - most ideas are not good enough.";

/// Everything the scorer gets to see about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRequest {
    pub post_id: String,
    pub title: String,
    pub community: String,
    pub score: i64,
    pub velocity: f64,
    pub top_comments: Vec<String>,
    pub buying_signal_count: usize,
    pub buying_signal_excerpts: Vec<String>,
    pub paths: Vec<QualificationPath>,
}

impl ScoreRequest {
    /// Takes the first `max_comments` comments, each cut to `excerpt_chars`.
    pub fn from_candidate(candidate: &Candidate, max_comments: usize, excerpt_chars: usize) -> Self {
        Self {
            post_id: candidate.post.id.clone(),
            title: candidate.post.title.clone(),
            community: candidate.community.clone(),
            score: candidate.post.score,
            velocity: candidate.velocity,
            top_comments: candidate
                .comments
                .iter()
                .take(max_comments)
                .map(|c| truncate_chars(&c.body, excerpt_chars))
                .collect(),
            buying_signal_count: candidate.qualification.buying_signal_count,
            buying_signal_excerpts: candidate.qualification.excerpts.clone(),
            paths: candidate.qualification.paths.clone(),
        }
    }

    pub fn render_prompt(&self) -> String {
        let comment_context = if self.top_comments.is_empty() {
            "- (no comments fetched)".to_string()
        } else {
            self.top_comments
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let signal_context = if self.buying_signal_count == 0 {
            "None detected".to_string()
        } else {
            let quotes = self
                .buying_signal_excerpts
                .iter()
                .map(|e| format!("  \"{}\"", e))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "{} comment(s) already ask to buy or wear this:\n{}",
                self.buying_signal_count, quotes
            )
        };

        let paths = self
            .paths
            .iter()
            .map(QualificationPath::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You are evaluating text for t-shirt potential. Be VERY selective - only high-quality ideas that people would actually buy and wear.

Reddit Post: "{title}"
Subreddit: r/{community}
Upvotes: {score}
Velocity: {velocity:.0} upvotes/hour
Flagged because: {paths}
Buying signals: {signal_context}
Top comments:
{comment_context}

Evaluate strictly:

1. Can this stand alone on a shirt without explanation?
2. Does it express strong identity, belief, or emotion that someone would PAY to wear?
3. Is it a movement, rallying cry, or cultural statement (like "Let's Go Brandon", "Birds Aren't Real", "Diamond Hands")?
4. Would someone still understand and want this in 3-6 months?
5. Is it original enough to not already be on 100 shirts?

Consider these seller categories:
- Political/social movements
- Professional pride/humor ("Trust me, I'm a nurse")
- Generational identity
- Sports fan reactions
- Relatable life statements
- Counter-culture positions

Score 1-10 (be harsh):
1-5: Generic, won't sell
6-7: Maybe niche appeal
8-9: Strong seller potential
10: Viral hit potential

Format:
SCORE: [number]
ANALYSIS: [2 sentences max on why it works/doesn't]
VARIATIONS: [If 8+, suggest 2 better versions]
TARGET: [If 8+, who specifically would buy this]
ANGLE: [If 8+, the design or marketing angle]"#,
            title = self.title,
            community = self.community,
            score = self.score,
            velocity = self.velocity,
            paths = paths,
            signal_context = signal_context,
            comment_context = comment_context,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use trendscout_core::{Comment, Post, QualificationResult};

    fn candidate(comments: usize) -> Candidate {
        let post = Post {
            id: "q9".to_string(),
            title: "I'm not arguing, I'm explaining why I'm right".to_string(),
            score: 5400,
            created_at: Utc::now(),
            comment_count: 320,
            community: "rareinsults".to_string(),
            permalink: "/r/rareinsults/comments/q9".to_string(),
        };
        let qualification = QualificationResult {
            eligible: true,
            paths: vec![
                QualificationPath::HighVelocity,
                QualificationPath::HighEngagement,
            ],
            buying_signal_count: 1,
            excerpts: vec!["need this on a shirt".to_string()],
            exclusion: None,
        };
        let comments = (0..comments)
            .map(|i| Comment::new(format!("{} {}", i, "y".repeat(300)), 10))
            .collect();
        Candidate::new(post, 1800.0, qualification, comments)
    }

    #[test]
    fn test_comment_window_is_bounded() {
        let request = ScoreRequest::from_candidate(&candidate(25), 10, 150);
        assert_eq!(request.top_comments.len(), 10);
        assert!(request
            .top_comments
            .iter()
            .all(|c| c.chars().count() == 150));
        assert!(request.top_comments[0].starts_with("0 "));
    }

    #[test]
    fn test_prompt_carries_context() {
        let request = ScoreRequest::from_candidate(&candidate(2), 10, 150);
        let prompt = request.render_prompt();
        assert!(prompt.contains("Reddit Post: \"I'm not arguing, I'm explaining why I'm right\""));
        assert!(prompt.contains("Subreddit: r/rareinsults"));
        assert!(prompt.contains("Upvotes: 5400"));
        assert!(prompt.contains("Velocity: 1800 upvotes/hour"));
        assert!(prompt.contains("Flagged because: high_velocity, high_engagement"));
        assert!(prompt.contains("1 comment(s) already ask to buy"));
        assert!(prompt.contains("\"need this on a shirt\""));
        assert!(prompt.contains("SCORE: [number]"));
    }

    #[test]
    fn test_prompt_without_comments() {
        let request = ScoreRequest::from_candidate(&candidate(0), 10, 150);
        assert!(request.render_prompt().contains("(no comments fetched)"));
    }
}
