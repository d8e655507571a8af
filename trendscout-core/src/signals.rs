use crate::phrases::PhraseSet;
use crate::types::Comment;

pub const MAX_EXCERPTS: usize = 3;
pub const EXCERPT_CHARS: usize = 100;

/// Buying-intent evidence found in a comment window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalReport {
    /// Comments containing at least one phrase.
    pub count: usize,
    pub excerpts: Vec<String>,
}

impl SignalReport {
    pub fn is_present(&self) -> bool {
        self.count > 0
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn extract(comments: &[Comment], phrases: &PhraseSet) -> SignalReport {
    let mut report = SignalReport::default();

    for comment in comments {
        let body = comment.body.to_lowercase();
        if phrases.first_match_in_lowercase(&body).is_none() {
            continue;
        }

        report.count += 1;
        if report.excerpts.len() < MAX_EXCERPTS {
            report
                .excerpts
                .push(truncate_chars(&comment.body, EXCERPT_CHARS));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases() -> PhraseSet {
        PhraseSet::new(["need this on a shirt", "i'd buy this", "take my money"])
    }

    #[test]
    fn test_empty_comments() {
        assert_eq!(extract(&[], &phrases()), SignalReport::default());
    }

    #[test]
    fn test_case_insensitive_detection() {
        let comments = vec![
            Comment::new("I NEED THIS ON A SHIRT", 40),
            Comment::new("lol", 3),
            Comment::new("I'd Buy This immediately", 12),
        ];
        let report = extract(&comments, &phrases());
        assert_eq!(report.count, 2);
        assert_eq!(
            report.excerpts,
            vec!["I NEED THIS ON A SHIRT", "I'd Buy This immediately"]
        );
    }

    #[test]
    fn test_comment_with_multiple_phrases_counts_once() {
        let comments = vec![Comment::new(
            "need this on a shirt, take my money, i'd buy this",
            5,
        )];
        assert_eq!(extract(&comments, &phrases()).count, 1);
    }

    #[test]
    fn test_excerpts_capped_and_truncated() {
        let long = format!("take my money {}", "x".repeat(200));
        let comments: Vec<Comment> = (0..5).map(|_| Comment::new(long.clone(), 1)).collect();
        let report = extract(&comments, &phrases());
        assert_eq!(report.count, 5);
        assert_eq!(report.excerpts.len(), MAX_EXCERPTS);
        assert!(report
            .excerpts
            .iter()
            .all(|e| e.chars().count() == EXCERPT_CHARS));
    }

    #[test]
    fn test_excerpts_keep_original_order() {
        let comments = vec![
            Comment::new("first: take my money", 1),
            Comment::new("nothing here", 1),
            Comment::new("second: i'd buy this", 1),
        ];
        let report = extract(&comments, &phrases());
        assert!(report.excerpts[0].starts_with("first"));
        assert!(report.excerpts[1].starts_with("second"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
