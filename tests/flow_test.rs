//! Conversation Flow Integration Tests
//!
//! Exercises the adapter traits with in-memory fakes and checks that the
//! controller's decision pieces (threshold filter, token round-trip) chain
//! together the way the keyboard flow relies on.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tutor_bot::{
    telegram::debt_themes, CallbackToken, DebtLookup, RecommendError, Recommender, SubjectReport,
    PASSING_SCORE,
};

struct FakeDebtLookup {
    reports: HashMap<String, SubjectReport>,
}

#[async_trait]
impl DebtLookup for FakeDebtLookup {
    async fn lookup(&self, _display_name: &str) -> Result<HashMap<String, SubjectReport>> {
        Ok(self.reports.clone())
    }
}

struct FakeRecommender {
    reply: Result<String, &'static str>,
}

#[async_trait]
impl Recommender for FakeRecommender {
    async fn recommend(&self, _subject: &str, _theme: &str) -> Result<String, RecommendError> {
        self.reply
            .clone()
            .map_err(|e| RecommendError::Malformed(e.to_string()))
    }
}

fn report(subject: &str, headers: &[&str], scores: &[&str]) -> SubjectReport {
    SubjectReport {
        subject: subject.to_string(),
        headers: headers.iter().map(|s| s.to_string()).collect(),
        scores: scores.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_subject_selection_yields_single_debt_theme() {
    // Scenario from the data: Anna's Math row has Algebra=30, Geometry=70.
    let lookup = FakeDebtLookup {
        reports: HashMap::from([(
            "Math".to_string(),
            report("Math", &["Algebra", "Geometry"], &["30", "70"]),
        )]),
    };

    let reports = lookup.lookup("Anna").await.unwrap();
    let math = reports.get("Math").expect("Math report");
    let themes = debt_themes(&math.headers, &math.scores, PASSING_SCORE);

    assert_eq!(themes, vec!["Algebra".to_string()]);
}

#[tokio::test]
async fn test_missing_subject_is_omitted_not_an_error() {
    let lookup = FakeDebtLookup {
        reports: HashMap::new(),
    };

    let reports = lookup.lookup("Anna").await.unwrap();
    assert!(reports.get("Math").is_none());
}

#[tokio::test]
async fn test_theme_keyboard_token_round_trips_through_callback() {
    let lookup = FakeDebtLookup {
        reports: HashMap::from([(
            "Coding".to_string(),
            report("Coding", &["Loops", "Traits"], &["20", "45"]),
        )]),
    };

    let reports = lookup.lookup("Anna").await.unwrap();
    let coding = &reports["Coding"];
    let themes = debt_themes(&coding.headers, &coding.scores, PASSING_SCORE);
    assert_eq!(themes.len(), 2);

    // Each button token must decode back to the pair that built it.
    for theme in &themes {
        let token = CallbackToken::Theme {
            subject: "Coding".to_string(),
            theme: theme.clone(),
        };
        assert_eq!(CallbackToken::decode(&token.encode()), token);
    }
}

#[tokio::test]
async fn test_recommender_failure_is_a_value_not_a_panic() {
    let recommender = FakeRecommender {
        reply: Err("backend down"),
    };

    let result = recommender.recommend("Math", "Algebra").await;
    assert!(matches!(result, Err(RecommendError::Malformed(_))));
}

#[tokio::test]
async fn test_recommender_blank_reply_detected_by_trim() {
    let recommender = FakeRecommender {
        reply: Ok("  \n ".to_string()),
    };

    let text = recommender.recommend("Math", "Algebra").await.unwrap();
    assert!(text.trim().is_empty());
}
