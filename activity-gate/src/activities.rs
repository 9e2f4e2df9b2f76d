//! The browsable activity directory.
//!
//! Activities are the content being gated: craft projects, experiments,
//! and games browsed by title and category. The directory serves metadata
//! only; whether a viewer can open an activity is decided by the content
//! gate, never here.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Difficulty label shown on activity cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Suitable for the youngest learners.
    #[default]
    Easy,
    /// Needs some adult help.
    Medium,
    /// A real challenge.
    Hard,
}

impl Difficulty {
    /// Returns the difficulty as a display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single activity in the library.
///
/// # Examples
///
/// ```
/// use activity_gate::activities::{Activity, Difficulty};
///
/// let activity = Activity::new("volcano-1", "Baking Soda Volcano")
///     .with_description("Build an erupting volcano in the kitchen")
///     .with_category("Science")
///     .with_age_range("5-8")
///     .with_difficulty(Difficulty::Medium);
///
/// assert_eq!(activity.id, "volcano-1");
/// assert_eq!(activity.difficulty, Difficulty::Medium);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Stable unique identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Card image URL.
    #[serde(default)]
    pub image_url: String,
    /// Display category, such as "Science" or "Crafts".
    #[serde(default)]
    pub category: String,
    /// Suggested age range, such as "5-8".
    #[serde(default)]
    pub age_range: String,
    /// Difficulty label.
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Activity {
    /// Creates an activity with the given id and title.
    #[must_use]
    pub fn new<I: Into<String>, T: Into<String>>(id: I, title: T) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image_url: String::new(),
            category: String::new(),
            age_range: String::new(),
            difficulty: Difficulty::default(),
        }
    }

    /// Sets the display description.
    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the card image URL.
    #[must_use]
    pub fn with_image_url<S: Into<String>>(mut self, image_url: S) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Sets the display category.
    #[must_use]
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the suggested age range.
    #[must_use]
    pub fn with_age_range<S: Into<String>>(mut self, age_range: S) -> Self {
        self.age_range = age_range.into();
        self
    }

    /// Sets the difficulty label.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Returns true if the query matches the title or description,
    /// ignoring case. An empty query matches everything.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Browsable source of activities.
///
/// Implementations serve metadata for every activity regardless of who is
/// asking; access control happens downstream in the content gate.
#[async_trait]
pub trait ActivityDirectory: Send + Sync + fmt::Debug {
    /// Returns every activity, in display order.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the static directory never fails.
    async fn list_activities(&self) -> Result<Vec<Activity>>;

    /// Looks up a single activity by exact id.
    ///
    /// Returns `Ok(None)` when no activity carries the id.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the static directory never fails.
    async fn get_activity(&self, id: &str) -> Result<Option<Activity>>;

    /// Returns activities whose title or description matches `query`,
    /// ignoring case and preserving display order.
    ///
    /// # Errors
    ///
    /// Same as [`ActivityDirectory::list_activities`].
    async fn search_activities(&self, query: &str) -> Result<Vec<Activity>> {
        let all = self.list_activities().await?;
        Ok(all.into_iter().filter(|activity| activity.matches_query(query)).collect())
    }
}

/// Activity directory backed by a fixed, in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticActivityDirectory {
    activities: Vec<Activity>,
}

impl StaticActivityDirectory {
    /// Creates a directory over the given activities, kept in order.
    #[must_use]
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }
}

#[async_trait]
impl ActivityDirectory for StaticActivityDirectory {
    async fn list_activities(&self) -> Result<Vec<Activity>> {
        Ok(self.activities.clone())
    }

    async fn get_activity(&self, id: &str) -> Result<Option<Activity>> {
        Ok(self.activities.iter().find(|activity| activity.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_directory() -> StaticActivityDirectory {
        StaticActivityDirectory::new(vec![
            Activity::new("volcano-1", "Baking Soda Volcano")
                .with_description("Build an erupting volcano in the kitchen")
                .with_category("Science"),
            Activity::new("paper-crane", "Origami Paper Crane")
                .with_description("Fold a classic paper crane")
                .with_category("Crafts"),
            Activity::new("star-map", "Backyard Star Map")
                .with_description("Chart the night sky with a printable map")
                .with_category("Science"),
        ])
    }

    #[test]
    fn test_activity_builder() {
        let activity = Activity::new("act-1", "Test Activity")
            .with_description("desc")
            .with_image_url("https://img.example.com/a.png")
            .with_age_range("5-8")
            .with_difficulty(Difficulty::Hard);

        assert_eq!(activity.id, "act-1");
        assert_eq!(activity.age_range, "5-8");
        assert_eq!(activity.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_matches_query_ignores_case() {
        let activity = Activity::new("volcano-1", "Baking Soda Volcano")
            .with_description("Build an erupting volcano");

        assert!(activity.matches_query("VOLCANO"));
        assert!(activity.matches_query("baking"));
        assert!(activity.matches_query("Erupting"));
        assert!(!activity.matches_query("rocket"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let activity = Activity::new("act-1", "Anything");
        assert!(activity.matches_query(""));
    }

    #[tokio::test]
    async fn test_list_preserves_order() {
        let directory = sample_directory();
        let activities = directory.list_activities().await.unwrap();

        let ids: Vec<&str> = activities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["volcano-1", "paper-crane", "star-map"]);
    }

    #[tokio::test]
    async fn test_get_by_exact_id() {
        let directory = sample_directory();

        let activity = directory.get_activity("paper-crane").await.unwrap();
        assert_eq!(activity.unwrap().title, "Origami Paper Crane");

        assert!(directory.get_activity("no-such-id").await.unwrap().is_none());
        // Lookup is by exact id, not case-folded
        assert!(directory.get_activity("Paper-Crane").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_matches_title_and_description() {
        let directory = sample_directory();

        let by_title = directory.search_activities("crane").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "paper-crane");

        let by_description = directory.search_activities("night sky").await.unwrap();
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "star-map");
    }

    #[tokio::test]
    async fn test_search_preserves_order_and_handles_no_match() {
        let directory = sample_directory();

        let matches = directory.search_activities("a").await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["volcano-1", "paper-crane", "star-map"]);

        let none = directory.search_activities("xylophone").await.unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_difficulty_serde_labels() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        assert_eq!(Difficulty::Hard.as_str(), "hard");
    }
}
