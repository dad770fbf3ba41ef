use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    #[serde(rename = "tmdbID")]
    pub tmdb_id: i64,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub english_title: String,
    pub year: i32,
    pub directors: Vec<String>,
    pub summary: String,
    pub watched_on: String,
    pub rating: i32,
    pub comment: String,
}

impl Movie {
    /// The title as shown in prompts, with the English title appended when
    /// it differs from the original.
    pub fn display_title(&self) -> String {
        if self.english_title.is_empty() || self.english_title == self.title {
            self.title.clone()
        } else {
            format!("{} (English title: {})", self.title, self.english_title)
        }
    }
}
