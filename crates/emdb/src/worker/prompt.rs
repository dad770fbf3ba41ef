//! Prompt construction and answer parsing for the `find-titles` action.

use serde::Deserialize;

use super::HandlerError;
use crate::catalogue::{Movie, Review, Titles};

/// Escapes chat-template control sequences that a review might contain, so
/// scraped text cannot pose as instructions to the model.
fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("<s>", "< s >")
        .replace("</s>", "< / s >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
}

/// Builds the prompt asking which other movies `review` mentions.
pub fn build_prompt(movie: &Movie, review: &Review) -> String {
    let title = sanitize_for_prompt(&movie.display_title());
    let text = sanitize_for_prompt(&review.review);

    format!(
        r#"The following text is a user comment about the movie {title}. In it, the user may have referenced other movie titles. List them if you see any.

----
{text}
---- 

If you found any movie titles other than {title}, list them below in a JSON array. If there are other titles, like TV shows, books or games, ignore them. The format is as follows:

["movie title 1", "movie title 2"]

Just answer with the JSON and nothing else. If you don't see any other movie titles, just answer with an empty array."#
    )
}

/// Either answer shape the model is known to give.
#[derive(Deserialize)]
#[serde(untagged)]
enum TitlesAnswer {
    List(Vec<String>),
    Grouped(GroupedTitles),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GroupedTitles {
    #[serde(default)]
    movies: Vec<String>,
    #[serde(default)]
    tv_shows: Vec<String>,
    #[serde(default)]
    games: Vec<String>,
    #[serde(default)]
    books: Vec<String>,
}

/// Parses a model answer into [`Titles`].
///
/// Accepts a bare JSON array of movie titles or an object with `movies`,
/// `tvShows`, `games` and `books` arrays, optionally wrapped in a Markdown
/// code fence. Anything else is a [`HandlerError::MalformedCompletion`].
pub fn parse_titles(answer: &str) -> Result<Titles, HandlerError> {
    let json = strip_code_fence(answer.trim());

    let parsed: TitlesAnswer = serde_json::from_str(json).map_err(|e| {
        HandlerError::MalformedCompletion(format!(
            "{}. Answer was: {}",
            e,
            crate::client::truncate_body(answer)
        ))
    })?;

    Ok(match parsed {
        TitlesAnswer::List(movies) => Titles {
            movies,
            ..Default::default()
        },
        TitlesAnswer::Grouped(g) => Titles {
            movies: g.movies,
            tv_shows: g.tv_shows,
            games: g.games,
            books: g.books,
        },
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as `json` on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
