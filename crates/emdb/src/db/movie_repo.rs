//! SQLite-backed movie store.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::catalogue::{Movie, MovieRepository, StoreError};

const COLUMNS: &str =
    "id, tmdb_id, imdb_id, title, english_title, year, directors, summary, watched_on, rating, comment";

fn movie_from_row(row: &Row<'_>) -> Result<Movie, rusqlite::Error> {
    let directors: String = row.get("directors")?;
    Ok(Movie {
        id: row.get("id")?,
        tmdb_id: row.get("tmdb_id")?,
        imdb_id: row.get("imdb_id")?,
        title: row.get("title")?,
        english_title: row.get("english_title")?,
        year: row.get("year")?,
        directors: split_directors(&directors),
        summary: row.get("summary")?,
        watched_on: row.get("watched_on")?,
        rating: row.get("rating")?,
        comment: row.get("comment")?,
    })
}

fn split_directors(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct SqliteMovieRepository {
    db: Database,
}

impl SqliteMovieRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl MovieRepository for SqliteMovieRepository {
    fn find_one(&self, id: &str) -> Result<Option<Movie>, StoreError> {
        let movie = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {} FROM movie WHERE id = ?1", COLUMNS),
                    params![id],
                    movie_from_row,
                )
                .optional()?)
        })?;
        Ok(movie)
    }

    fn find_all(&self) -> Result<Vec<Movie>, StoreError> {
        let movies = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM movie ORDER BY id", COLUMNS))?;
            let rows = stmt
                .query_map([], movie_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        Ok(movies)
    }

    fn store(&self, movie: &Movie) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO movie ({})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    COLUMNS
                ),
                params![
                    movie.id,
                    movie.tmdb_id,
                    movie.imdb_id,
                    movie.title,
                    movie.english_title,
                    movie.year,
                    movie.directors.join(","),
                    movie.summary,
                    movie.watched_on,
                    movie.rating,
                    movie.comment,
                ],
            )?;
            Ok::<_, DatabaseError>(())
        })?;
        Ok(())
    }
}
