//! Action handlers. Each one performs the whole unit of work for a job and
//! reports success or failure; the caller settles the job's status.

use tracing::info;

use super::{prompt, HandlerError, WorkerContext};
use crate::job::Action;

/// Runs the handler for `action` against `subject_id`.
pub async fn handle(
    ctx: &WorkerContext,
    job_id: i64,
    action: Action,
    subject_id: &str,
) -> Result<(), HandlerError> {
    match action {
        Action::RefreshReviews => refresh_reviews(ctx, job_id, subject_id).await,
        Action::RefreshAllReviews => refresh_all_reviews(ctx, job_id),
        Action::FindTitles => find_titles(ctx, job_id, subject_id).await,
        Action::FindAllTitles => find_all_titles(ctx, job_id),
    }
}

/// Replaces the stored reviews of a movie with freshly scraped ones and
/// queues a `find-titles` job per review.
///
/// Old reviews are deleted before scraping, so a failed scrape leaves the
/// movie without reviews until the job is re-run.
pub async fn refresh_reviews(
    ctx: &WorkerContext,
    job_id: i64,
    movie_id: &str,
) -> Result<(), HandlerError> {
    let movie = ctx
        .movies
        .find_one(movie_id)?
        .ok_or_else(|| HandlerError::MovieNotFound(movie_id.to_string()))?;

    let removed = ctx.reviews.delete_by_movie_id(&movie.id)?;
    let reviews = ctx.scraper.fetch_reviews(&movie).await?;

    for review in &reviews {
        ctx.reviews.store(review)?;
        ctx.queue.push(&review.id, Action::FindTitles)?;
    }

    info!(job_id, movie_id, removed, stored = reviews.len(), "Refreshed reviews");
    Ok(())
}

/// Queues a `refresh-reviews` job for every movie.
///
/// Not transactional: on failure the children queued so far stay queued,
/// and re-running queues all of them again.
pub fn refresh_all_reviews(ctx: &WorkerContext, job_id: i64) -> Result<(), HandlerError> {
    let movies = ctx.movies.find_all()?;
    for movie in &movies {
        ctx.queue.push(&movie.id, Action::RefreshReviews)?;
    }

    info!(job_id, children = movies.len(), "Queued review refresh for all movies");
    Ok(())
}

/// Queues a `find-titles` job for every review. Same failure semantics as
/// [`refresh_all_reviews`].
pub fn find_all_titles(ctx: &WorkerContext, job_id: i64) -> Result<(), HandlerError> {
    let reviews = ctx.reviews.find_all()?;
    for review in &reviews {
        ctx.queue.push(&review.id, Action::FindTitles)?;
    }

    info!(job_id, children = reviews.len(), "Queued title search for all reviews");
    Ok(())
}

/// Asks the language model which other movies a review mentions and stores
/// the answer on the review. Only the titles column is written, and only
/// once the answer has parsed.
pub async fn find_titles(
    ctx: &WorkerContext,
    job_id: i64,
    review_id: &str,
) -> Result<(), HandlerError> {
    let review = ctx
        .reviews
        .find_one(review_id)?
        .ok_or_else(|| HandlerError::ReviewNotFound(review_id.to_string()))?;
    let movie = ctx
        .movies
        .find_one(&review.movie_id)?
        .ok_or_else(|| HandlerError::MovieNotFound(review.movie_id.clone()))?;

    let prompt = prompt::build_prompt(&movie, &review);
    tracing::debug!(job_id, review_id, "Prompt:\n{}", prompt);

    let answer = ctx.completion.complete(&ctx.model, &prompt).await?;
    let titles = prompt::parse_titles(&answer)?;
    // The review may have been replaced by a refresh while the model ran.
    if !ctx.reviews.store_titles(&review.id, &titles)? {
        return Err(HandlerError::ReviewNotFound(review.id));
    }

    info!(
        job_id,
        review_id,
        movies = titles.movies.len(),
        "Stored mentioned titles"
    );
    Ok(())
}
