//! Movie card shown in the catalog grid

use chrono::{DateTime, Utc};
use common::models::Movie;
use tracing::{debug, warn};

use crate::{navigation::Navigator, poster::PosterImage};

/// Shown in place of a missing release date
pub const NO_DATE: &str = "No date";

/// Everything a catalog card displays, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub id: String,
    pub title: String,
    pub poster: PosterImage,
    /// Shown verbatim
    pub media_type: String,
    /// Shown verbatim
    pub status: String,
    pub release_date: String,
    pub rating: Option<String>,
    pub chat_rating: Option<String>,
}

impl MovieCard {
    pub fn new(movie: &Movie) -> Self {
        if movie.poster_url.trim().is_empty() {
            warn!("Empty poster URL for movie: {}", movie.title);
        }

        let poster = PosterImage::new(&movie.poster_url);
        debug!("Processed poster URL for {}: {}", movie.title, poster.src());

        Self {
            id: movie.id.clone(),
            title: movie.title.clone(),
            poster,
            media_type: movie.media_type.clone(),
            status: movie.status.clone(),
            release_date: format_release_date(movie.release_date.as_ref()),
            rating: format_rating(movie.rating),
            chat_rating: format_rating(movie.chat_rating),
        }
    }

    /// Detail route for this movie
    pub fn detail_href(&self) -> String {
        format!("/movies/{}", self.id)
    }

    /// Clicking anywhere on the card opens the detail page
    pub fn on_click(&self, navigator: &dyn Navigator) {
        navigator.push(&self.detail_href());
    }

    pub fn poster_src(&self) -> &str {
        self.poster.src()
    }

    pub fn poster_is_placeholder(&self) -> bool {
        self.poster.is_placeholder()
    }

    /// The poster failed to load; show the placeholder from now on
    pub fn on_poster_error(&mut self) {
        warn!("Poster failed to load for movie: {}", self.title);
        self.poster.mark_failed();
    }

    pub fn rating_label(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    pub fn chat_rating_label(&self) -> Option<&str> {
        self.chat_rating.as_deref()
    }
}

/// Format a release date as `DD/MM/YY`
pub fn format_release_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%d/%m/%y").to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Format a rating to one decimal; zero is a rating like any other
///
/// Halfway values round away from zero (`7.25` shows as `7.3`).
pub fn format_rating(rating: Option<f64>) -> Option<String> {
    rating.map(|value| format!("{:.1}", round_half_away(value)))
}

/// `{:.1}` breaks exact ties to even. The only doubles sitting exactly halfway
/// between two tenths are odd multiples of a quarter; those are rounded here
/// and everything else is left to the formatter.
fn round_half_away(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}
