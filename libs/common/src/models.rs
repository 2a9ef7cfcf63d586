//! Movie model as served by the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Movie entity
///
/// `rating` and `chat_rating` come from different sources and are kept
/// independent; neither is derived from the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub chat_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_movie_from_catalog_json() {
        let movie: Movie = serde_json::from_str(
            r#"{
                "_id": "65f1c0ffee",
                "title": "Arrival",
                "posterUrl": "static.hdrezka.ac/i/poster.jpg",
                "type": "movie",
                "status": "released",
                "releaseDate": "2016-11-11T00:00:00.000Z",
                "rating": 0,
                "chatRating": 8.4
            }"#,
        )
        .unwrap();

        assert_eq!(movie.id, "65f1c0ffee");
        assert_eq!(movie.media_type, "movie");
        assert_eq!(movie.release_date.unwrap().year(), 2016);
        assert_eq!(movie.rating, Some(0.0));
        assert_eq!(movie.chat_rating, Some(8.4));
    }

    #[test]
    fn test_movie_optional_fields_absent() {
        let movie: Movie =
            serde_json::from_str(r#"{"_id": "1", "title": "Untitled", "releaseDate": null}"#)
                .unwrap();

        assert_eq!(movie.poster_url, "");
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.rating, None);
        assert_eq!(movie.chat_rating, None);
    }

    #[test]
    fn test_movie_serializes_wire_names() {
        let movie = Movie {
            id: "1".to_string(),
            title: "Heat".to_string(),
            poster_url: String::new(),
            media_type: "movie".to_string(),
            status: "released".to_string(),
            release_date: Some(Utc.with_ymd_and_hms(1995, 12, 15, 0, 0, 0).unwrap()),
            rating: None,
            chat_rating: Some(7.0),
        };

        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["_id"], "1");
        assert_eq!(value["type"], "movie");
        assert_eq!(value["chatRating"], 7.0);
        assert!(value.get("posterUrl").is_some());
    }
}
