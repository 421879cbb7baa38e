use serde::{Deserialize, Serialize};

/// Tags accepted by the NoteHub create endpoint.
///
/// The server is the source of truth for the tag vocabulary; this list only
/// drives the create-form select.
pub(crate) const NOTE_TAGS: &[&str] = &["Todo", "Work", "Personal", "Meeting", "Shopping"];

/// A note as returned by NoteHub. Immutable once created (there is no update
/// endpoint); destroyed by the delete mutation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tag: String,
}

/// Body of `POST /notes`. The server assigns the id.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NewNote {
    pub title: String,
    pub content: String,
    pub tag: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct FetchNotesResponse {
    pub notes: Vec<Note>,

    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// A movie search hit from TMDB. Read-only; no local lifecycle.
///
/// Fields beyond id/title are tolerated as absent so a metadata-poor entry
/// doesn't fail the whole page of results.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Movie {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub overview: String,

    #[serde(default)]
    pub release_date: String,

    #[serde(default)]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub vote_average: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct SearchMoviesResponse {
    pub results: Vec<Movie>,
    pub total_pages: u32,
}

impl Movie {
    /// TMDB serves poster assets from a separate image CDN.
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("https://image.tmdb.org/t/p/w500{}", p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_notes_response_contract_deserialize() {
        // Contract based on NoteHub: GET /notes
        let json = r#"{
            "notes": [
                {"id": "1", "title": "Groceries", "content": "milk, eggs", "tag": "Shopping"}
            ],
            "totalPages": 3
        }"#;
        let parsed: FetchNotesResponse =
            serde_json::from_str(json).expect("notes response should parse");
        assert_eq!(parsed.total_pages, 3);
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].tag, "Shopping");
    }

    #[test]
    fn test_search_movies_response_contract_deserialize() {
        // Contract based on TMDB: GET /search/movie
        let json = r#"{
            "results": [
                {"id": 603, "title": "The Matrix", "overview": "A hacker...",
                 "release_date": "1999-03-31", "poster_path": "/abc.jpg", "vote_average": 8.2}
            ],
            "total_pages": 12
        }"#;
        let parsed: SearchMoviesResponse =
            serde_json::from_str(json).expect("movies response should parse");
        assert_eq!(parsed.total_pages, 12);
        assert_eq!(parsed.results[0].id, 603);
    }

    #[test]
    fn test_movie_tolerates_missing_metadata() {
        let json = r#"{"id": 1, "title": "Untitled"}"#;
        let m: Movie = serde_json::from_str(json).expect("sparse movie should parse");
        assert!(m.overview.is_empty());
        assert!(m.poster_path.is_none());
        assert_eq!(m.vote_average, 0.0);
    }

    #[test]
    fn test_movie_poster_url() {
        let m = Movie {
            id: 603,
            title: "The Matrix".to_string(),
            overview: String::new(),
            release_date: String::new(),
            poster_path: Some("/abc.jpg".to_string()),
            vote_average: 0.0,
        };
        assert_eq!(
            m.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );

        let no_poster = Movie {
            poster_path: None,
            ..m.clone()
        };
        assert!(no_poster.poster_url().is_none());
    }

    #[test]
    fn test_new_note_serialization() {
        let req = NewNote {
            title: "Standup".to_string(),
            content: "daily sync".to_string(),
            tag: "Meeting".to_string(),
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["title"], "Standup");
        assert_eq!(v["tag"], "Meeting");
    }
}
