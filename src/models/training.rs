use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Minimum score in percent; the backend decides `passed` with it.
    #[serde(default)]
    pub passing_score: Option<u32>,
}

impl Course {
    /// Video link in embeddable form. YouTube watch and short links are
    /// rewritten; anything else comes back unchanged.
    pub fn embed_url(&self) -> Option<String> {
        self.video_url.as_deref().map(embed_url)
    }
}

pub fn embed_url(url: &str) -> String {
    if url.contains("youtube.com/embed/") {
        return url.to_string();
    }
    let video_id = if let Some((_, rest)) = url.split_once("youtube.com/watch?v=") {
        rest.split('&').next()
    } else if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest.split('?').next()
    } else {
        None
    };
    match video_id.filter(|id| !id.is_empty()) {
        Some(id) => format!("https://www.youtube.com/embed/{id}"),
        None => url.to_string(),
    }
}

/// POST /training-records body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingSubmission {
    pub user_id: String,
    pub course_id: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<u32>,
    pub passed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_links_become_embeds() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123&t=42"),
            "https://www.youtube.com/embed/abc123"
        );
        assert_eq!(embed_url("https://youtu.be/xyz?si=foo"), "https://www.youtube.com/embed/xyz");
        assert_eq!(
            embed_url("https://www.youtube.com/embed/keep"),
            "https://www.youtube.com/embed/keep"
        );
        assert_eq!(embed_url("https://videos.example.com/a.mp4"), "https://videos.example.com/a.mp4");
    }
}
