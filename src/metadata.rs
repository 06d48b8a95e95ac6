use serde::{Deserialize, Serialize};

/// The per-post artifact, written as `<id>.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlogRecord {
    pub title: String,
    pub date: String,
    pub content: String,
}

/// One entry of the blog index. `id` is the merge key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub(crate) struct BlogMetadata {
    pub id: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub thumbnail: String,
    pub content_file: String,
}

impl BlogMetadata {
    /// Field names and values in index order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("id", self.id.as_str()),
            ("title", self.title.as_str()),
            ("date", self.date.as_str()),
            ("excerpt", self.excerpt.as_str()),
            ("thumbnail", self.thumbnail.as_str()),
            ("content_file", self.content_file.as_str()),
        ]
    }
}
