use serde::Deserialize;

/// One entry of the rotation. The list order is the rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RotationItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(alias = "media", alias = "video")]
    pub media_ref: String,
}

impl RotationItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
        media_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            date: date.into(),
            media_ref: media_ref.into(),
        }
    }
}
