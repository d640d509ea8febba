use serde::Deserialize;

/// Photographer credited for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Display name
    pub name: String,
    /// Unsplash profile page
    pub profile_url: String,
}

/// Image URLs used in the relayed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    /// Preview used for the Telegram link thumbnail (`urls.regular`)
    pub preview: String,
    /// Full-size download link
    pub full: String,
}

/// One random photo as returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Unsplash photo id
    pub id: String,
    /// Author-supplied description
    pub description: Option<String>,
    /// Generated alternative text
    pub alt_description: Option<String>,
    /// View count
    pub views: u64,
    /// Like count
    pub likes: u64,
    /// Download count
    pub downloads: u64,
    /// Photographer
    pub author: Author,
    /// Preview and download URLs
    pub urls: ImageUrls,
    /// Photo page on unsplash.com
    pub page_url: String,
}

impl ImageRecord {
    /// Description to show: `description`, falling back to `alt_description`
    #[must_use]
    pub fn display_description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .or(self.alt_description.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoWire {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    views: u64,
    #[serde(default)]
    likes: u64,
    #[serde(default)]
    downloads: u64,
    user: UserWire,
    urls: UrlsWire,
    links: LinksWire,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    name: String,
    links: LinksWire,
}

#[derive(Debug, Deserialize)]
struct UrlsWire {
    regular: String,
    full: String,
}

#[derive(Debug, Deserialize)]
struct LinksWire {
    html: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<PhotoWire> for ImageRecord {
    fn from(wire: PhotoWire) -> Self {
        Self {
            id: wire.id,
            description: non_blank(wire.description),
            alt_description: non_blank(wire.alt_description),
            views: wire.views,
            likes: wire.likes,
            downloads: wire.downloads,
            author: Author {
                name: wire.user.name,
                profile_url: wire.user.links.html,
            },
            urls: ImageUrls {
                preview: wire.urls.regular,
                full: wire.urls.full,
            },
            page_url: wire.links.html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo_json() -> serde_json::Value {
        json!({
            "id": "Dwu85P9SOIk",
            "description": "A man drinking a coffee.",
            "alt_description": "man holding mug",
            "views": 1000,
            "likes": 24,
            "downloads": 52,
            "user": {
                "name": "Gilbert Kane",
                "links": { "html": "https://unsplash.com/@poorkane" }
            },
            "urls": {
                "raw": "https://images.unsplash.com/raw",
                "full": "https://images.unsplash.com/full",
                "regular": "https://images.unsplash.com/regular",
                "small": "https://images.unsplash.com/small"
            },
            "links": { "html": "https://unsplash.com/photos/Dwu85P9SOIk" }
        })
    }

    #[test]
    fn test_wire_mapping() -> Result<(), serde_json::Error> {
        let record: ImageRecord = serde_json::from_value::<PhotoWire>(photo_json())?.into();

        assert_eq!(record.id, "Dwu85P9SOIk");
        assert_eq!(record.author.name, "Gilbert Kane");
        assert_eq!(record.author.profile_url, "https://unsplash.com/@poorkane");
        assert_eq!(record.urls.preview, "https://images.unsplash.com/regular");
        assert_eq!(record.urls.full, "https://images.unsplash.com/full");
        assert_eq!(record.page_url, "https://unsplash.com/photos/Dwu85P9SOIk");
        assert_eq!((record.views, record.likes, record.downloads), (1000, 24, 52));
        assert_eq!(record.display_description(), Some("A man drinking a coffee."));
        Ok(())
    }

    #[test]
    fn test_description_fallback() -> Result<(), serde_json::Error> {
        let mut value = photo_json();
        value["description"] = serde_json::Value::Null;
        let record: ImageRecord = serde_json::from_value::<PhotoWire>(value.clone())?.into();
        assert_eq!(record.display_description(), Some("man holding mug"));

        value["alt_description"] = json!("   ");
        let record: ImageRecord = serde_json::from_value::<PhotoWire>(value)?.into();
        assert_eq!(record.display_description(), None);
        Ok(())
    }

    #[test]
    fn test_missing_counts_default_to_zero() -> Result<(), serde_json::Error> {
        let mut value = photo_json();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("views");
            obj.remove("downloads");
        }
        let record: ImageRecord = serde_json::from_value::<PhotoWire>(value)?.into();
        assert_eq!(record.views, 0);
        assert_eq!(record.downloads, 0);
        assert_eq!(record.likes, 24);
        Ok(())
    }
}
