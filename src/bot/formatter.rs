//! HTML message body for a relayed photo.

use crate::unsplash::ImageRecord;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// Invisible anchor text; makes Telegram render the preview as a thumbnail
const ZERO_WIDTH_JOINER: &str = "&#8205;";

/// Build the Telegram HTML message for one photo.
///
/// User-supplied text is escaped; the description clause is left out when
/// the photo has neither a description nor an alt description.
///
/// # Examples
///
/// ```
/// use unsplash_relay_bot::bot::formatter::format_image_message;
/// use unsplash_relay_bot::unsplash::{Author, ImageRecord, ImageUrls};
///
/// let record = ImageRecord {
///     id: "abc".to_string(),
///     description: None,
///     alt_description: None,
///     views: 3,
///     likes: 2,
///     downloads: 1,
///     author: Author {
///         name: "Ann".to_string(),
///         profile_url: "https://unsplash.com/@ann".to_string(),
///     },
///     urls: ImageUrls {
///         preview: "https://images.unsplash.com/p".to_string(),
///         full: "https://images.unsplash.com/f".to_string(),
///     },
///     page_url: "https://unsplash.com/photos/abc".to_string(),
/// };
/// let text = format_image_message(&record);
/// assert!(!text.contains("called"));
/// assert!(text.contains("<b>Ann</b>"));
/// ```
#[must_use]
pub fn format_image_message(record: &ImageRecord) -> String {
    let mut reply = String::new();

    let _ = write!(
        reply,
        "<a href=\"{}\">{ZERO_WIDTH_JOINER}</a>",
        encode_double_quoted_attribute(&record.urls.preview)
    );
    let _ = write!(
        reply,
        "An <a href=\"{}\"><b>amazing photo</b></a> ",
        encode_double_quoted_attribute(&record.page_url)
    );

    if let Some(description) = record.display_description() {
        let _ = write!(reply, "called <i>\"{}\"</i> ", encode_text(description));
    }

    let _ = write!(
        reply,
        "from <a href=\"{}\"><b>{}</b></a>.",
        encode_double_quoted_attribute(&record.author.profile_url),
        encode_text(&record.author.name)
    );
    let _ = write!(
        reply,
        "\nIt was liked by <b>{}</b> users, downloaded <b>{}</b> times and viewed <b>{}</b> times.",
        record.likes, record.downloads, record.views
    );
    let _ = write!(
        reply,
        " <a href=\"{}\">Click to download</a>.",
        encode_double_quoted_attribute(&record.urls.full)
    );

    reply
}
