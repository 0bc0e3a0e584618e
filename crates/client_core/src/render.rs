use url::Url;

pub const VIDEO_LINK_LABEL: &str = "Watch Tutorial Video";
pub const NO_VIDEO_NOTICE: &str = "No tutorial video available.";

/// Escaped description with newline markers turned into `<br>`.
///
/// Both real line breaks and the two-character `\n` sequence count as markers.
pub fn description_markup(description: &str) -> String {
    escaper::encode_minimal(description)
        .replace("\r\n", "\n")
        .replace("\\n", "\n")
        .replace('\n', "<br>")
}

/// Anchor to the tutorial video, opening in a new browsing context.
///
/// Only absolute http(s) links become anchors. Any other text the service sent
/// (it explains failed lookups in this field) is shown as plain text.
pub fn video_link_markup(video_link: Option<&str>) -> String {
    let link = video_link.map(str::trim).unwrap_or_default();
    if link.is_empty() {
        return NO_VIDEO_NOTICE.to_string();
    }

    if is_web_url(link) {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{VIDEO_LINK_LABEL}</a>",
            escaper::encode_minimal(link)
        )
    } else {
        escaper::encode_minimal(link)
    }
}

fn is_web_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
