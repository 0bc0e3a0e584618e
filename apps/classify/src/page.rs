/// Standalone HTML page holding both output regions.
pub fn render_page(title: &str, description_markup: &str, video_link_markup: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
<div id="description">{description_markup}</div>
<div id="videoLink">{video_link_markup}</div>
</body>
</html>
"#,
        title = escaper::encode_minimal(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_contains_both_regions() {
        let page = render_page("bench.jpg", "A<br>B", "<a href=\"http://x/y\">x</a>");
        assert!(page.contains("<div id=\"description\">A<br>B</div>"));
        assert!(page.contains("<div id=\"videoLink\"><a href=\"http://x/y\">x</a></div>"));
        assert!(page.contains("<title>bench.jpg</title>"));
    }

    #[test]
    fn title_is_escaped() {
        assert!(render_page("<b>", "", "").contains("<title>&lt;b&gt;</title>"));
    }
}
