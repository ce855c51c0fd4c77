use speed_reader::{clean_title, extract_text};

fn page(head: &str, body: &str) -> String {
    format!(
        r#"<html xmlns="http://www.w3.org/1999/xhtml"><head>{head}</head><body>{body}</body></html>"#
    )
}

fn title_of(head: &str, body: &str) -> Option<String> {
    extract_text(&page(head, body)).title
}

#[test]
fn meta_title_comes_first() {
    let head = r#"<title>Doc Title</title><meta name="title" content="  Meta Title "/>"#;
    assert_eq!(title_of(head, "<h1>Heading</h1>").as_deref(), Some("Meta Title"));

    let head = r#"<meta property="dc:title" content="Dublin Core"/>"#;
    assert_eq!(title_of(head, "<h1>Heading</h1>").as_deref(), Some("Dublin Core"));
}

#[test]
fn first_heading_like_element_wins_over_title_tag() {
    assert_eq!(
        title_of("<title>Doc Title</title>", "<p>intro.</p><h2>Second Level</h2><h1>Top</h1>")
            .as_deref(),
        Some("Second Level")
    );
    assert_eq!(
        title_of(
            "<title>Doc Title</title>",
            r#"<div class="calibre_chapter-head">The Storm</div><h1>Later</h1>"#
        )
        .as_deref(),
        Some("The Storm")
    );
}

#[test]
fn overlong_or_empty_headings_are_passed_over() {
    let long = "x".repeat(200);
    let body = format!("<h1>{long}</h1><h2>   </h2><h3>Fits</h3>");
    assert_eq!(title_of("", &body).as_deref(), Some("Fits"));
}

#[test]
fn title_tag_before_paragraph_guess() {
    assert_eq!(
        title_of("<title> The Title </title>", "<p>A Short Line</p>").as_deref(),
        Some("The Title")
    );
}

#[test]
fn short_paragraph_without_period_is_a_title_guess() {
    let body = "<p>Hi</p><p>A full sentence.</p><div>Into the Woods</div><p>More</p>";
    assert_eq!(title_of("", body).as_deref(), Some("Into the Woods"));
}

#[test]
fn no_candidate_means_no_title() {
    assert_eq!(title_of("", "<p>Only sentences here.</p>"), None);
    // Cleaning can empty a title too.
    assert_eq!(title_of("", "<h1>Chapter 7</h1><p>Text.</p>"), None);
}

#[test]
fn title_cleanup() {
    assert_eq!(clean_title("12. The Return"), "The Return");
    assert_eq!(clean_title("Chapter 3 The Storm"), "The Storm");
    assert_eq!(clean_title("CHAPTER 10: Dawn"), ": Dawn");
    assert_eq!(clean_title("section 2 Methods"), "Methods");
    assert_eq!(clean_title("Chapter One"), "Chapter One");
    assert_eq!(clean_title("Sections of the Heart"), "Sections of the Heart");
    assert_eq!(clean_title("1. Chapter 1 Origins"), "Origins");
}

#[test]
fn body_text_skips_script_and_style() {
    let extracted = extract_text(&page(
        "<title>T</title><style>body { margin: 0 }</style>",
        "<h1>Head</h1><script>alert('x')</script><p>Visible <em>text</em> here.</p><style>.a{}</style>",
    ));
    assert_eq!(extracted.content, "HeadVisible text here.");
}

#[test]
fn document_without_body_uses_root_text() {
    let extracted = extract_text("<section><p>loose text</p></section>");
    assert_eq!(extracted.content, "loose text");
}

#[test]
fn html_named_entities_are_decoded() {
    let extracted = extract_text(&page(
        "",
        "<p>Sm&oslash;rrebr&oslash;d, &frac12; &aring;r &oelig;uvre&hellip;</p>",
    ));
    assert_eq!(
        extracted.content,
        "Sm\u{f8}rrebr\u{f8}d, \u{bd} \u{e5}r \u{153}uvre\u{2026}"
    );
}

#[test]
fn markup_that_is_not_xml_still_yields_text() {
    let extracted = extract_text("<html><body><p>unclosed<p>next <b>bold</body>");
    assert_eq!(extracted.content, "unclosednext bold");

    let extracted = extract_text("<h2>Loose Heading</h2><p>body<br>text & more");
    assert_eq!(extracted.title.as_deref(), Some("Loose Heading"));
}

#[test]
fn line_breaks_separate_words() {
    let extracted = extract_text(&page("", "first line<br>second line<br/>third"));
    assert_eq!(extracted.content, "first line\nsecond line\nthird");
}
