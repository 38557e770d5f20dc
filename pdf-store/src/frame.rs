//! Inline viewer markup for a sliced PDF.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Viewer height in CSS pixels.
pub const FRAME_HEIGHT: u32 = 900;

/// `data:` URI of a PDF, opened at the 1-based `page`.
pub fn data_uri(pdf: &[u8], page: usize) -> String {
    format!("data:application/pdf;base64,{}#page={page}", STANDARD.encode(pdf))
}

/// Full-width iframe embedding `pdf` as base64, opened at `page`.
pub fn iframe(pdf: &[u8], page: usize) -> String {
    format!(
        r#"<iframe src="{}" width="100%" height="{FRAME_HEIGHT}" type="application/pdf" frameborder="0"></iframe>"#,
        data_uri(pdf, page)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iframe_embeds_base64_and_anchor() {
        let html = iframe(b"%PDF-1.5", 3);
        assert!(html.starts_with("<iframe src=\"data:application/pdf;base64,JVBERi0xLjU=#page=3\""));
        assert!(html.contains(r#"width="100%""#));
        assert!(html.contains(r#"height="900""#));
    }
}
