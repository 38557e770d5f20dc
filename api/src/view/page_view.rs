use pdf_store::PageWindow;
use serde::Serialize;

use crate::session::Session;

pub const PAGE_TITLE: &str = "PDF Helper";
pub const HEADER: &str = "Interactive PDF Reader \u{1F4DA}";
pub const QUESTION_LABEL: &str = "Ask a question on the contents of the uploaded PDF:";

#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    /// CSS class: `info` or `error`.
    pub kind: &'static str,
    pub message: String,
}

impl Banner {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: "info",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub question: String,
    pub answer: String,
}

/// Displayed window, 1-based.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindowView {
    pub first: usize,
    pub last: usize,
    pub focus: usize,
}

impl From<PageWindow> for WindowView {
    fn from(w: PageWindow) -> Self {
        Self {
            first: w.start + 1,
            last: w.end + 1,
            focus: w.focus + 1,
        }
    }
}

/// Everything `page.hbs` renders.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: &'static str,
    pub header: &'static str,
    pub question_label: &'static str,
    pub document: Option<String>,
    pub banner: Option<Banner>,
    pub turns: Vec<TurnView>,
    /// Pre-rendered iframe; emitted unescaped.
    pub frame: Option<String>,
    pub window: Option<WindowView>,
}

impl PageView {
    /// The whole transcript, re-rendered from scratch, plus the pending status.
    pub fn for_session(session: &Session) -> Self {
        Self {
            title: PAGE_TITLE,
            header: HEADER,
            question_label: QUESTION_LABEL,
            document: session.document.as_ref().map(|d| d.name().to_string()),
            banner: session.status.clone().map(Banner::info),
            turns: session
                .transcript
                .turns()
                .iter()
                .map(|t| TurnView {
                    question: t.question.clone(),
                    answer: t.answer.clone(),
                })
                .collect(),
            frame: None,
            window: None,
        }
    }

    pub fn with_banner(mut self, banner: Banner) -> Self {
        self.banner = Some(banner);
        self
    }

    pub fn with_frame(mut self, window: PageWindow, iframe: String) -> Self {
        self.window = Some(window.into());
        self.frame = Some(iframe);
        self
    }
}
