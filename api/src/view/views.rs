use handlebars::Handlebars;
use tracing::error;

use super::page_view::PageView;
use crate::error_handler::AppError;

const PAGE: &str = "page";

/// Compiled templates.
pub struct Views {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Views")
            .field("templates", &self.handlebars.get_templates().len())
            .finish()
    }
}

impl Views {
    pub fn new() -> Result<Self, AppError> {
        let mut handlebars = Handlebars::new();
        let templates = [
            ("styles", include_str!("../../templates/styles.hbs")),
            ("user_bubble", include_str!("../../templates/user_bubble.hbs")),
            ("bot_bubble", include_str!("../../templates/bot_bubble.hbs")),
        ];
        for (name, src) in templates {
            handlebars
                .register_partial(name, src)
                .map_err(|e| AppError::Template(format!("{name}: {e}")))?;
        }
        handlebars
            .register_template_string(PAGE, include_str!("../../templates/page.hbs"))
            .map_err(|e| AppError::Template(format!("{PAGE}: {e}")))?;
        Ok(Self { handlebars })
    }

    pub fn page(&self, view: &PageView) -> Result<String, AppError> {
        self.handlebars.render(PAGE, view).map_err(|e| {
            error!(error = %e, "page render failed");
            AppError::Template(e.to_string())
        })
    }
}
