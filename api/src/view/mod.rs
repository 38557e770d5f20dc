//! Server-rendered HTML page.

mod page_view;
mod views;

pub use page_view::{Banner, PageView, TurnView, WindowView};
pub use views::Views;
