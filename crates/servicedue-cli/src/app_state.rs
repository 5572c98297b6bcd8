use crate::tui::Action;

/// A full-screen terminal application driven by [`Action`]s.
pub trait AppController {
    fn update(&mut self, action: Action);
    fn render(&mut self, f: &mut ratatui::Frame);
    fn should_quit(&self) -> bool;
}

/// One-line message shown under the lead table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Notice(String),
    Error(String),
}

impl Banner {
    pub fn text(&self) -> &str {
        match self {
            Banner::Notice(text) | Banner::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}
