//! Terminal colors for catalog output, one style per kind of catalog value.

use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static PALETTE: OnceLock<Palette> = OnceLock::new();

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub heading: Style,
    pub image_id: Style,
    pub tag: Style,
    pub label: Style,
    pub volume: Style,
    pub ok: Style,
    pub alert: Style,
    pub muted: Style,
}

impl Palette {
    /// Colors only on an interactive stdout without `NO_COLOR` set.
    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() || !console::Term::stdout().is_term() {
            Self::monochrome()
        } else {
            Self::catalog()
        }
    }

    pub fn catalog() -> Self {
        Self {
            heading: Style::new().bold().underline(),
            image_id: Style::new().bright_blue().bold(),
            tag: Style::new().green(),
            label: Style::new().yellow(),
            volume: Style::new().cyan(),
            ok: Style::new().bright_green(),
            alert: Style::new().bright_red().bold(),
            muted: Style::new().dimmed(),
        }
    }

    pub fn monochrome() -> Self {
        let none = Style::new();
        Self {
            heading: none,
            image_id: none,
            tag: none,
            label: none,
            volume: none,
            ok: none,
            alert: none,
            muted: none,
        }
    }

    pub fn paint(style: Style, text: &str) -> String {
        text.style(style).to_string()
    }
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monochrome_writes_plain_text() {
        let palette = Palette::monochrome();
        assert_eq!(Palette::paint(palette.tag, "app:1.0"), "app:1.0");
        assert_eq!(Palette::paint(palette.alert, "boom"), "boom");
    }

    #[test]
    fn test_catalog_colors_ids() {
        let painted = Palette::paint(Palette::catalog().image_id, "abc123def456");
        assert!(painted.contains("abc123def456"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
