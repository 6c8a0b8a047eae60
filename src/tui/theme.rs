//! Terminal colours for the light and dark themes.
//!
//! `ThemeState` is the terminal's `ThemeSurface`: the document-level theme
//! attribute becomes the active `Palette`, and the toggle's checked state is
//! shown in the title bar.

use ratatui::style::Color;

use crate::core::preference::{Theme, ThemeSurface};
use crate::render::highlight::{DARK_CODE_THEME, LIGHT_CODE_THEME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub system: Color,
    pub warning: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    /// syntect theme used for fenced code blocks.
    pub syntax_theme: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::Rgb(250, 250, 250),
                text: Color::Rgb(36, 41, 47),
                muted: Color::Rgb(110, 119, 129),
                accent: Color::Rgb(9, 105, 218),
                user: Color::Rgb(26, 127, 55),
                assistant: Color::Rgb(9, 105, 218),
                system: Color::Rgb(154, 103, 0),
                warning: Color::Rgb(207, 34, 46),
                code_fg: Color::Rgb(36, 41, 47),
                code_bg: Color::Rgb(234, 238, 242),
                syntax_theme: LIGHT_CODE_THEME,
            },
            Theme::Dark => Self {
                background: Color::Rgb(13, 17, 23),
                text: Color::Rgb(230, 237, 243),
                muted: Color::Rgb(125, 133, 144),
                accent: Color::Rgb(88, 166, 255),
                user: Color::Rgb(63, 185, 80),
                assistant: Color::Rgb(88, 166, 255),
                system: Color::Rgb(210, 153, 34),
                warning: Color::Rgb(248, 81, 73),
                code_fg: Color::Rgb(230, 237, 243),
                code_bg: Color::Rgb(22, 27, 34),
                syntax_theme: DARK_CODE_THEME,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeState {
    pub theme: Theme,
    pub toggle_checked: bool,
    pub palette: Palette,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            toggle_checked: false,
            palette: Palette::for_theme(Theme::Light),
        }
    }
}

impl ThemeSurface for ThemeState {
    fn set_theme_attribute(&mut self, theme: Theme) {
        self.theme = theme;
        self.palette = Palette::for_theme(theme);
    }

    fn set_toggle_checked(&mut self, checked: bool) {
        self.toggle_checked = checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_switches_palette() {
        let mut state = ThemeState::default();
        state.set_theme_attribute(Theme::Dark);
        state.set_toggle_checked(true);
        assert_eq!(state.palette, Palette::for_theme(Theme::Dark));
        assert!(state.toggle_checked);
    }

    #[test]
    fn palettes_differ() {
        assert_ne!(
            Palette::for_theme(Theme::Light).background,
            Palette::for_theme(Theme::Dark).background
        );
    }
}
