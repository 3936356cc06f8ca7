//! Semantic styling on top of `console`
//!
//! Colors are decided once, at construction; every formatter below honours
//! that decision so output piped to a file stays free of escape codes.

use console::{Style, StyledObject};

/// Symbol set for one terminal class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub checkmark: &'static str,
    pub cross: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub bullet: &'static str,
}

const UNICODE: Symbols = Symbols {
    checkmark: "✓",
    cross: "✗",
    warning: "!",
    info: "·",
    bullet: "•",
};

const ASCII: Symbols = Symbols {
    checkmark: "+",
    cross: "x",
    warning: "!",
    info: "-",
    bullet: "*",
};

#[derive(Debug, Clone)]
pub struct StyleManager {
    color: bool,
    symbols: Symbols,
}

impl StyleManager {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            symbols: if console::Term::stdout().features().wants_emoji() {
                UNICODE
            } else {
                ASCII
            },
        }
    }

    /// No colors, ASCII symbols
    pub fn plain() -> Self {
        Self {
            color: false,
            symbols: ASCII,
        }
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    fn paint<'a>(&self, style: Style, text: &'a str) -> StyledObject<&'a str> {
        style.force_styling(self.color).apply_to(text)
    }

    pub fn style_success(&self, text: &str) -> String {
        self.paint(Style::new().green(), text).to_string()
    }

    pub fn style_error(&self, text: &str) -> String {
        self.paint(Style::new().red(), text).to_string()
    }

    pub fn style_warning(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text).to_string()
    }

    pub fn style_info(&self, text: &str) -> String {
        self.paint(Style::new().cyan(), text).to_string()
    }

    pub fn style_emphasis(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text).to_string()
    }

    pub fn style_subtle(&self, text: &str) -> String {
        self.paint(Style::new().dim(), text).to_string()
    }

    pub fn format_success(&self, message: &str) -> String {
        format!("{} {}", self.style_success(self.symbols.checkmark), message)
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", self.style_error(self.symbols.cross), message)
    }

    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.style_warning(self.symbols.warning), message)
    }

    pub fn format_info(&self, message: &str) -> String {
        format!("{} {}", self.style_info(self.symbols.info), message)
    }

    pub fn bullet(&self) -> String {
        self.style_subtle(self.symbols.bullet)
    }
}
