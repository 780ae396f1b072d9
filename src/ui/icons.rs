use crate::logic::file::FileKind;

/// Icon display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconMode {
    #[default]
    Emoji, // Standard emoji icons (📁, 📄, etc.)
    NerdFont, // Nerd Fonts icons (U+E5FF, etc.)
    Ascii,    // Plain text tags for terminals without either
}

impl IconMode {
    /// Parse the `icon_mode` config value, falling back to emoji
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "nerdfont" | "nerd_font" | "nerd-font" => IconMode::NerdFont,
            "ascii" | "text" => IconMode::Ascii,
            _ => IconMode::Emoji,
        }
    }
}

/// Icon renderer for file rows and folders
pub struct IconRenderer {
    mode: IconMode,
}

impl IconRenderer {
    pub fn new(mode: IconMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> IconMode {
        self.mode
    }

    /// Icon for a file of the given kind
    pub fn file_icon(&self, kind: FileKind) -> &'static str {
        let (emoji, nerd, ascii) = match kind {
            FileKind::Pdf => ("📕", "\u{F1C1}", "[pdf]"),
            FileKind::Image => ("🎨", "\u{F1C5}", "[img]"),
            FileKind::Word => ("📝", "\u{F1C2}", "[doc]"),
            FileKind::Excel => ("📊", "\u{F1C3}", "[xls]"),
            FileKind::PowerPoint => ("📙", "\u{F1C4}", "[ppt]"),
            FileKind::Text => ("📃", "\u{F15C}", "[txt]"),
            FileKind::Generic => ("📄", "\u{F15B}", "[---]"),
        };

        match self.mode {
            IconMode::Emoji => emoji,
            IconMode::NerdFont => nerd,
            IconMode::Ascii => ascii,
        }
    }

    /// Icon for a folder
    pub fn folder_icon(&self) -> &'static str {
        match self.mode {
            IconMode::Emoji => "📁",
            IconMode::NerdFont => "\u{E5FF}",
            IconMode::Ascii => "[dir]",
        }
    }

    /// Icon for a failed folder fetch
    pub fn error_icon(&self) -> &'static str {
        match self.mode {
            IconMode::Emoji => "❌",
            IconMode::NerdFont => "\u{F00D}",
            IconMode::Ascii => "[err]",
        }
    }
}
