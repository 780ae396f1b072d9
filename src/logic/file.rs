//! File type detection
//!
//! Pure functions for mapping file names to display categories.

/// Category of a document, used to pick its icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Image,
    Word,
    Excel,
    PowerPoint,
    Text,
    Generic,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
            FileKind::Word => "word",
            FileKind::Excel => "excel",
            FileKind::PowerPoint => "powerpoint",
            FileKind::Text => "text",
            FileKind::Generic => "generic",
        }
    }
}

/// Extract the lowercase extension of the last path component
///
/// Returns `None` when the name has no dot or ends with one.
///
/// # Examples
/// ```
/// use spbrowse::logic::file::extension_of;
///
/// assert_eq!(extension_of("report.PDF").as_deref(), Some("pdf"));
/// assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
/// assert_eq!(extension_of("v1.2/README"), None);
/// assert_eq!(extension_of("notes."), None);
/// ```
pub fn extension_of(name: &str) -> Option<String> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Classify a file by its extension (case insensitive)
///
/// Total: empty names, names without an extension and unknown extensions
/// all yield [`FileKind::Generic`].
///
/// # Examples
/// ```
/// use spbrowse::logic::file::{classify_file, FileKind};
///
/// assert_eq!(classify_file("report.PDF"), FileKind::Pdf);
/// assert_eq!(classify_file("budget.xlsx"), FileKind::Excel);
/// assert_eq!(classify_file("Makefile"), FileKind::Generic);
/// assert_eq!(classify_file(""), FileKind::Generic);
/// ```
pub fn classify_file(name: &str) -> FileKind {
    let Some(ext) = extension_of(name) else {
        return FileKind::Generic;
    };

    match ext.as_str() {
        "pdf" => FileKind::Pdf,
        "jpg" | "jpeg" | "png" | "gif" | "svg" => FileKind::Image,
        "doc" | "docx" => FileKind::Word,
        "xls" | "xlsx" => FileKind::Excel,
        "ppt" | "pptx" => FileKind::PowerPoint,
        "txt" => FileKind::Text,
        _ => FileKind::Generic,
    }
}

/// Same as [`classify_file`], treating a missing name as generic
pub fn classify_optional(name: Option<&str>) -> FileKind {
    name.map(classify_file).unwrap_or(FileKind::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify_file("a.pdf"), FileKind::Pdf);
        for name in ["a.jpg", "a.jpeg", "a.png", "a.gif", "logo.svg"] {
            assert_eq!(classify_file(name), FileKind::Image, "{}", name);
        }
        assert_eq!(classify_file("a.doc"), FileKind::Word);
        assert_eq!(classify_file("a.docx"), FileKind::Word);
        assert_eq!(classify_file("a.xls"), FileKind::Excel);
        assert_eq!(classify_file("a.xlsx"), FileKind::Excel);
        assert_eq!(classify_file("a.ppt"), FileKind::PowerPoint);
        assert_eq!(classify_file("a.pptx"), FileKind::PowerPoint);
        assert_eq!(classify_file("a.txt"), FileKind::Text);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_file("report.PDF"), FileKind::Pdf);
        assert_eq!(classify_file("Photo.JpEg"), FileKind::Image);
        assert_eq!(classify_file("MINUTES.DOCX"), FileKind::Word);
    }

    #[test]
    fn test_classify_generic_fallbacks() {
        assert_eq!(classify_file(""), FileKind::Generic);
        assert_eq!(classify_file("pdf"), FileKind::Generic);
        assert_eq!(classify_file("archive.zip"), FileKind::Generic);
        assert_eq!(classify_file("trailing."), FileKind::Generic);
        assert_eq!(classify_optional(None), FileKind::Generic);
        assert_eq!(classify_optional(Some("x.txt")), FileKind::Text);
    }

    #[test]
    fn test_classify_uses_last_path_component() {
        assert_eq!(classify_file("/sites/Lib/2024/Q1/report.pdf"), FileKind::Pdf);
        assert_eq!(classify_file("/sites/v2.pdf/notes"), FileKind::Generic);
        assert_eq!(classify_file("C:\\docs\\plan.pptx"), FileKind::PowerPoint);
    }

    #[test]
    fn test_dotfile_extension() {
        // ".txt" has an empty stem but a valid extension
        assert_eq!(classify_file(".txt"), FileKind::Text);
    }

    proptest! {
        #[test]
        fn classify_accepts_any_name(name in any::<String>()) {
            let kind = classify_file(&name);
            prop_assert_eq!(classify_optional(Some(name.as_str())), kind);
        }

        #[test]
        fn names_without_extension_are_generic(
            dir in "[a-z]{1,8}\\.(pdf|docx|png)",
            name in "[^./\\\\]{0,24}",
        ) {
            prop_assert_eq!(classify_file(&name), FileKind::Generic);
            let nested = format!("/sites/{}/{}", dir, name);
            prop_assert_eq!(classify_file(&nested), FileKind::Generic);
        }

        #[test]
        fn known_extensions_ignore_case(
            stem in "[A-Za-z0-9 _-]{0,16}",
            (ext, kind) in prop::sample::select(vec![
                ("pdf", FileKind::Pdf),
                ("jpeg", FileKind::Image),
                ("docx", FileKind::Word),
                ("xls", FileKind::Excel),
                ("pptx", FileKind::PowerPoint),
                ("txt", FileKind::Text),
            ]),
            upper in any::<bool>(),
        ) {
            let ext = if upper { ext.to_uppercase() } else { ext.to_string() };
            prop_assert_eq!(classify_file(&format!("{}.{}", stem, ext)), kind);
        }
    }
}
