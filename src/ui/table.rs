use tabled::settings::object::Segment;
use tabled::settings::{Modify, Style, Width};
use tabled::{Table, Tabled};

use super::icons::IconRenderer;
use crate::api::{FileEntry, FolderSummary, ListViewDetails};
use crate::logic::breadcrumb::{build_breadcrumbs, BasePathPolicy};
use crate::logic::file::classify_file;
use crate::logic::formatting::{format_bytes, format_date};

/// Widest a single cell may grow before it is truncated
pub const MAX_CELL_WIDTH: usize = 48;

/// Display settings shared by every row
pub struct RowOptions<'a> {
    pub base_path: &'a str,
    pub view: &'a ListViewDetails,
    pub policy: BasePathPolicy,
    pub locale: &'a str,
    pub date_format: &'a str,
}

/// One rendered line of the file table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct FileRow {
    #[tabled(rename = "")]
    pub icon: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Modified")]
    pub modified: String,
    #[tabled(rename = "Modified by")]
    pub author: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Location")]
    pub location: String,
}

#[derive(Tabled)]
struct FolderRow {
    #[tabled(rename = "")]
    icon: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Items")]
    items: u64,
    #[tabled(rename = "Id")]
    id: String,
}

/// Turn fetched files into table rows with icons, dates and breadcrumb trails
pub fn build_file_rows(
    files: &[FileEntry],
    renderer: &IconRenderer,
    options: &RowOptions<'_>,
) -> Vec<FileRow> {
    files
        .iter()
        .map(|file| {
            let modified = if file.time_last_modified.is_empty() {
                String::new()
            } else {
                format_date(
                    file.time_last_modified.as_str(),
                    Some(options.locale),
                    Some(options.date_format),
                )
                .unwrap_or_else(|e| {
                    tracing::debug!("Keeping raw timestamp for {}: {}", file.name, e);
                    file.time_last_modified.clone()
                })
            };

            let trail = build_breadcrumbs(
                &file.server_relative_url,
                options.base_path,
                options.view,
                options.policy,
            );
            let location = trail
                .iter()
                .map(|item| item.label.as_str())
                .collect::<Vec<_>>()
                .join(" › ");

            FileRow {
                icon: renderer.file_icon(classify_file(&file.name)).to_string(),
                name: file.name.clone(),
                modified,
                author: file.modified_by.title.clone(),
                size: format_bytes(file.length),
                location,
            }
        })
        .collect()
}

/// Apply the shared style and cell-width cap to a table
fn finish(mut table: Table) -> String {
    table
        .with(Style::sharp())
        .with(Modify::new(Segment::all()).with(Width::truncate(MAX_CELL_WIDTH).suffix("…")));
    let mut out = table.to_string();
    out.push('\n');
    out
}

/// Render the flattened file listing
pub fn render_file_table(rows: &[FileRow]) -> String {
    finish(Table::new(rows))
}

/// Render a list of folders (root folders of a list)
pub fn render_folder_table(folders: &[FolderSummary], renderer: &IconRenderer) -> String {
    let rows = folders.iter().map(|folder| FolderRow {
        icon: renderer.folder_icon().to_string(),
        name: folder.name.clone(),
        items: folder.item_count,
        id: folder.unique_id.clone(),
    });
    finish(Table::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Author;
    use crate::ui::icons::IconMode;

    fn view() -> ListViewDetails {
        ListViewDetails {
            id: "abc-123".to_string(),
            server_relative_url: "/sites/Lib/Forms/AllItems.aspx".to_string(),
            title: None,
        }
    }

    #[test]
    fn test_build_file_rows() {
        let files = vec![FileEntry {
            unique_id: "f1".to_string(),
            name: "report.PDF".to_string(),
            server_relative_url: "/sites/Lib/2024/Q1/report.PDF".to_string(),
            length: 2048,
            time_last_modified: "2024-10-25T13:45:00Z".to_string(),
            modified_by: Author {
                title: "Ana Rojas".to_string(),
                email: String::new(),
            },
        }];
        let view = view();
        let options = RowOptions {
            base_path: "/sites/Lib",
            view: &view,
            policy: BasePathPolicy::Lenient,
            locale: "es",
            date_format: "D [de] MMMM [de] YYYY",
        };

        let rows = build_file_rows(&files, &IconRenderer::new(IconMode::Ascii), &options);

        assert_eq!(
            rows[0],
            FileRow {
                icon: "[pdf]".to_string(),
                name: "report.PDF".to_string(),
                modified: "25 de octubre de 2024".to_string(),
                author: "Ana Rojas".to_string(),
                size: "2.00 KB".to_string(),
                location: "2024 › Q1".to_string(),
            }
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_shown_raw() {
        let files = vec![FileEntry {
            unique_id: "f1".to_string(),
            name: "a.txt".to_string(),
            server_relative_url: "/sites/Lib/a.txt".to_string(),
            length: 0,
            time_last_modified: "yesterday".to_string(),
            modified_by: Author::default(),
        }];
        let view = view();
        let options = RowOptions {
            base_path: "/sites/Lib",
            view: &view,
            policy: BasePathPolicy::Strict,
            locale: "en",
            date_format: "MMMM D, YYYY",
        };

        let rows = build_file_rows(&files, &IconRenderer::new(IconMode::Emoji), &options);
        assert_eq!(rows[0].modified, "yesterday");
        assert_eq!(rows[0].location, "");
    }

    fn row(name: &str, size: &str) -> FileRow {
        FileRow {
            icon: "[txt]".to_string(),
            name: name.to_string(),
            modified: "October 25, 2024".to_string(),
            author: "Ana Rojas".to_string(),
            size: size.to_string(),
            location: "2024 › Q1".to_string(),
        }
    }

    #[test]
    fn test_render_file_table() {
        let out = render_file_table(&[row("a.txt", "1 B"), row("longer-name.docx", "2.00 KB")]);
        let lines: Vec<&str> = out.lines().collect();

        // Top border, header, separator, two rows, bottom border
        assert_eq!(lines.len(), 6);
        for header in ["Name", "Modified by", "Size", "Location"] {
            assert!(lines[1].contains(header), "missing header {}", header);
        }
        assert!(lines[3].contains("a.txt") && lines[3].contains("1 B"));
        assert!(lines[4].contains("longer-name.docx") && lines[4].contains("2.00 KB"));
        // Columns line up
        assert_eq!(lines[3].find("Ana Rojas"), lines[4].find("Ana Rojas"));
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(MAX_CELL_WIDTH * 2);
        let out = render_file_table(&[row(&long, "1 B")]);

        assert!(!out.contains(&long));
        let kept = out.lines().nth(3).unwrap().matches('x').count();
        assert!(kept < MAX_CELL_WIDTH, "kept {} characters", kept);
        assert!(out.contains("x…"));
    }

    #[test]
    fn test_render_folder_table() {
        let folders = vec![FolderSummary {
            unique_id: "f-1".to_string(),
            name: "Shared Documents".to_string(),
            server_relative_url: "/sites/Lib/Shared Documents".to_string(),
            item_count: 12,
            time_last_modified: None,
        }];

        let out = render_folder_table(&folders, &IconRenderer::new(IconMode::Ascii));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].contains("Items") && lines[1].contains("Id"));
        assert!(lines[3].contains("Shared Documents"));
        assert!(lines[3].contains("12"));
        assert!(lines[3].contains("f-1"));
    }
}
