// UI module - plain terminal rendering for the command-line front-end
//
// Architecture:
// - icons: Icon rendering (emoji, Nerd Fonts, ascii) per file type
// - table: Row building and column-aligned table output

pub mod icons;
pub mod table;

pub use icons::{IconMode, IconRenderer};
pub use table::{build_file_rows, render_file_table, render_folder_table, FileRow, RowOptions};
