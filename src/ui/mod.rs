//! Terminal presentation for the `gadget` binary.

pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, header, image_header, info, label, not_found, section, success, summary_row, tag, volume,
    warn,
};
pub use progress::IngestProgress;
pub use table::{image_table, stats_table};
pub use theme::{palette, Palette};
