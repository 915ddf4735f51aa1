pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, file_failed, header, section, status, success, warn};
pub use progress::{BatchProgress, Spinner};
pub use table::{stats_table, TableBuilder};
pub use theme::{theme, Theme};
