//! Presentation: terminal text, HTML panes, the dashboard and the static site.
//!
//! All renderers are pure: the same stock data gives the same bytes. Times
//! shown come from the record's fetch timestamp.

pub mod assets;
pub mod charts;
pub mod dashboard;
pub mod format;
pub mod income;
pub mod pane;
pub mod site;
pub mod terminal;

pub use charts::build_chart_set;
pub use dashboard::{render_dashboard, sidebar_html, tab_html, DashboardMode};
pub use pane::pane_html;
pub use site::{render_site, write_site};
pub use terminal::{render_report, ReportMode};
