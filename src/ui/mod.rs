pub mod browser;
pub mod components;

pub use browser::{BrowserAction, BrowserEntry, FileBrowser};
pub use components::{
    render_algorithm_select, render_compare_panel, render_digest_panel, render_help_bar,
    render_popup, render_status_bar, render_too_small,
};
