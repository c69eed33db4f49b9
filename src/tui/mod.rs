pub mod app;
pub mod ui;
pub mod worker;

pub use app::App;
pub use ui::run_tui;
