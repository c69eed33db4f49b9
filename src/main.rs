use anyhow::Result;
use ledger_desk::config::Settings;
use ledger_desk::tui;
use std::fs::File;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

// stdout belongs to the terminal UI, so logs go to a file
fn init_tracing(settings: &Settings) {
    let writer = match File::create(&settings.log_file) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    init_tracing(&settings);
    info!(
        ledger_dir = %settings.ledger_dir.display(),
        model = %settings.model,
        "starting ledger-desk"
    );
    tui::run_tui(settings)
}
