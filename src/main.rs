mod config;
mod db;
mod form;
mod invoice_gen;
mod models;
mod totals;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::form::FormState;
use crate::invoice_gen::{render_document, InvoiceGenerator};
use crate::models::{DisplayPreferences, Theme};
use crate::ui::invoice_form::{handle_input, render_invoice_form, InvoiceFormAction, InvoiceFormState};

const TICK: Duration = Duration::from_millis(100);

type ExportResult = std::result::Result<PathBuf, String>;

// Main application state
struct AppState {
    db: Option<db::Database>,
    generator: InvoiceGenerator,
    form_state: InvoiceFormState,
    export_tx: UnboundedSender<ExportResult>,
    export_rx: UnboundedReceiver<ExportResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;
    init_logging(&config)?;
    info!("Initializing invoice builder...");

    // The preference store is optional; without it the theme just isn't remembered
    let db = db::init(&config).await;
    let theme = load_theme(db.as_ref()).await;

    let preferences = DisplayPreferences {
        currency_symbol: config.currency.clone(),
        theme,
    };
    let mut form = FormState::new(&preferences);
    if let Some(rate) = &config.tax_rate {
        form.set_tax_rate_input(rate);
    }

    let (export_tx, export_rx) = mpsc::unbounded_channel();
    let mut app_state = AppState {
        db,
        generator: InvoiceGenerator::new(&config.output_dir, &config.pdf_engine),
        form_state: InvoiceFormState::new(form, preferences.theme),
        export_tx,
        export_rx,
    };

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        error!(error = %err, "invoice builder stopped");
        println!("Error: {}", err);
    }

    println!("Thanks for using Invoice Builder!");

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn load_theme(db: Option<&db::Database>) -> Theme {
    let Some(db) = db else {
        return Theme::Light;
    };
    match db.load_theme().await {
        Ok(theme) => theme,
        Err(err) => {
            warn!(error = %err, "failed to read theme preference");
            Theme::Light
        }
    }
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Pick up finished exports before drawing
        while let Ok(result) = app_state.export_rx.try_recv() {
            app_state.form_state.finish_export(result);
        }

        terminal.draw(|f| render_invoice_form(f, &mut app_state.form_state))?;

        match handle_input(&mut app_state.form_state, TICK)? {
            Some(InvoiceFormAction::Quit) => break,
            Some(InvoiceFormAction::ToggleTheme) => toggle_theme(app_state).await,
            Some(InvoiceFormAction::ExportPdf) => start_export(app_state),
            None => {}
        }
    }

    Ok(())
}

async fn toggle_theme(app_state: &mut AppState) {
    let theme = app_state.form_state.theme().toggled();
    app_state.form_state.set_theme(theme);

    if let Some(db) = &app_state.db {
        if let Err(err) = db.save_theme(theme).await {
            warn!(error = %err, "Failed to save theme preference");
        }
    }
}

fn start_export(app_state: &mut AppState) {
    if !app_state.form_state.begin_export() {
        return;
    }

    // Totals are recomputed right before the document is handed off
    let recomputed = app_state.form_state.refresh().clone();
    let document = render_document(app_state.form_state.form(), &recomputed);
    let generator = app_state.generator.clone();
    let tx = app_state.export_tx.clone();

    info!(items = recomputed.rows.len(), "generating PDF");
    tokio::spawn(async move {
        let result = generator.export(&document).await.map_err(|err| {
            error!(error = %err, "Error generating PDF");
            err.to_string()
        });
        // The receiver only goes away when the app is quitting
        let _ = tx.send(result);
    });
}
