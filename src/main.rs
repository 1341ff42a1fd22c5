use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use hashcheck::app::{App, AppMode};
use hashcheck::cli::{self, Cli};
use hashcheck::config::Config;
use hashcheck::events::handle_events;
use hashcheck::logging::{self, LogTarget};
use hashcheck::ui::{
    render_algorithm_select, render_compare_panel, render_digest_panel, render_help_bar,
    render_status_bar, render_too_small,
};

const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = args.apply(config);
    let target = if args.command.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    let filter = logging::resolve_filter(args.log_level.as_deref(), config.log_level.as_deref(), &target)?;
    logging::init(target, filter)?;

    if let Some(command) = args.command {
        return cli::run(command, &config, args.json).await;
    }

    tracing::info!(log = %logging::log_file_path().display(), "starting interactive session");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "interactive session failed");
        eprintln!("Error: {:?}", err);
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                render_too_small(f);
                return;
            }

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(0),    // Main area
                    Constraint::Length(1), // Status bar
                    Constraint::Length(1), // Help bar
                ])
                .split(area);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[0]);

            let panels = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(columns[1]);

            let title = match &app.mode {
                AppMode::Browse(purpose) => purpose.title(),
                _ => "Files (o to choose)",
            };
            app.browser.render(f, columns[0], title);
            render_digest_panel(f, panels[0], app);
            render_compare_panel(f, panels[1], app);
            render_status_bar(f, chunks[1], app);
            render_help_bar(f, chunks[2], app);

            if matches!(app.mode, AppMode::SelectAlgorithm) {
                render_algorithm_select(f, &mut app.algorithm_list);
            }
        })?;

        // Apply results from background digest and comparison jobs
        app.poll_background_tasks();

        handle_events(app)?;

        if app.should_quit {
            tracing::info!("quitting");
            return Ok(());
        }
    }
}
