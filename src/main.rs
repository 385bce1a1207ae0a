mod app;
mod chips;
mod config;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use chips::Chip;
use config::AppConfig;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "chiptray")]
#[command(version)]
#[command(about = "Turn typed or picked text into removable chips in the terminal")]
struct Args {
    /// Read config from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Candidate label (repeatable), replaces the configured candidates
    #[arg(short, long = "candidate")]
    candidates: Vec<String>,

    /// Print the final chips as a JSON array on exit
    #[arg(long, conflicts_with = "print")]
    json: bool,

    /// Print the final chip labels one per line on exit
    #[arg(short, long)]
    print: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so they stay off the alternate screen
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load()?,
    };
    if !args.candidates.is_empty() {
        config.candidates = args.candidates.clone();
    }
    config.validate()?;

    ui::init_theme(Theme::from_overrides(&config.theme));

    let chips = run_tui(App::new(&config))?;

    if args.json {
        println!("{}", serde_json::to_string(&chips)?);
    } else if args.print {
        print_labels(&chips);
    }
    Ok(())
}

fn print_labels(chips: &[Chip]) {
    for chip in chips {
        println!("{}", chip.label);
    }
}

fn run_tui(mut app: App) -> Result<Vec<Chip>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    Ok(app.into_chips())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.quit {
        terminal.draw(|f| ui::draw(f, app))?;

        // One event at a time, handled to completion before the next read
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    app.handle_mouse(mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        // Expire status messages
        app.tick();
    }
    tracing::debug!("quitting with {} chips", app.chips.chips().len());
    Ok(())
}
