//! Terminal UI for the guessing game.

mod app;
mod ui;

pub use app::{App, AppAction};

use crate::advisory::{Advisory, AdvisoryClient};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

/// Completed advisory fetch, tagged with the session that asked for it.
type AdvisoryReply = (u64, Advisory);

/// Runs the TUI until the player quits.
#[instrument(skip(client), fields(online = client.is_online()))]
pub async fn run_tui(client: AdvisoryClient) -> Result<()> {
    info!("Starting guessing game TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, client).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: AdvisoryClient,
) -> Result<()> {
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<AdvisoryReply>();
    let mut app = App::new();

    loop {
        while let Ok((generation, advisory)) = reply_rx.try_recv() {
            app.controller_mut().resolve_advisory(generation, advisory);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(Duration::from_millis(50))? {
            // Let spawned advisory tasks make progress between polls.
            tokio::task::yield_now().await;
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key.code) {
            AppAction::None => {}
            AppAction::Quit => {
                info!("User quit");
                return Ok(());
            }
            AppAction::FetchAdvisory(pending) => {
                debug!(generation = *pending.generation(), "Spawning advisory fetch");
                let client = client.clone();
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let advisory = client.fetch(pending.request()).await;
                    // The receiver is gone only when the UI has exited.
                    let _ = reply_tx.send((*pending.generation(), advisory));
                });
            }
        }
    }
}
