use anyhow::Result;
use tracing::info;

use pai_chat::app::App;
use pai_chat::tui::{self, EventHandler, Tui};
use pai_chat::{assets, handler, logging, ui, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the chat works without it
    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    };

    let config = Config::load()?;
    let logo = assets::prepare(&config.assets_dir)?;
    info!(api_base_url = %config.api_base_url, "starting pai-chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let reveal_delay = config.reveal_enabled.then(|| config.reveal_delay());
    let mut events = EventHandler::new(reveal_delay);
    let mut app = App::new(&config, logo);

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!(conversation_id = %app.session.conversation_id(), "session ended");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    let mut needs_draw = true;
    while !app.should_quit {
        if needs_draw {
            terminal.draw(|frame| ui::render(app, frame))?;
        }

        match events.next().await {
            Some(event) => needs_draw = handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
