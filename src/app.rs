use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::error;

use crate::api::{ApiResponse, AssistantApi, AssistantClient};
use crate::assets::Logo;
use crate::config::Config;
use crate::reveal::Reveal;
use crate::session::{ChatSession, DisplayRecord, TurnPhase};

pub const TITLE: &str = "Asistente Turístico Interactivo";

pub const DISCLAIMER: &str =
    "🧪 Entorno de Prueba: Este es un chat de demostración para probar casos de uso de agentes IA.";

pub const CAPABILITIES_HEADING: &str =
    "¡Pregúntame cualquier cosa sobre destinos turísticos! Puedo ayudarte con:";

pub const CAPABILITIES: [&str; 9] = [
    "Encontrar lugares turísticos específicos",
    "Obtener información detallada sobre destinos",
    "Calcular distancias entre lugares",
    "Obtener direcciones y rutas",
    "Encontrar atracciones cercanas",
    "Información sobre el clima y la mejor época para visitar",
    "Recomendaciones de hoteles y restaurantes",
    "Información sobre actividades y tours disponibles",
    "¡Y ayudarte a reservar tu próxima aventura!",
];

pub const INPUT_PLACEHOLDER: &str = "¿Qué te gustaría saber?";

pub struct App {
    pub should_quit: bool,
    pub session: ChatSession<AssistantClient>,
    pub logo: Logo,

    // Input line
    pub input: String,
    pub input_cursor: usize,

    // Turn in flight and reveal of the last reply
    pub pending: Option<JoinHandle<ApiResponse>>,
    pub reveal: Option<Reveal>,
    pub reveal_enabled: bool,
    pub animation_frame: u8,

    // Chat scrolling; sizes are inner sizes, set by the renderer
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,
    pub chat_width: u16,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config, logo: Logo) -> Self {
        Self::with_session(
            ChatSession::new(AssistantClient::new(&config.api_base_url)),
            config.reveal_enabled,
            logo,
        )
    }

    pub fn with_session(
        session: ChatSession<AssistantClient>,
        reveal_enabled: bool,
        logo: Logo,
    ) -> Self {
        Self {
            should_quit: false,
            session,
            logo,
            input: String::new(),
            input_cursor: 0,
            pending: None,
            reveal: None,
            reveal_enabled,
            animation_frame: 0,
            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.session.phase() == TurnPhase::AwaitingApiResponse
    }

    /// Send the input line as a new turn. The request runs on its own task;
    /// [`App::poll_reply`] collects it.
    pub fn submit_input(&mut self) {
        if self.is_waiting() {
            return;
        }

        let Some(request) = self.session.begin_turn(&self.input) else {
            return;
        };

        self.input.clear();
        self.input_cursor = 0;
        self.skip_reveal();
        self.follow_tail = true;

        let client = self.session.client().clone();
        self.pending = Some(tokio::spawn(async move { client.query(&request).await }));
    }

    /// Record the reply once its task has finished. Returns true if a reply
    /// was recorded.
    pub async fn poll_reply(&mut self) -> bool {
        match &self.pending {
            Some(handle) if handle.is_finished() => {}
            _ => return false,
        }
        let Some(handle) = self.pending.take() else {
            return false;
        };

        let response = match handle.await {
            Ok(response) => response,
            Err(e) => {
                error!("query task failed: {}", e);
                ApiResponse {
                    response: format!("Error connecting to the API: {}", e),
                    conversation_id: None,
                }
            }
        };

        let reply = self.session.complete_turn(response);
        if self.reveal_enabled {
            self.reveal = Some(Reveal::new(&reply.content));
        }
        self.follow_tail = true;
        true
    }

    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Show the next word of the reply being revealed. Returns false when
    /// no reveal is running, so there is nothing to redraw.
    pub fn advance_reveal(&mut self) -> bool {
        let Some(reveal) = &mut self.reveal else {
            return false;
        };
        if !reveal.advance() {
            self.reveal = None;
        }
        true
    }

    /// Jump straight to the full reply. Returns true if a reveal was running.
    pub fn skip_reveal(&mut self) -> bool {
        self.reveal.take().is_some()
    }

    /// The transcript as it should look right now: the last reply is cut to
    /// the reveal frame while the reveal runs.
    pub fn visible_history(&self) -> Vec<DisplayRecord> {
        let mut records = self.session.render_history();
        if let (Some(reveal), Some(last)) = (&self.reveal, records.last_mut()) {
            last.content = reveal.visible().to_string();
        }
        records
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_chat_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll >= max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_line_count().saturating_sub(visible_height)
    }

    /// Approximate rendered height of the transcript at the current width
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total_lines: usize = 0;
        for record in self.visible_history() {
            total_lines += 1; // Avatar line
            for line in record.content.lines() {
                let char_count = line.chars().count();
                total_lines += char_count / wrap_width + 1;
            }
            total_lines += 1; // Blank line after message
        }

        if self.is_waiting() {
            total_lines += 2; // Avatar + "Pensando..."
        }

        total_lines.min(u16::MAX as usize) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GREETING;

    fn app_for(base_url: &str) -> App {
        let config = Config {
            api_base_url: base_url.to_string(),
            ..Config::new()
        };
        App::new(&config, Logo::Missing { warning: String::new() })
    }

    async fn wait_for_reply(app: &mut App) {
        for _ in 0..200 {
            if app.poll_reply().await {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("reply never arrived");
    }

    #[tokio::test]
    async fn test_submit_runs_turn_and_reveals_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"response": "Visita el Valle Sagrado", "conversation_id": "c-7"}"#)
            .create_async()
            .await;

        let mut app = app_for(&server.url());
        app.input = "¿Qué hago en Cusco?".to_string();
        app.input_cursor = app.input.chars().count();

        app.submit_input();
        assert!(app.is_waiting());
        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);

        wait_for_reply(&mut app).await;

        assert!(!app.is_waiting());
        assert_eq!(app.session.conversation_id(), "c-7");
        // Stored in full even though the reveal has only started
        assert_eq!(
            app.session.messages().last().map(|m| m.content.as_str()),
            Some("Visita el Valle Sagrado")
        );
        let visible = app.visible_history();
        assert_eq!(visible.last().map(|r| r.content.as_str()), Some("Visita ▌"));

        for _ in 0..10 {
            app.advance_reveal();
        }
        assert!(app.reveal.is_none());
        assert_eq!(
            app.visible_history().last().map(|r| r.content.clone()),
            Some("Visita el Valle Sagrado".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_input_does_not_start_a_turn() {
        let mut app = app_for("http://127.0.0.1:1");
        app.input = "   ".to_string();

        app.submit_input();

        assert!(app.pending.is_none());
        assert!(!app.is_waiting());
        assert_eq!(app.session.message_count(), 1);
    }

    #[tokio::test]
    async fn test_skip_reveal_shows_full_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"response": "uno dos tres"}"#)
            .create_async()
            .await;

        let mut app = app_for(&server.url());
        app.input = "hola".to_string();
        app.submit_input();
        wait_for_reply(&mut app).await;

        assert!(app.skip_reveal());
        assert!(!app.skip_reveal());
        assert_eq!(
            app.visible_history().last().map(|r| r.content.clone()),
            Some("uno dos tres".to_string())
        );
    }

    #[tokio::test]
    async fn test_reveal_disabled_shows_reply_at_once() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"response": "uno dos tres"}"#)
            .create_async()
            .await;

        let mut app = app_for(&server.url());
        app.reveal_enabled = false;
        app.input = "hola".to_string();
        app.submit_input();
        wait_for_reply(&mut app).await;

        assert!(app.reveal.is_none());
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let mut app = app_for("http://127.0.0.1:1");
        app.chat_height = 2;
        app.chat_width = 200;

        // Greeting: avatar + one line + blank = 3 lines, 1 line of overflow
        app.scroll_down(10);
        assert_eq!(app.chat_scroll, 1);
        assert!(app.follow_tail);

        app.scroll_up(5);
        assert_eq!(app.chat_scroll, 0);
        assert!(!app.follow_tail);
        assert_eq!(app.visible_history()[0].content, GREETING);
    }

    #[test]
    fn test_large_scroll_step_does_not_overflow() {
        let mut app = app_for("http://127.0.0.1:1");
        app.chat_height = 2;
        app.chat_width = 200;
        app.chat_scroll = 1;

        app.scroll_down(u16::MAX);
        assert_eq!(app.chat_scroll, 1);
        assert!(app.follow_tail);
    }

    #[test]
    fn test_advance_without_reveal_reports_no_change() {
        let mut app = app_for("http://127.0.0.1:1");
        assert!(!app.advance_reveal());
    }
}
