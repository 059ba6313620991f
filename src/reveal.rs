//! Typing-style reveal of an already complete reply.
//!
//! The reply is stored in the session before the first frame is shown, so
//! nothing here touches conversation state. The app steps a [`Reveal`] on
//! every `AppEvent::Reveal` tick and can skip it at any time.

/// Glyph shown after the partial text while the reveal is running
pub const CURSOR: char = '▌';

/// Split text into whitespace-delimited tokens. Each token keeps the
/// whitespace that follows it and leading whitespace sticks to the first
/// one, so the tokens concatenate back to `text` exactly.
fn tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut seen_word = false;
    let mut prev_whitespace = false;

    for (i, c) in text.char_indices() {
        let whitespace = c.is_whitespace();
        if !whitespace && prev_whitespace && seen_word {
            tokens.push(&text[start..i]);
            start = i;
        }
        if !whitespace {
            seen_word = true;
        }
        prev_whitespace = whitespace;
    }

    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

/// Every partial string the reveal shows, in order. All but the last end
/// with [`CURSOR`]; the last is `text` itself.
pub fn reveal_frames(text: &str) -> Vec<String> {
    let tokens = tokens(text);
    if tokens.is_empty() {
        return vec![String::new()];
    }

    let last = tokens.len() - 1;
    let mut shown = String::with_capacity(text.len());
    let mut frames = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        shown.push_str(token);
        if i < last {
            let mut frame = shown.trim_end().to_string();
            frame.push(' ');
            frame.push(CURSOR);
            frames.push(frame);
        } else {
            frames.push(shown.clone());
        }
    }

    frames
}

/// Frame cursor over [`reveal_frames`]
#[derive(Debug, Clone)]
pub struct Reveal {
    frames: Vec<String>,
    pos: usize,
}

impl Reveal {
    pub fn new(text: &str) -> Self {
        Self {
            frames: reveal_frames(text),
            pos: 0,
        }
    }

    /// Step to the next frame. Returns false once the last frame is showing.
    pub fn advance(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        self.pos += 1;
        true
    }

    pub fn skip(&mut self) {
        self.pos = self.frames.len() - 1;
    }

    pub fn visible(&self) -> &str {
        &self.frames[self.pos]
    }

    pub fn is_done(&self) -> bool {
        self.pos + 1 >= self.frames.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_cursor(frame: &str) -> String {
        frame.trim_end_matches(CURSOR).to_string()
    }

    #[test]
    fn test_last_frame_is_original_text() {
        for text in [
            "",
            "Hola",
            "Visita Cusco y Machu Picchu",
            "  leading and trailing  ",
            "line one\nline two\n\n- item\tTab",
            "   ",
        ] {
            let frames = reveal_frames(text);
            let last = frames.last().unwrap();
            assert_eq!(strip_cursor(last), text, "text: {text:?}");
            assert!(!last.ends_with(CURSOR));
        }
    }

    #[test]
    fn test_cursor_on_all_but_last() {
        let frames = reveal_frames("uno dos tres");
        assert_eq!(frames, vec!["uno ▌", "uno dos ▌", "uno dos tres"]);
    }

    #[test]
    fn test_single_word_has_one_frame_without_cursor() {
        assert_eq!(reveal_frames("Lima"), vec!["Lima"]);
    }

    #[test]
    fn test_empty_text_has_single_empty_frame() {
        assert_eq!(reveal_frames(""), vec![String::new()]);
    }

    #[test]
    fn test_tokens_concatenate_back() {
        let text = "  a  b\nc ";
        assert_eq!(tokens(text), vec!["  a  ", "b\n", "c "]);
        assert_eq!(tokens(text).concat(), text);
    }

    #[test]
    fn test_reveal_advances_to_end() {
        let mut reveal = Reveal::new("a b c");
        assert_eq!(reveal.frame_count(), 3);
        assert_eq!(reveal.visible(), "a ▌");
        assert!(reveal.advance());
        assert!(reveal.advance());
        assert!(reveal.is_done());
        assert!(!reveal.advance());
        assert_eq!(reveal.visible(), "a b c");
    }

    #[test]
    fn test_skip_jumps_to_full_text() {
        let mut reveal = Reveal::new("Arequipa es la ciudad blanca");
        reveal.skip();
        assert!(reveal.is_done());
        assert_eq!(reveal.visible(), "Arequipa es la ciudad blanca");
    }
}
