//! Automated responder used while no human agent is engaged

/// Stand-in responder that acknowledges what the user said
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

impl EchoResponder {
    pub fn render(text: &str) -> String {
        format!("AI: I heard you say \"{text}\"")
    }
}
