pub const NO_USABLE_RESPONSE: &str = "I'm sorry, I couldn't get a response from the AI.";

/// Outcome of a turn that reached the model and came back with a 2xx body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    NoUsableResponse,
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::NoUsableResponse => NO_USABLE_RESPONSE,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}
