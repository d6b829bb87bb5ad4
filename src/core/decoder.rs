//! Response decoding
//!
//! `COMPLETE` returns plain text when called without options and a JSON
//! envelope when options are given:
//!
//! ```json
//! {"choices": [{"messages": "Paris"}], "created": 1717000000, "model": "llama3-8b"}
//! ```
//!
//! Anything that does not match the envelope shape is used as the reply
//! as-is, so decoding never fails.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Envelope {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    messages: String,
}

/// Outcome of decoding a raw result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// Text of the first choice of a well-formed envelope
    Structured(String),
    /// The raw result, which did not match the envelope shape
    Raw(&'a str),
}

impl Decoded<'_> {
    pub fn into_text(self) -> String {
        match self {
            Decoded::Structured(text) => text,
            Decoded::Raw(raw) => raw.to_string(),
        }
    }
}

/// Try the envelope shape, keeping the raw text when it doesn't fit
pub fn parse(raw: &str) -> Decoded<'_> {
    match serde_json::from_str::<Envelope>(raw) {
        Ok(envelope) => match envelope.choices.into_iter().next() {
            Some(choice) => Decoded::Structured(choice.messages),
            None => Decoded::Raw(raw),
        },
        Err(_) => Decoded::Raw(raw),
    }
}

/// Reply text for a raw completion result
pub fn decode(raw: &str) -> String {
    let decoded = parse(raw);
    if let Decoded::Raw(_) = decoded {
        tracing::debug!("Completion result is not an envelope, using raw text");
    }
    decoded.into_text()
}
