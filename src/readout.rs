//! The `ctx.arc(...)` call that draws the current arc, split into
//! syntax-highlighted tokens.

use crate::arc::{round_to, PRECISION};
use crate::state::AngleState;
use crate::surface::Rgba;
use std::f64::consts::PI;

/// Background behind the readout.
pub const BACKGROUND: Rgba = Rgba::rgb(0x34, 0x3a, 0x40);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Punctuation,
    Function,
    Number,
    Namespace,
    Keyword,
}

impl TokenKind {
    pub fn color(self) -> Rgba {
        match self {
            TokenKind::Identifier => Rgba::rgb(0x4f, 0xc1, 0xff),
            TokenKind::Punctuation => Rgba::rgb(0xd4, 0xd4, 0xd4),
            TokenKind::Function => Rgba::rgb(0xdc, 0xdc, 0xaa),
            TokenKind::Number => Rgba::rgb(0xb5, 0xce, 0xa8),
            TokenKind::Namespace => Rgba::rgb(0x9c, 0xdc, 0xfe),
            TokenKind::Keyword => Rgba::rgb(0x56, 0x9c, 0xd6),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

/// `angle` as a multiple of PI, formatted like a JavaScript number.
pub fn pi_multiple(angle: f64) -> String {
    js_number(round_to(angle / PI, PRECISION))
}

/// `Number#toString` for values that are already rounded to a few decimals:
/// plain digits below 1e21, exponent form with an explicit sign above.
fn js_number(value: f64) -> String {
    if value.is_finite() && value.abs() >= 1e21 {
        format!("{:e}", value).replacen('e', "e+", 1)
    } else {
        format!("{}", value)
    }
}

pub fn tokens(state: &AngleState) -> Vec<Token> {
    use TokenKind::*;

    let mut out = vec![
        Token::new(Identifier, "ctx"),
        Token::new(Punctuation, "."),
        Token::new(Function, "arc"),
        Token::new(Punctuation, "("),
        Token::new(Identifier, "x"),
        Token::new(Punctuation, ", "),
        Token::new(Identifier, "y"),
        Token::new(Punctuation, ", "),
        Token::new(Identifier, "radius"),
    ];
    for angle in [state.start_angle, state.end_angle] {
        out.extend([
            Token::new(Punctuation, ", "),
            Token::new(Number, pi_multiple(angle)),
            Token::new(Punctuation, " * "),
            Token::new(Namespace, "Math"),
            Token::new(Punctuation, "."),
            Token::new(Identifier, "PI"),
        ]);
    }
    if let Some(anticlockwise) = state.direction.anticlockwise() {
        out.push(Token::new(Punctuation, ", "));
        out.push(Token::new(Keyword, anticlockwise.to_string()));
    }
    out.push(Token::new(Punctuation, ");"));
    out
}

/// The plain text of the call.
pub fn render(state: &AngleState) -> String {
    tokens(state).into_iter().map(|t| t.text).collect()
}
