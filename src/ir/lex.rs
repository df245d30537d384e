// Lexer for the textual IR. Relies on logos 0.12.1, see docs
// (https://docs.rs/logos/0.12.1/logos/index.html)

use logos::{Lexer, Logos};
use strum_macros::AsRefStr;

fn temp_index<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Option<u32> {
  // skip over the leading t
  lex.slice()[1..].parse().ok()
}

fn number<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Option<i64> {
  lex.slice().parse().ok()
}

#[derive(Clone, Copy, Logos, Debug, PartialEq, AsRefStr)]
pub enum Token<'a> {
  #[regex(r"t[0-9]+", temp_index, priority = 3)]
  Temp(u32),
  #[regex(r"-?[0-9]+", number)]
  Number(i64),
  #[regex(r"[A-Za-z_][A-Za-z0-9_.]*")]
  Ident(&'a str),

  #[token("param")]
  Param,
  #[token("free")]
  Free,

  #[token(":")]
  Colon,
  #[token("=")]
  Assgn,
  #[token(",")]
  Comma,
  #[token("\n")]
  Newline,

  #[error]
  #[regex(r"[ \t\r\f]+", logos::skip)] // Whitespace
  #[regex(r";[^\n]*", logos::skip)] // Comment to end of line
  Error,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lex(src: &str) -> Vec<Token<'_>> {
    Token::lexer(src).collect()
  }

  #[test]
  fn test_definition_line() {
    assert_eq!(
      lex("t12:i32 = add t1, -4 ; trailing\n"),
      vec![
        Token::Temp(12),
        Token::Colon,
        Token::Ident("i32"),
        Token::Assgn,
        Token::Ident("add"),
        Token::Temp(1),
        Token::Comma,
        Token::Number(-4),
        Token::Newline,
      ]
    );
  }

  #[test]
  fn test_keywords_and_idents() {
    assert_eq!(
      lex("free t0\nparam t1:ptr\ntest"),
      vec![
        Token::Free,
        Token::Temp(0),
        Token::Newline,
        Token::Param,
        Token::Temp(1),
        Token::Colon,
        Token::Ident("ptr"),
        Token::Newline,
        Token::Ident("test"),
      ]
    );
  }

  #[test]
  fn test_error_token() {
    assert!(lex("t0 @ t1").contains(&Token::Error));
  }
}
