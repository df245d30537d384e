// Parser for the textual IR, one instruction per line:
//
//   param t0:i64
//   t1:i32 = add t0, 4
//   store t1, t0
//   free t0

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use logos::Logos;

use super::lex::Token;
use super::{Instr, Operand, Temp};
use crate::target::ValueType;

struct Parser {
  /// Temps defined so far, by index.
  declared: HashMap<u32, Temp>,
}

impl Parser {
  fn declare(&mut self, index: u32, ty: &str) -> Result<Temp> {
    let ty = ValueType::from_name(ty).ok_or_else(|| anyhow!("unknown value type {}", ty))?;
    if self.declared.contains_key(&index) {
      bail!("t{} defined twice", index);
    }
    let temp = Temp::new(index, ty);
    self.declared.insert(index, temp);
    Ok(temp)
  }

  fn lookup(&self, index: u32) -> Result<Temp> {
    self
      .declared
      .get(&index)
      .copied()
      .ok_or_else(|| anyhow!("t{} used before definition", index))
  }

  /// `operand (, operand)*`, possibly empty.
  fn operands(&self, tokens: &[Token]) -> Result<Vec<Operand>> {
    let mut operands = vec![];
    for (i, token) in tokens.iter().enumerate() {
      let expect_operand = i % 2 == 0;
      match (expect_operand, token) {
        (true, Token::Temp(t)) => operands.push(Operand::Temp(self.lookup(*t)?)),
        (true, Token::Number(n)) => operands.push(Operand::Const(*n)),
        (false, Token::Comma) => {}
        (_, other) => bail!("unexpected {} in operand list", other.as_ref()),
      }
    }
    if tokens.len() % 2 == 0 && !tokens.is_empty() {
      bail!("dangling comma in operand list");
    }
    Ok(operands)
  }

  fn instr(&mut self, line: &[Token]) -> Result<Option<Instr>> {
    let instr = match line {
      [] => return Ok(None),
      [Token::Param, Token::Temp(t), Token::Colon, Token::Ident(ty)] => Instr::Param {
        dest: self.declare(*t, ty)?,
      },
      [Token::Free, Token::Temp(t)] => Instr::Free(self.lookup(*t)?),
      [Token::Temp(t), Token::Colon, Token::Ident(ty), Token::Assgn, Token::Ident(op), rest @ ..] => {
        // operands are read before the destination comes into scope
        let srcs = self.operands(rest)?;
        Instr::Op {
          name: op.to_string(),
          dest: Some(self.declare(*t, ty)?),
          srcs,
        }
      }
      [Token::Ident(op), rest @ ..] => Instr::Op {
        name: op.to_string(),
        dest: None,
        srcs: self.operands(rest)?,
      },
      _ => bail!("malformed instruction"),
    };
    Ok(Some(instr))
  }
}

/// Parse an IR listing into instructions.
pub fn parse_program(src: &str) -> Result<Vec<Instr>> {
  let mut lines: Vec<Vec<Token>> = vec![];
  let mut current = vec![];
  for (token, span) in Token::lexer(src).spanned() {
    match token {
      Token::Newline => lines.push(std::mem::take(&mut current)),
      Token::Error => {
        bail!("line {}: unexpected input {:?}", lines.len() + 1, &src[span]);
      }
      token => current.push(token),
    }
  }
  lines.push(current);

  let mut parser = Parser {
    declared: HashMap::new(),
  };
  let mut instrs = vec![];
  for (line_num, line) in lines.iter().enumerate() {
    if let Some(instr) = parser
      .instr(line)
      .with_context(|| format!("line {}", line_num + 1))?
    {
      instrs.push(instr);
    }
  }
  Ok(instrs)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Instr>> {
  let path = path.as_ref();
  let src =
    fs::read_to_string(path).with_context(|| format!("couldn't read {}", path.display()))?;
  parse_program(&src)
}
