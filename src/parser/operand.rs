use super::{closer_of, ops, FormulaParser};
use crate::error::{ParseError, ParseResult, SymbolKind};
use crate::types::{Formula, Term};

/// Characters that can never appear in a name.
const RESERVED: &str = "()[],=⊤⊥";

pub(super) fn check_name(name: &str) -> ParseResult<&str> {
  let bad = |c: char| c.is_whitespace() || RESERVED.contains(c) || ops::is_operator_lead(c);
  if name.is_empty() || name.contains(bad) {
    return Err(ParseError::InvalidName(name.to_owned()))
  }
  Ok(name)
}

/// Split on `sep`, ignoring separators nested inside brackets.
pub(super) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
  let (mut out, mut depth, mut start) = (vec![], 0usize, 0);
  for (i, c) in text.char_indices() {
    match c {
      '(' | '[' => depth += 1,
      ')' | ']' => depth = depth.saturating_sub(1),
      _ if c == sep && depth == 0 => {
        out.push(&text[start..i]);
        start = i + c.len_utf8()
      }
      _ => {}
    }
  }
  out.push(&text[start..]);
  out
}

/// Splits `name(args)` into `name` and `args`, or returns `None` for a bare name.
fn split_application(text: &str) -> ParseResult<Option<(&str, &str)>> {
  let Some(open_at) = text.find(['(', '[']) else { return Ok(None) };
  let open = text[open_at..].chars().next().expect("found above");
  let close = closer_of(open);
  let mut depth = 0usize;
  for (i, c) in text[open_at..].char_indices() {
    if c == '(' || c == '[' {
      depth += 1
    } else if c == ')' || c == ']' {
      depth -= 1;
      if depth == 0 {
        let end = open_at + i;
        if c != close {
          return Err(ParseError::MismatchedBracket { open, close: c })
        }
        if end + c.len_utf8() != text.len() {
          return Err(ParseError::InvalidName(text.to_owned()))
        }
        return Ok(Some((text[..open_at].trim_end(), &text[open_at + open.len_utf8()..end])))
      }
    }
  }
  Err(ParseError::UnmatchedBracket(open))
}

impl<'a> FormulaParser<'a> {
  /// Reads the text of one operand: up to the next operator or top-level
  /// bracket. A bracket directly after a name opens an argument list, which is
  /// read as a unit so that the operators and commas inside it are skipped.
  pub(super) fn operand_text(&mut self) -> ParseResult<&'a str> {
    let rest = self.rest();
    let mut closers: Vec<char> = vec![];
    let mut prev: Option<char> = None;
    let mut end = rest.len();
    for (i, c) in rest.char_indices() {
      if let Some(&expected) = closers.last() {
        match c {
          '(' | '[' => closers.push(closer_of(c)),
          ')' | ']' if c == expected => drop(closers.pop()),
          ')' | ']' => {
            let open = super::opener_of(expected);
            return Err(ParseError::MismatchedBracket { open, close: c })
          }
          _ => {}
        }
      } else {
        match c {
          '(' | '[' if prev.map_or(false, |p| !p.is_whitespace() && p != '=' && p != ',') =>
            closers.push(closer_of(c)),
          '(' | '[' | ')' | ']' => {
            end = i;
            break
          }
          _ if ops::is_operator_lead(c) => {
            end = i;
            break
          }
          _ => {}
        }
      }
      prev = Some(c);
    }
    if let Some(&expected) = closers.last() {
      return Err(ParseError::UnmatchedBracket(super::opener_of(expected)))
    }
    self.pos += end;
    Ok(rest[..end].trim())
  }

  /// Interprets operand text as an atomic formula.
  pub(super) fn operand(&mut self, text: &str) -> ParseResult<Formula> {
    match text {
      "⊤" => return Ok(Formula::Top),
      "⊥" => return Ok(Formula::Bottom),
      _ => {}
    }
    match *split_top_level(text, '=') {
      [_] => {}
      [lhs, rhs] => {
        if lhs.trim().is_empty() || rhs.trim().is_empty() {
          return Err(ParseError::MalformedEquality(text.to_owned()))
        }
        return Ok(Formula::mk_eq(self.term(lhs)?, self.term(rhs)?))
      }
      _ => return Err(ParseError::MalformedEquality(text.to_owned())),
    }
    match split_application(text)? {
      None => Ok(Formula::Prop(check_name(text)?.to_owned())),
      Some((name, args)) => {
        let name = check_name(name)?.to_owned();
        let args = self.arguments(text, args)?;
        self.sig.record_arity(SymbolKind::Relation, &name, args.len())?;
        Ok(Formula::Relation { name, args })
      }
    }
  }

  fn arguments(&mut self, whole: &str, args: &str) -> ParseResult<Box<[Term]>> {
    split_top_level(args, ',')
      .into_iter()
      .map(|arg| {
        if arg.trim().is_empty() {
          return Err(ParseError::EmptyArgument(whole.to_owned()))
        }
        self.term(arg)
      })
      .collect()
  }

  /// A bare name is a variable if an enclosing quantifier binds it, and a
  /// constant otherwise.
  pub(super) fn term(&mut self, text: &str) -> ParseResult<Term> {
    let text = text.trim();
    match split_application(text)? {
      None => {
        let name = check_name(text)?;
        if self.vars.iter().any(|v| v == name) {
          Ok(Term::Variable(name.to_owned()))
        } else {
          self.sig.add_constant(name);
          Ok(Term::Constant(name.to_owned()))
        }
      }
      Some((name, args)) => {
        let name = check_name(name)?.to_owned();
        let args = self.arguments(text, args)?;
        self.sig.record_arity(SymbolKind::Function, &name, args.len())?;
        Ok(Term::Function { name, args })
      }
    }
  }
}
