//! Operator-precedence parser for first-order formulas.
//!
//! The parser keeps three stacks: pending operators (and open brackets),
//! finished formulas, and the names bound by quantifiers that have been read
//! but not yet committed. The last one is what decides whether a name in term
//! position is a [`Term::Variable`] or a [`Term::Constant`].

use crate::error::{ParseError, ParseResult};
use crate::signature::Signature;
use crate::types::{Binop, Formula, Quantifier, Term};
use ops::Operator;
use tracing::trace;

mod operand;
pub mod ops;

#[derive(Copy, Clone, Debug)]
enum StackOp {
  Op(Operator),
  Open(char),
}

fn closer_of(open: char) -> char { if open == '[' { ']' } else { ')' } }
fn opener_of(close: char) -> char { if close == ']' { '[' } else { '(' } }

pub struct FormulaParser<'a> {
  sig: &'a mut Signature,
  src: &'a str,
  pos: usize,
  ops: Vec<StackOp>,
  formulas: Vec<Formula>,
  vars: Vec<String>,
}

/// Parse one formula, recording new constants and arities in `sig`.
///
/// On error `sig` may already contain names recorded before the error was
/// found; callers that need isolation should snapshot it first, see
/// [`parse_batch`].
pub fn parse_formula(text: &str, sig: &mut Signature) -> ParseResult<Formula> {
  let res = FormulaParser::new(text, sig).run();
  match &res {
    Ok(f) => trace!("parsed {text:?} as {f:?}"),
    Err(e) => trace!("failed to parse {text:?}: {e}"),
  }
  res
}

/// Parse a single closed term. Every bare name is a constant.
pub fn parse_term(text: &str, sig: &mut Signature) -> ParseResult<Term> {
  FormulaParser::new(text, sig).term(text)
}

/// Parse a comma separated list of closed terms.
pub fn parse_terms(text: &str, sig: &mut Signature) -> ParseResult<Vec<Term>> {
  let mut p = FormulaParser::new(text, sig);
  operand::split_top_level(text, ',').into_iter().map(|s| p.term(s)).collect()
}

/// Parse several independent formulas. A formula that fails to parse leaves
/// no trace in `sig`, so it cannot disturb the arities seen by the others.
pub fn parse_batch<'t>(
  texts: impl IntoIterator<Item = &'t str>, sig: &mut Signature,
) -> Vec<ParseResult<Formula>> {
  texts
    .into_iter()
    .map(|text| {
      let snapshot = sig.clone();
      let res = parse_formula(text, sig);
      if res.is_err() {
        *sig = snapshot
      }
      res
    })
    .collect()
}

impl<'a> FormulaParser<'a> {
  pub fn new(src: &'a str, sig: &'a mut Signature) -> Self {
    Self { sig, src, pos: 0, ops: vec![], formulas: vec![], vars: vec![] }
  }

  fn rest(&self) -> &'a str { &self.src[self.pos..] }

  fn peek(&self) -> Option<char> { self.rest().chars().next() }

  fn skip_ws(&mut self) {
    let rest = self.rest();
    self.pos += rest.len() - rest.trim_start().len();
  }

  pub fn run(mut self) -> ParseResult<Formula> {
    loop {
      self.skip_ws();
      let Some(c) = self.peek() else { break };
      if let Some((op, len)) = ops::match_operator(self.rest()) {
        self.pos += len;
        self.push_operator(op)?;
        if op.is_quantifier() {
          let var = self.bound_variable(op)?;
          self.vars.push(var)
        }
      } else if c == '(' || c == '[' {
        self.pos += c.len_utf8();
        self.ops.push(StackOp::Open(c))
      } else if c == ')' || c == ']' {
        self.pos += c.len_utf8();
        self.close(c)?
      } else if ops::is_operator_lead(c) {
        return Err(ParseError::UnknownOperator(c))
      } else {
        let text = self.operand_text()?;
        let f = self.operand(text)?;
        self.formulas.push(f)
      }
    }
    while let Some(top) = self.ops.pop() {
      match top {
        StackOp::Op(op) => self.commit(op)?,
        StackOp::Open(c) => return Err(ParseError::UnmatchedBracket(c)),
      }
    }
    match self.formulas.len() {
      0 => Err(ParseError::Empty),
      1 => Ok(self.formulas.pop().expect("length checked")),
      _ => Err(ParseError::MissingOperator),
    }
  }

  /// A binary operator first commits everything on the stack (up to the
  /// nearest bracket) that binds at least as tightly, which makes chains of
  /// one operator associate to the left. Prefix operators have no left
  /// operand, so they are simply pushed.
  fn push_operator(&mut self, op: Operator) -> ParseResult<()> {
    if !op.is_unary() {
      while let Some(&StackOp::Op(top)) = self.ops.last() {
        if top.priority() > op.priority() {
          break
        }
        self.ops.pop();
        self.commit(top)?
      }
    }
    self.ops.push(StackOp::Op(op));
    Ok(())
  }

  fn close(&mut self, close: char) -> ParseResult<()> {
    loop {
      match self.ops.pop() {
        Some(StackOp::Op(op)) => self.commit(op)?,
        Some(StackOp::Open(open)) if closer_of(open) == close => return Ok(()),
        Some(StackOp::Open(open)) => return Err(ParseError::MismatchedBracket { open, close }),
        None => return Err(ParseError::UnmatchedBracket(close)),
      }
    }
  }

  fn pop_formula(&mut self, op: Operator) -> ParseResult<Formula> {
    self.formulas.pop().ok_or(ParseError::MissingOperand(op.symbol()))
  }

  fn commit(&mut self, op: Operator) -> ParseResult<()> {
    let f = match op {
      Operator::Not => self.pop_formula(op)?.mk_neg(),
      Operator::And | Operator::Or | Operator::Implies | Operator::Iff => {
        let binop = match op {
          Operator::And => Binop::And,
          Operator::Or => Binop::Or,
          Operator::Implies => Binop::Implies,
          _ => Binop::Iff,
        };
        let rhs = self.pop_formula(op)?;
        let lhs = self.pop_formula(op)?;
        Formula::mk_binary(binop, lhs, rhs)
      }
      Operator::ForAll | Operator::Exists => {
        let q = if op == Operator::ForAll { Quantifier::ForAll } else { Quantifier::Exists };
        let body = self.pop_formula(op)?;
        let var = self.vars.pop().ok_or(ParseError::MissingBoundVariable(op.symbol()))?;
        Formula::mk_quant(q, var, body)
      }
    };
    self.formulas.push(f);
    Ok(())
  }

  /// The token after a quantifier: everything up to whitespace, a bracket or
  /// an operator.
  fn bound_variable(&mut self, op: Operator) -> ParseResult<String> {
    self.skip_ws();
    let rest = self.rest();
    let len = rest
      .find(|c: char| c.is_whitespace() || "()[]".contains(c) || ops::is_operator_lead(c))
      .unwrap_or(rest.len());
    if len == 0 {
      return Err(ParseError::MissingBoundVariable(op.symbol()))
    }
    let name = operand::check_name(&rest[..len])?;
    self.pos += len;
    Ok(name.to_owned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::SymbolKind;

  fn p(s: &str) -> Formula { Formula::Prop(s.into()) }
  fn c(s: &str) -> Term { Term::Constant(s.into()) }
  fn v(s: &str) -> Term { Term::Variable(s.into()) }

  fn parse(s: &str) -> Formula { parse_formula(s, &mut Signature::new()).unwrap() }
  fn parse_err(s: &str) -> ParseError { parse_formula(s, &mut Signature::new()).unwrap_err() }

  #[test]
  fn propositional_variable() {
    let mut sig = Signature::new();
    assert_eq!(parse_formula("my_variable", &mut sig).unwrap(), p("my_variable"));
    assert_eq!(sig, Signature::new());
  }

  #[test]
  fn negation_aliases_and_postfix() {
    for s in ["~a", "a~", "¬a", "!a", "˜a"] {
      let f = parse(s);
      assert_eq!(f, p("a").mk_neg(), "{s}");
      assert_eq!(f.to_string(), "¬a");
    }
    assert_eq!(parse("¬¬a"), p("a").mk_neg().mk_neg());
    assert_eq!(parse("~(a & b)"), Formula::mk_and(p("a"), p("b")).mk_neg());
  }

  #[test]
  fn left_associated_chains() {
    let expected = Formula::mk_chain(Binop::And, ["A", "B", "C", "D", "E"].map(p)).unwrap();
    for s in ["A ∧ B ∧ C ∧ D ∧ E", "A ^ B ^ C ^ D ^ E", "A & B & C & D & E", "A&&B&&C&&D&&E"] {
      let f = parse(s);
      assert_eq!(f, expected, "{s}");
      assert_eq!(f.to_string(), "A ∧ B ∧ C ∧ D ∧ E");
    }
    let imp = parse("A → B → C → D → E");
    assert_eq!(imp, Formula::mk_chain(Binop::Implies, ["A", "B", "C", "D", "E"].map(p)).unwrap());
    assert_eq!(imp.to_string(), "(((A → B) → C) → D) → E");
  }

  #[test]
  fn precedence_and_brackets() {
    assert_eq!(parse("a | b & c"), Formula::mk_or(p("a"), Formula::mk_and(p("b"), p("c"))));
    assert_eq!(parse("(a | b) & c"), Formula::mk_and(Formula::mk_or(p("a"), p("b")), p("c")));
    assert_eq!(parse("[a + b] . c"), Formula::mk_and(Formula::mk_or(p("a"), p("b")), p("c")));
    assert_eq!(
      parse("a -> b <-> ~b -> ~a"),
      Formula::mk_iff(
        Formula::mk_implies(p("a"), p("b")),
        Formula::mk_implies(p("b").mk_neg(), p("a").mk_neg())
      )
    );
    assert_eq!(parse("~a & b"), Formula::mk_and(p("a").mk_neg(), p("b")));
    assert_eq!(parse("⊤ > ⊥"), Formula::mk_implies(Formula::Top, Formula::Bottom));
  }

  #[test]
  fn function_application_and_equality() {
    let mut sig = Signature::new();
    let f = parse_formula("funct(const, another(further), additional) = some", &mut sig).unwrap();
    let funct = Term::Function {
      name: "funct".into(),
      args: Box::new([
        c("const"),
        Term::Function { name: "another".into(), args: Box::new([c("further")]) },
        c("additional"),
      ]),
    };
    assert_eq!(f, Formula::mk_eq(funct, c("some")));
    let consts: Vec<_> = sig.constants.iter().map(|s| &**s).collect();
    assert_eq!(consts, ["additional", "const", "further", "some"]);
    assert_eq!(sig.arity(SymbolKind::Function, "funct"), Some(3));
    assert_eq!(sig.arity(SymbolKind::Function, "another"), Some(1));
    assert!(sig.relations.is_empty());
  }

  #[test]
  fn quantifiers_bind_variables() {
    let mut sig = Signature::new();
    let f = parse_formula("∀x[P(x, a)] ∧ Q(x)", &mut sig).unwrap();
    let all = Formula::mk_quant(
      Quantifier::ForAll,
      "x".into(),
      Formula::Relation { name: "P".into(), args: Box::new([v("x"), c("a")]) },
    );
    let q = Formula::Relation { name: "Q".into(), args: Box::new([c("x")]) };
    assert_eq!(f, Formula::mk_and(all, q));
    assert!(sig.constants.contains("a"));
    assert!(sig.constants.contains("x"));
    assert_eq!(sig.arity(SymbolKind::Relation, "P"), Some(2));
  }

  #[test]
  fn nested_and_ascii_quantifiers() {
    let f = parse("(A)x (E)y R(x, y)");
    let body = Formula::Relation { name: "R".into(), args: Box::new([v("x"), v("y")]) };
    let expected = Formula::mk_quant(
      Quantifier::ForAll,
      "x".into(),
      Formula::mk_quant(Quantifier::Exists, "y".into(), body),
    );
    assert_eq!(f, expected);
    assert_eq!(f.to_string(), "∀x[∃y[R(x, y)]]");
    assert_eq!(parse("∀x ∃y [R(x, y)]"), expected);
    assert_eq!(parse("¬∃x(P(x))").to_string(), "¬∃x[P(x)]");
  }

  #[test]
  fn errors() {
    assert_eq!(parse_err(""), ParseError::Empty);
    assert_eq!(parse_err("a - b"), ParseError::UnknownOperator('-'));
    assert_eq!(parse_err("(a & b"), ParseError::UnmatchedBracket('('));
    assert_eq!(parse_err("a & b)"), ParseError::UnmatchedBracket(')'));
    assert_eq!(parse_err("(a & b]"), ParseError::MismatchedBracket { open: '(', close: ']' });
    assert_eq!(parse_err("a &"), ParseError::MissingOperand("∧"));
    assert_eq!(parse_err("~"), ParseError::MissingOperand("¬"));
    assert_eq!(parse_err("∀[P]"), ParseError::MissingBoundVariable("∀"));
    assert_eq!(parse_err("a = b = c"), ParseError::MalformedEquality("a = b = c".into()));
    assert_eq!(parse_err("(a)(b)"), ParseError::MissingOperator);
    assert_eq!(parse_err("a b"), ParseError::InvalidName("a b".into()));
    assert_eq!(parse_err("P(a,)"), ParseError::EmptyArgument("P(a,)".into()));
    assert!(matches!(parse_err("P(a) & P(a, b)"), ParseError::ArityConflict { .. }));
    assert!(matches!(parse_err("f(a) = f(a, b)"), ParseError::ArityConflict { .. }));
  }

  #[test]
  fn batch_isolates_failures() {
    let mut sig = Signature::new();
    let res = parse_batch(["P(a)", "Q(b) & P(a, b)", "Q(c, d)"], &mut sig);
    assert!(res[0].is_ok());
    assert!(matches!(res[1], Err(ParseError::ArityConflict { .. })));
    // Q was recorded with arity 1 by the failing formula, which must not leak
    assert!(res[2].is_ok());
    assert_eq!(sig.arity(SymbolKind::Relation, "Q"), Some(2));
    assert!(!sig.constants.contains("b"));
  }

  #[test]
  fn terms() {
    let mut sig = Signature::new();
    assert_eq!(parse_term(" f(a) ", &mut sig).unwrap(), Term::Function {
      name: "f".into(),
      args: Box::new([c("a")])
    });
    assert_eq!(parse_terms("a, g(b, c)", &mut sig).unwrap().len(), 2);
    assert!(parse_term("f(a, b)", &mut sig).is_err());
  }
}
