use crate::types::*;
use pretty::{Arena, DocAllocator, DocBuilder};

/// The documents below contain no breakable lines, so formulas never wrap.
const WIDTH: usize = 100;
const RED_ZONE: usize = 64 * 1024;
const STACK_SIZE: usize = 1024 * 1024;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatterConfig {
  /// Print with the ASCII operator aliases, which re-parse to the same formula.
  pub ascii: bool,
}

impl FormatterConfig {
  pub const UNICODE: Self = Self { ascii: false };
  pub const ASCII: Self = Self { ascii: true };
}

struct Pretty<'a> {
  cfg: FormatterConfig,
  arena: &'a Arena<'a>,
}

impl<'a> std::ops::Deref for Pretty<'a> {
  type Target = &'a Arena<'a>;
  fn deref(&self) -> &Self::Target { &self.arena }
}

type Doc<'a> = DocBuilder<'a, Arena<'a>>;

impl Pretty<'_> {
  fn with<R>(cfg: FormatterConfig, f: impl for<'b> FnOnce(&'b Pretty<'b>) -> R) -> R {
    let arena = Arena::new();
    f(&Pretty { cfg, arena: &arena })
  }
}

impl<'a> Pretty<'a> {
  fn binop(&self, op: Binop) -> &'static str {
    match (op, self.cfg.ascii) {
      (Binop::And, false) => "∧",
      (Binop::And, true) => "&",
      (Binop::Or, false) => "∨",
      (Binop::Or, true) => "|",
      (Binop::Implies, false) => "→",
      (Binop::Implies, true) => "->",
      (Binop::Iff, false) => "↔",
      (Binop::Iff, true) => "<->",
    }
  }

  fn quant(&self, q: Quantifier) -> &'static str {
    match (q, self.cfg.ascii) {
      (Quantifier::ForAll, false) => "∀",
      (Quantifier::ForAll, true) => "(A)",
      (Quantifier::Exists, false) => "∃",
      (Quantifier::Exists, true) => "(E)",
    }
  }

  fn neg(&self) -> &'static str { if self.cfg.ascii { "~" } else { "¬" } }

  fn parens_if(&self, prec: bool, doc: Doc<'a>) -> Doc<'a> {
    if prec {
      doc.parens()
    } else {
      doc
    }
  }

  fn terms(&self, tms: &[Term]) -> Doc<'a> {
    self.intersperse(tms.iter().map(|tm| self.term(tm)), self.text(", ")).parens()
  }

  fn term(&self, tm: &Term) -> Doc<'a> {
    match tm {
      Term::Constant(c) | Term::Variable(c) => self.text(c.clone()),
      Term::Function { name, args } => self.text(name.clone()).append(self.terms(args)),
    }
  }

  fn formula(&self, f: &Formula) -> Doc<'a> {
    stacker::maybe_grow(RED_ZONE, STACK_SIZE, || match f {
      Formula::Prop(p) => self.text(p.clone()),
      Formula::Relation { name, args } => self.text(name.clone()).append(self.terms(args)),
      Formula::Equality { lhs, rhs } =>
        self.term(lhs).append(self.text(" = ")).append(self.term(rhs)),
      Formula::Top => self.text("⊤"),
      Formula::Bottom => self.text("⊥"),
      Formula::Neg { f } =>
        self.text(self.neg()).append(self.parens_if(f.prec() > PREFIX_PREC, self.formula(f))),
      Formula::Binary { op, lhs, rhs } => {
        let needs_parens = |g: &Formula| {
          let (p, q) = (g.prec(), op.prec());
          !(p < q || (p == q && op.is_assoc()))
        };
        self
          .parens_if(needs_parens(lhs), self.formula(lhs))
          .append(self.text(" "))
          .append(self.binop(*op))
          .append(self.text(" "))
          .append(self.parens_if(needs_parens(rhs), self.formula(rhs)))
      }
      Formula::Quant { q, var, body } => self
        .text(self.quant(*q))
        .append(self.text(var.clone()))
        .append(self.formula(body).brackets()),
    })
  }
}

impl Formula {
  pub fn pp(&self, cfg: FormatterConfig) -> String {
    Pretty::with(cfg, |p| {
      let mut out = String::new();
      // writing to a String cannot fail
      let _ = p.formula(self).render_fmt(WIDTH, &mut out);
      out
    })
  }
}

impl std::fmt::Display for Term {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Pretty::with(FormatterConfig::UNICODE, |p| p.term(self).render_fmt(WIDTH, f))
  }
}

impl std::fmt::Display for Formula {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Pretty::with(FormatterConfig::UNICODE, |p| p.formula(self).render_fmt(WIDTH, f))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(s: &str) -> Formula { Formula::Prop(s.into()) }
  fn c(s: &str) -> Term { Term::Constant(s.into()) }

  #[test]
  fn associative_connectives_print_flat() {
    let left = Formula::mk_and(Formula::mk_and(p("A"), p("B")), p("C"));
    let right = Formula::mk_and(p("A"), Formula::mk_and(p("B"), p("C")));
    assert_eq!(left.to_string(), "A ∧ B ∧ C");
    assert_eq!(right.to_string(), "A ∧ B ∧ C");
  }

  #[test]
  fn implication_keeps_brackets() {
    let left = Formula::mk_implies(Formula::mk_implies(p("A"), p("B")), p("C"));
    let right = Formula::mk_implies(p("A"), Formula::mk_implies(p("B"), p("C")));
    assert_eq!(left.to_string(), "(A → B) → C");
    assert_eq!(right.to_string(), "A → (B → C)");
  }

  #[test]
  fn mixed_precedence() {
    let f = Formula::mk_or(Formula::mk_and(p("a"), p("b")), p("c"));
    assert_eq!(f.to_string(), "a ∧ b ∨ c");
    let g = Formula::mk_and(Formula::mk_or(p("a"), p("b")), p("c"));
    assert_eq!(g.to_string(), "(a ∨ b) ∧ c");
    let h = Formula::mk_and(p("a"), p("b")).mk_neg();
    assert_eq!(h.to_string(), "¬(a ∧ b)");
    assert_eq!(p("a").mk_neg().mk_neg().to_string(), "¬¬a");
  }

  #[test]
  fn quantifiers_and_terms() {
    let body = Formula::Relation {
      name: "P".into(),
      args: Box::new([Term::Variable("x".into()), c("a")]),
    };
    let f = Formula::mk_quant(Quantifier::ForAll, "x".into(), body).mk_neg();
    assert_eq!(f.to_string(), "¬∀x[P(x, a)]");
    assert_eq!(f.pp(FormatterConfig::ASCII), "~(A)x[P(x, a)]");
    let eq = Formula::mk_eq(Term::Function { name: "f".into(), args: Box::new([c("a")]) }, c("b"));
    assert_eq!(eq.to_string(), "f(a) = b");
    assert_eq!(Formula::mk_iff(Formula::Top, Formula::Bottom).pp(FormatterConfig::ASCII), "⊤ <-> ⊥");
  }

  #[test]
  fn long_formulas_stay_on_one_line() {
    let props = (0..30).map(|i| p(&format!("proposition{i}")));
    let chain = Formula::mk_chain(Binop::And, props).unwrap();
    let args = (0..30).map(|i| c(&format!("constant{i}"))).collect::<Vec<_>>();
    let rel = Formula::Relation { name: "R".into(), args: args.clone().into() };
    let eq = Formula::mk_eq(Term::Function { name: "f".into(), args: args.into() }, c("b"));
    for f in [chain, rel, eq] {
      assert!(f.to_string().len() > WIDTH);
      assert!(!f.to_string().contains('\n'));
      assert!(!f.pp(FormatterConfig::ASCII).contains('\n'));
    }
  }
}
