//! Structural matching primitives shared by the inference rules.

use crate::types::*;
use std::collections::{HashMap, HashSet};

const RED_ZONE: usize = 64 * 1024;
const STACK_SIZE: usize = 1024 * 1024;

/// Flattens a tree of `op` connectives into its operands, left to right.
/// A formula whose head is not `op` is its own single operand.
pub fn flatten(op: Binop, f: &Formula) -> Vec<&Formula> {
  fn go<'a>(op: Binop, f: &'a Formula, out: &mut Vec<&'a Formula>) {
    match f.as_binary(op) {
      Some((lhs, rhs)) => {
        go(op, lhs, out);
        go(op, rhs, out)
      }
      None => out.push(f),
    }
  }
  let mut out = vec![];
  go(op, f, &mut out);
  out
}

/// The operands `f` can be split into by one application of an `op` rule:
/// the flattened operands plus the two immediate sides.
pub fn operands(op: Binop, f: &Formula) -> Vec<&Formula> {
  let mut out = flatten(op, f);
  if let Some((lhs, rhs)) = f.as_binary(op) {
    for side in [lhs, rhs] {
      if !out.contains(&side) {
        out.push(side)
      }
    }
  }
  out
}

/// Replaces free occurrences of the mapped variables. A quantifier that
/// rebinds a mapped name hides it from the substitution inside its body.
pub struct Subst<'a> {
  map: &'a HashMap<String, Term>,
  shadowed: Vec<String>,
}

impl<'a> Subst<'a> {
  pub fn new(map: &'a HashMap<String, Term>) -> Self { Self { map, shadowed: vec![] } }
}

impl VisitMut for Subst<'_> {
  fn enter_binder(&mut self, var: &str) { self.shadowed.push(var.to_owned()) }
  fn exit_binder(&mut self, _: &str) { self.shadowed.pop(); }

  fn visit_term(&mut self, tm: &mut Term) {
    if let Term::Variable(v) = tm {
      if !self.shadowed.contains(v) {
        if let Some(t) = self.map.get(v) {
          *tm = t.clone()
        }
      }
      return
    }
    self.super_visit_term(tm)
  }
}

/// `f` with the free variables in `map` replaced.
pub fn subst(f: &Formula, map: &HashMap<String, Term>) -> Formula {
  f.visit_cloned(&mut Subst::new(map))
}

/// `f` with the free variable `var` replaced by `tm`.
pub fn subst1(f: &Formula, var: &str, tm: Term) -> Formula {
  subst(f, &HashMap::from([(var.to_owned(), tm)]))
}

/// Instantiates the leading `q` quantifiers of `f` with `terms`, in order.
/// Returns `None` if `f` has fewer than `terms.len()` of them.
pub fn instantiate(f: &Formula, q: Quantifier, terms: &[Term]) -> Option<Formula> {
  let (vars, body) = f.strip_n_quants(q, terms.len())?;
  let mut map = HashMap::new();
  // with repeated names the innermost binder wins
  for (v, t) in vars.into_iter().zip(terms) {
    map.insert(v.to_owned(), t.clone());
  }
  Some(subst(body, &map))
}

struct ReplaceTerm<'a> {
  from: &'a Term,
  to: &'a Term,
  count: usize,
}

impl VisitMut for ReplaceTerm<'_> {
  fn visit_term(&mut self, tm: &mut Term) {
    if tm == self.from {
      *tm = self.to.clone();
      self.count += 1
    } else {
      self.super_visit_term(tm)
    }
  }
}

/// Replaces every occurrence of `from` by `to`, returning the number of replacements.
pub fn replace_term(f: &Formula, from: &Term, to: &Term) -> (Formula, usize) {
  let mut v = ReplaceTerm { from, to, count: 0 };
  let g = f.visit_cloned(&mut v);
  (g, v.count)
}

/// Whether `dst` is `src` with some (possibly none) occurrences of `from` replaced by `to`.
pub fn replaces_some(src: &Formula, dst: &Formula, from: &Term, to: &Term) -> bool {
  fn term(s: &Term, d: &Term, from: &Term, to: &Term) -> bool {
    if s == d || (s == from && d == to) {
      return true
    }
    match (s, d) {
      (Term::Function { name: n1, args: a1 }, Term::Function { name: n2, args: a2 }) =>
        n1 == n2 && a1.len() == a2.len() && a1.iter().zip(&**a2).all(|(s, d)| term(s, d, from, to)),
      _ => false,
    }
  }
  let terms = |a1: &[Term], a2: &[Term]| {
    a1.len() == a2.len() && a1.iter().zip(a2).all(|(s, d)| term(s, d, from, to))
  };
  match (src, dst) {
    (Formula::Relation { name: n1, args: a1 }, Formula::Relation { name: n2, args: a2 }) =>
      n1 == n2 && terms(a1, a2),
    (Formula::Equality { lhs: l1, rhs: r1 }, Formula::Equality { lhs: l2, rhs: r2 }) =>
      term(l1, l2, from, to) && term(r1, r2, from, to),
    (Formula::Neg { f: f1 }, Formula::Neg { f: f2 }) => replaces_some(f1, f2, from, to),
    (Formula::Binary { op: o1, lhs: l1, rhs: r1 }, Formula::Binary { op: o2, lhs: l2, rhs: r2 }) =>
      o1 == o2 && replaces_some(l1, l2, from, to) && replaces_some(r1, r2, from, to),
    (Formula::Quant { q: q1, var: v1, body: b1 }, Formula::Quant { q: q2, var: v2, body: b2 }) =>
      q1 == q2 && v1 == v2 && replaces_some(b1, b2, from, to),
    _ => src == dst,
  }
}

/// Directed matching: the `pat` side may contain variables from the open set,
/// which are bound (consistently) to the corresponding subterms of the
/// concrete side. Everything else must agree exactly. A variable is never
/// bound to a term mentioning a variable of a quantifier entered during the
/// match, since that binder would capture it.
#[derive(Debug, Default)]
pub struct Matcher {
  open: HashSet<String>,
  bound: Vec<String>,
  pub map: HashMap<String, Term>,
}

fn mentions(tm: &Term, vars: &[String]) -> bool {
  match tm {
    Term::Variable(v) => vars.contains(v),
    Term::Constant(_) => false,
    Term::Function { args, .. } => args.iter().any(|a| mentions(a, vars)),
  }
}

impl Matcher {
  pub fn new<'s>(open: impl IntoIterator<Item = &'s str>) -> Self {
    Self { open: open.into_iter().map(str::to_owned).collect(), ..Self::default() }
  }

  pub fn term(&mut self, tm: &Term, pat: &Term) -> bool {
    if tm == pat {
      return true
    }
    match pat {
      Term::Variable(v) if self.open.contains(v) => match self.map.get(v) {
        Some(bound) => bound == tm,
        None if mentions(tm, &self.bound) => false,
        None => {
          self.map.insert(v.clone(), tm.clone());
          true
        }
      },
      Term::Function { name, args } => match tm {
        Term::Function { name: n2, args: a2 } if name == n2 && args.len() == a2.len() =>
          a2.iter().zip(&**args).all(|(tm, pat)| self.term(tm, pat)),
        _ => false,
      },
      _ => false,
    }
  }

  fn terms(&mut self, tms: &[Term], pats: &[Term]) -> bool {
    tms.len() == pats.len() && tms.iter().zip(pats).all(|(tm, pat)| self.term(tm, pat))
  }

  pub fn formula(&mut self, f: &Formula, pat: &Formula) -> bool {
    stacker::maybe_grow(RED_ZONE, STACK_SIZE, || match (f, pat) {
      (Formula::Prop(a), Formula::Prop(b)) => a == b,
      (Formula::Top, Formula::Top) | (Formula::Bottom, Formula::Bottom) => true,
      (Formula::Relation { name: n1, args: a1 }, Formula::Relation { name: n2, args: a2 }) =>
        n1 == n2 && self.terms(a1, a2),
      (Formula::Equality { lhs: l1, rhs: r1 }, Formula::Equality { lhs: l2, rhs: r2 }) =>
        self.term(l1, l2) && self.term(r1, r2),
      (Formula::Neg { f: f1 }, Formula::Neg { f: f2 }) => self.formula(f1, f2),
      (Formula::Binary { op: o1, .. }, Formula::Binary { op: o2, .. }) if o1 == o2 =>
        if o1.is_assoc() {
          let (fs, pats) = (flatten(*o1, f), flatten(*o1, pat));
          fs.len() == pats.len() && fs.iter().zip(&pats).all(|(f, pat)| self.formula(f, pat))
        } else {
          let (Some((l1, r1)), Some((l2, r2))) = (f.as_binary(*o1), pat.as_binary(*o1)) else {
            return false
          };
          self.formula(l1, l2) && self.formula(r1, r2)
        },
      (Formula::Quant { q: q1, var: v1, body: b1 }, Formula::Quant { q: q2, var: v2, body: b2 })
        if q1 == q2 && v1 == v2 =>
      {
        let shadows = self.open.remove(v1);
        self.bound.push(v1.clone());
        let res = self.formula(b1, b2);
        self.bound.pop();
        if shadows {
          self.open.insert(v1.clone());
        }
        res
      }
      _ => false,
    })
  }
}

/// Whether `general` (with `q` quantifiers in front) specializes to
/// `instance` by replacing some number `k ≥ 1` of the leading bound variables.
pub fn is_instance(instance: &Formula, general: &Formula, q: Quantifier) -> bool {
  let n = general.strip_quants(q).0.len();
  (1..=n).any(|k| {
    let (vars, body) = general.strip_n_quants(q, k).expect("k <= n");
    Matcher::new(vars).formula(instance, body)
  })
}
