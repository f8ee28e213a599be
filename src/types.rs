use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A trait for newtyped integers, that can be used as index types in vectors and sets.
pub trait Idx: Copy + Eq + std::hash::Hash + Ord {
  /// Convert from `T` to `usize`
  fn into_usize(self) -> usize;
  /// Convert from `usize` to `T`
  fn from_usize(_: usize) -> Self;
}

/// A vector indexed by a custom indexing type `I`, usually a newtyped integer.
pub struct IdxVec<I, T>(pub Vec<T>, PhantomData<I>);

impl<I, T: std::fmt::Debug> std::fmt::Debug for IdxVec<I, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

impl<I, T: Clone> Clone for IdxVec<I, T> {
  fn clone(&self) -> Self { Self(self.0.clone(), PhantomData) }
}

impl<I, T: PartialEq> PartialEq for IdxVec<I, T> {
  fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}
impl<I, T: Eq> Eq for IdxVec<I, T> {}

impl<I, T> IdxVec<I, T> {
  /// Returns the value that would be returned by the next call to `push`.
  pub fn peek(&self) -> I
  where I: Idx {
    I::from_usize(self.0.len())
  }

  /// Insert a new value at the end of the vector.
  pub fn push(&mut self, val: T) -> I
  where I: Idx {
    let id = self.peek();
    self.0.push(val);
    id
  }
}

impl<I, T> From<Vec<T>> for IdxVec<I, T> {
  fn from(vec: Vec<T>) -> Self { Self(vec, PhantomData) }
}

impl<I, T> Default for IdxVec<I, T> {
  fn default() -> Self { vec![].into() }
}

impl<I: Idx, T> Index<I> for IdxVec<I, T> {
  type Output = T;
  fn index(&self, index: I) -> &Self::Output { &self.0[I::into_usize(index)] }
}

impl<I: Idx, T> IndexMut<I> for IdxVec<I, T> {
  fn index_mut(&mut self, index: I) -> &mut Self::Output { &mut self.0[I::into_usize(index)] }
}

#[macro_export]
macro_rules! mk_id {
  ($($id:ident,)*) => {
    $(
      #[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
      pub struct $id(pub u32);
      impl $crate::types::Idx for $id {
        fn from_usize(n: usize) -> Self { Self(n as u32) }
        fn into_usize(self) -> usize { self.0 as usize }
      }
      impl std::fmt::Debug for $id {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
      }
    )*
  };
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
  Constant(String),
  /// Only occurs under a quantifier binding the same name
  Variable(String),
  Function {
    name: String,
    /// Invariant: args is not empty
    args: Box<[Term]>,
  },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Binop {
  And,
  Or,
  Implies,
  Iff,
}

impl Binop {
  pub fn prec(self) -> u8 {
    match self {
      Binop::And => 2,
      Binop::Or => 3,
      Binop::Implies => 4,
      Binop::Iff => 5,
    }
  }

  /// Associative connectives print `a ∘ b ∘ c` without brackets on either side.
  pub fn is_assoc(self) -> bool { !matches!(self, Binop::Implies) }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantifier {
  ForAll,
  Exists,
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Formula {
  Prop(String),
  Relation {
    name: String,
    /// Invariant: args is not empty
    args: Box<[Term]>,
  },
  Equality {
    lhs: Box<Term>,
    rhs: Box<Term>,
  },
  Top,
  Bottom,
  Neg {
    f: Box<Formula>,
  },
  Binary {
    op: Binop,
    lhs: Box<Formula>,
    rhs: Box<Formula>,
  },
  Quant {
    q: Quantifier,
    var: String,
    body: Box<Formula>,
  },
}

/// Precedence of negation and of the quantifiers.
pub const PREFIX_PREC: u8 = 1;

impl Formula {
  pub fn prec(&self) -> u8 {
    match self {
      Formula::Prop(_)
      | Formula::Relation { .. }
      | Formula::Equality { .. }
      | Formula::Top
      | Formula::Bottom => 0,
      Formula::Neg { .. } | Formula::Quant { .. } => PREFIX_PREC,
      Formula::Binary { op, .. } => op.prec(),
    }
  }

  /// Unlike the usual smart constructors this never cancels a double negation;
  /// `¬¬a` and `a` are different lines in a proof.
  pub fn mk_neg(self) -> Self { Formula::Neg { f: Box::new(self) } }

  pub fn mk_binary(op: Binop, lhs: Formula, rhs: Formula) -> Self {
    Formula::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
  }

  pub fn mk_and(lhs: Formula, rhs: Formula) -> Self { Self::mk_binary(Binop::And, lhs, rhs) }
  pub fn mk_or(lhs: Formula, rhs: Formula) -> Self { Self::mk_binary(Binop::Or, lhs, rhs) }
  pub fn mk_implies(lhs: Formula, rhs: Formula) -> Self {
    Self::mk_binary(Binop::Implies, lhs, rhs)
  }
  pub fn mk_iff(lhs: Formula, rhs: Formula) -> Self { Self::mk_binary(Binop::Iff, lhs, rhs) }

  pub fn mk_eq(lhs: Term, rhs: Term) -> Self {
    Formula::Equality { lhs: Box::new(lhs), rhs: Box::new(rhs) }
  }

  pub fn mk_quant(q: Quantifier, var: String, body: Formula) -> Self {
    Formula::Quant { q, var, body: Box::new(body) }
  }

  /// Left-associated chain `args[0] ∘ args[1] ∘ ... ∘ args[n-1]`, or `None` if `args` is empty.
  pub fn mk_chain(op: Binop, args: impl IntoIterator<Item = Formula>) -> Option<Formula> {
    args.into_iter().reduce(|lhs, rhs| Self::mk_binary(op, lhs, rhs))
  }

  pub fn as_binary(&self, op: Binop) -> Option<(&Formula, &Formula)> {
    match self {
      Formula::Binary { op: op2, lhs, rhs } if *op2 == op => Some((lhs, rhs)),
      _ => None,
    }
  }

  pub fn as_neg(&self) -> Option<&Formula> {
    match self {
      Formula::Neg { f } => Some(f),
      _ => None,
    }
  }

  pub fn as_quant(&self, q: Quantifier) -> Option<(&str, &Formula)> {
    match self {
      Formula::Quant { q: q2, var, body } if *q2 == q => Some((var, body)),
      _ => None,
    }
  }

  /// The names bound by the leading run of `q` quantifiers, and the remaining body.
  pub fn strip_quants(&self, q: Quantifier) -> (Vec<&str>, &Formula) {
    let (mut vars, mut f) = (vec![], self);
    while let Some((var, body)) = f.as_quant(q) {
      vars.push(var);
      f = body
    }
    (vars, f)
  }

  /// Strip exactly `n` leading `q` quantifiers.
  pub fn strip_n_quants(&self, q: Quantifier, n: usize) -> Option<(Vec<&str>, &Formula)> {
    let (mut vars, mut f) = (vec![], self);
    while vars.len() < n {
      let (var, body) = f.as_quant(q)?;
      vars.push(var);
      f = body
    }
    Some((vars, f))
  }

  /// Collects every constant name occurring in the formula.
  pub fn constants(&self) -> BTreeSet<&str> {
    let mut out = BTreeSet::new();
    self.visit_terms(&mut |tm| {
      if let Term::Constant(c) = tm {
        out.insert(&**c);
      }
    });
    out
  }

  /// Calls `f` on every term (and subterm) of the formula, in order.
  pub fn visit_terms<'a>(&'a self, f: &mut impl FnMut(&'a Term)) {
    match self {
      Formula::Prop(_) | Formula::Top | Formula::Bottom => {}
      Formula::Relation { args, .. } => args.iter().for_each(|tm| tm.visit_terms(f)),
      Formula::Equality { lhs, rhs } => {
        lhs.visit_terms(f);
        rhs.visit_terms(f)
      }
      Formula::Neg { f: g } => g.visit_terms(f),
      Formula::Binary { lhs, rhs, .. } => {
        lhs.visit_terms(f);
        rhs.visit_terms(f)
      }
      Formula::Quant { body, .. } => body.visit_terms(f),
    }
  }
}

impl Term {
  /// Calls `f` on the term and every subterm, in order.
  pub fn visit_terms<'a>(&'a self, f: &mut impl FnMut(&'a Term)) {
    f(self);
    if let Term::Function { args, .. } = self {
      args.iter().for_each(|tm| tm.visit_terms(f))
    }
  }

  pub fn constants(&self) -> BTreeSet<&str> {
    let mut out = BTreeSet::new();
    self.visit_terms(&mut |tm| {
      if let Term::Constant(c) = tm {
        out.insert(&**c);
      }
    });
    out
  }
}

/// A mutating traversal over terms and formulas. Binders are reported through
/// `enter_binder`/`exit_binder` so that implementations can track shadowing.
pub trait VisitMut {
  fn enter_binder(&mut self, _var: &str) {}
  fn exit_binder(&mut self, _var: &str) {}

  fn visit_term(&mut self, tm: &mut Term) { self.super_visit_term(tm) }

  fn super_visit_term(&mut self, tm: &mut Term) {
    if let Term::Function { args, .. } = tm {
      args.iter_mut().for_each(|tm| self.visit_term(tm))
    }
  }

  fn visit_formula(&mut self, f: &mut Formula) { self.super_visit_formula(f) }

  fn super_visit_formula(&mut self, f: &mut Formula) {
    match f {
      Formula::Prop(_) | Formula::Top | Formula::Bottom => {}
      Formula::Relation { args, .. } => args.iter_mut().for_each(|tm| self.visit_term(tm)),
      Formula::Equality { lhs, rhs } => {
        self.visit_term(lhs);
        self.visit_term(rhs)
      }
      Formula::Neg { f } => self.visit_formula(f),
      Formula::Binary { lhs, rhs, .. } => {
        self.visit_formula(lhs);
        self.visit_formula(rhs)
      }
      Formula::Quant { var, body, .. } => {
        self.enter_binder(var);
        self.visit_formula(body);
        self.exit_binder(var)
      }
    }
  }
}

pub trait Visitable<V> {
  fn visit(&mut self, v: &mut V);
  fn visit_cloned(&self, v: &mut V) -> Self
  where Self: Clone {
    let mut t = self.clone();
    t.visit(v);
    t
  }
}

impl<V: VisitMut> Visitable<V> for Term {
  fn visit(&mut self, v: &mut V) { v.visit_term(self) }
}

impl<V: VisitMut> Visitable<V> for Formula {
  fn visit(&mut self, v: &mut V) { v.visit_formula(self) }
}

impl std::fmt::Debug for Term {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Term::Constant(c) => write!(f, "c:{c}"),
      Term::Variable(v) => write!(f, "v:{v}"),
      Term::Function { name, args } => {
        write!(f, "{name}")?;
        f.debug_list().entries(args.iter()).finish()
      }
    }
  }
}

impl std::fmt::Debug for Formula {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Formula::Prop(p) => write!(f, "{p}"),
      Formula::Relation { name, args } => {
        write!(f, "{name}")?;
        f.debug_list().entries(args.iter()).finish()
      }
      Formula::Equality { lhs, rhs } => write!(f, "({lhs:?} = {rhs:?})"),
      Formula::Top => write!(f, "T"),
      Formula::Bottom => write!(f, "F"),
      Formula::Neg { f: g } => write!(f, "¬{g:?}"),
      Formula::Binary { op, lhs, rhs } => write!(f, "({lhs:?} {op:?} {rhs:?})"),
      Formula::Quant { q, var, body } => write!(f, "{q:?} {var}. {body:?}"),
    }
  }
}
