use super::propositional::pair;
use super::{ask, Action, Context, Input, InputKind, Mode, Premise};
use crate::error::RuleResult;
use crate::types::*;
use crate::unify::{replace_term, replaces_some};

fn as_eq(f: &Formula) -> Option<(&Term, &Term)> {
  match f {
    Formula::Equality { lhs, rhs } => Some((lhs, rhs)),
    _ => None,
  }
}

pub(super) fn eq_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  match cx.mode {
    Mode::Forward => {
      let Some(i) = input else { return ask("Term to equate with itself", InputKind::Terms(1)) };
      let t = &i.terms()[0];
      cx.derive(Formula::mk_eq(t.clone(), t.clone()), vec![])
    }
    Mode::Backward(g) => match as_eq(g) {
      Some((a, b)) if a == b => cx.justify(vec![]),
      _ => cx.fail("the goal is not of the form t = t"),
    },
  }
}

pub(super) fn eq_elim(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      cx.count("exactly two", |n| n == 2)?;
      let rewrite = |eq: &Formula, f: &Formula| {
        let (a, b) = as_eq(eq)?;
        let (g, n) = replace_term(f, a, b);
        (n > 0).then_some(g)
      };
      match pair(cx, rewrite) {
        Some((g, premises)) => cx.derive(g, premises),
        None => cx.fail("no cited equation rewrites the other line"),
      }
    }
    Mode::Backward(g) => match cx.cites[..] {
      [_, _] => {
        let rewrites = |eq: &Formula, f: &Formula| {
          let (a, b) = as_eq(eq)?;
          (f != g && replaces_some(f, g, a, b)).then_some(())
        };
        match pair(cx, rewrites) {
          Some(((), premises)) => cx.justify(premises),
          None => cx.fail("the goal is not a rewrite of a cited line"),
        }
      }
      [(id, eq)] => {
        let Some((a, b)) = as_eq(eq) else {
          return cx.fail(format!("line {} is not an equation", cx.number(id)))
        };
        match replace_term(g, b, a) {
          (_, 0) => cx.fail(format!("the goal does not mention {b}")),
          (f, _) => cx.justify(vec![Premise::Cite(id), Premise::Goal(f)]),
        }
      }
      _ => cx.wrong_count("one or two"),
    },
  }
}

pub(super) fn eq_sym(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      let Some((a, b)) = as_eq(f) else {
        return cx.fail(format!("line {} is not an equation", cx.number(id)))
      };
      cx.derive(Formula::mk_eq(b.clone(), a.clone()), vec![Premise::Cite(id)])
    }
    Mode::Backward(g) => {
      let Some((a, b)) = as_eq(g) else { return cx.fail("the goal is not an equation") };
      let flipped = Formula::mk_eq(b.clone(), a.clone());
      match cx.at_most_one()? {
        None => cx.justify(vec![Premise::Goal(flipped)]),
        Some((id, f)) if *f == flipped => cx.justify(vec![Premise::Cite(id)]),
        Some((id, _)) => cx.fail(format!("line {} is not {flipped}", cx.number(id))),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::super::tests::Harness;
  use super::super::{InputKind, Rule};
  use crate::error::RuleError;

  #[test]
  fn reflexivity() {
    let mut h = Harness::new(&[], "f(a) = f(a)");
    h.apply(Rule::EqIntro, &[1]).unwrap();
    assert_eq!(h.request().kind, InputKind::Terms(1));
    h.terms("f(a)").unwrap();
    assert_eq!(h.rows(), ["1 f(a) = f(a)  =I"]);

    let mut h = Harness::new(&[], "a = a");
    h.apply(Rule::EqIntro, &[2]).unwrap();
    assert!(h.proof.is_complete());
    let mut h = Harness::new(&[], "a = b");
    assert!(matches!(h.apply(Rule::EqIntro, &[2]), Err(RuleError::Invalid { .. })));
  }

  #[test]
  fn substitution_forward() {
    let mut h = Harness::new(&["P(a, a)", "a = b"], "P(b, b)");
    h.apply(Rule::EqElim, &[1, 2, 3]).unwrap();
    assert_eq!(h.rows(), ["1 P(a, a)  Given", "2 a = b  Given", "3 P(b, b)  =E 2, 1"]);

    let mut h = Harness::new(&["a = b", "P(c)"], "P(d)");
    assert!(matches!(h.apply(Rule::EqElim, &[1, 2, 3]), Err(RuleError::Invalid { .. })));
    assert!(matches!(h.apply(Rule::EqElim, &[1, 3]), Err(RuleError::WrongCount { .. })));
  }

  #[test]
  fn substitution_backward() {
    let mut h = Harness::new(&["a = b", "P(a, a)"], "P(a, b)");
    h.apply(Rule::EqElim, &[1, 2, 4]).unwrap();
    assert!(h.proof.is_complete());

    let mut h = Harness::new(&["a = b"], "Q(b)");
    h.apply(Rule::EqElim, &[1, 3]).unwrap();
    assert_eq!(h.rows(), ["1 a = b  Given", "2 (empty)", "3 Q(a)  Goal", "4 Q(b)  =E 1, 3"]);

    let mut h = Harness::new(&["a = b"], "Q(c)");
    assert!(matches!(h.apply(Rule::EqElim, &[1, 3]), Err(RuleError::Invalid { .. })));
  }

  #[test]
  fn symmetry() {
    let mut h = Harness::new(&["a = b"], "b = a");
    h.apply(Rule::EqSym, &[1, 2]).unwrap();
    assert_eq!(h.rows(), ["1 a = b  Given", "2 b = a  =Sym 1"]);

    let mut h = Harness::new(&["a = b"], "b = a");
    h.apply(Rule::EqSym, &[1, 3]).unwrap();
    assert!(h.proof.is_complete());

    let mut h = Harness::new(&[], "b = a");
    h.apply(Rule::EqSym, &[2]).unwrap();
    assert_eq!(h.rows(), ["1 (empty)", "2 a = b  Goal", "3 b = a  =Sym 2"]);
  }
}
