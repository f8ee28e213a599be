use super::{ask, Action, BoxSpec, Context, Input, InputKind, Mode, Premise};
use crate::error::RuleResult;
use crate::types::*;
use crate::unify::{instantiate, is_instance, subst1};
use itertools::Itertools;

fn terms_prompt(vars: &[&str]) -> String { format!("Terms for {}", vars.iter().join(", ")) }

pub(super) fn exists_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      let Some(i) = input else { return ask("Existential statement to introduce", InputKind::Formula) };
      let d = i.formula();
      if !is_instance(f, d, Quantifier::Exists) {
        return cx.fail(format!("line {} is not an instance of {d}", cx.number(id)))
      }
      cx.derive(d.clone(), vec![Premise::Cite(id)])
    }
    Mode::Backward(g) => {
      let (vars, _) = g.strip_quants(Quantifier::Exists);
      if vars.is_empty() {
        return cx.fail("the goal is not existential")
      }
      match (cx.at_most_one()?, input) {
        (Some((id, f)), _) if is_instance(f, g, Quantifier::Exists) =>
          cx.justify(vec![Premise::Cite(id)]),
        (Some((id, _)), _) => cx.fail(format!("line {} is not an instance of the goal", cx.number(id))),
        (None, None) => ask(terms_prompt(&vars), InputKind::Terms(vars.len())),
        (None, Some(i)) => {
          let inst = instantiate(g, Quantifier::Exists, i.terms()).expect("one term per variable");
          cx.justify(vec![Premise::Goal(inst)])
        }
      }
    }
  }
}

/// The box opened by eliminating `∃x φ` towards `goal`: a fresh constant `c`
/// and the assumption `φ(c)`.
fn witness_box(cx: &Context<'_>, ex: &Formula, goal: &Formula) -> RuleResult<Premise> {
  let Some((var, body)) = ex.as_quant(Quantifier::Exists) else {
    return cx.fail(format!("{ex} is not existential"))
  };
  let c = cx.skolem();
  let assumption = subst1(body, var, Term::Constant(c.clone()));
  Ok(Premise::Box(BoxSpec { skolem: Some(c), assumption: Some(assumption), goal: goal.clone(), adjacent: false }))
}

pub(super) fn exists_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  match (cx.mode, cx.at_most_one()?) {
    (Mode::Forward, None) => cx.wrong_count("exactly one"),
    (Mode::Forward, Some((id, ex))) => {
      if ex.as_quant(Quantifier::Exists).is_none() {
        return cx.fail(format!("line {} is not existential", cx.number(id)))
      }
      let Some(i) = input else { return ask("Conclusion to reach from the witness", InputKind::Formula) };
      let c = i.formula();
      cx.derive(c.clone(), vec![Premise::Cite(id), witness_box(cx, ex, c)?])
    }
    (Mode::Backward(g), Some((id, ex))) => {
      if ex.as_quant(Quantifier::Exists).is_none() {
        return cx.fail(format!("line {} is not existential", cx.number(id)))
      }
      cx.justify(vec![Premise::Cite(id), witness_box(cx, ex, g)?])
    }
    (Mode::Backward(g), None) => {
      let Some(i) = input else { return ask("Existential statement to use", InputKind::Formula) };
      let ex = i.formula();
      let boxed = witness_box(cx, ex, g)?;
      cx.justify(vec![Premise::Goal(ex.clone()), boxed])
    }
  }
}

/// The box for proving `∀x φ`: a fresh constant `c` and the goal `φ(c)`.
fn generic_box(cx: &Context<'_>, all: &Formula) -> RuleResult<Premise> {
  let Some((var, body)) = all.as_quant(Quantifier::ForAll) else {
    return cx.fail(format!("{all} is not universal"))
  };
  let c = cx.skolem();
  let goal = subst1(body, var, Term::Constant(c.clone()));
  Ok(Premise::Box(BoxSpec { skolem: Some(c), assumption: None, goal, adjacent: false }))
}

pub(super) fn forall_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  match cx.mode {
    Mode::Forward => {
      let Some(i) = input else { return ask("Universal statement to prove", InputKind::Formula) };
      let all = i.formula();
      cx.derive(all.clone(), vec![generic_box(cx, all)?])
    }
    Mode::Backward(g) => cx.justify(vec![generic_box(cx, g)?]),
  }
}

pub(super) fn forall_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, all) = cx.one()?;
      let (vars, _) = all.strip_quants(Quantifier::ForAll);
      if vars.is_empty() {
        return cx.fail(format!("line {} is not universal", cx.number(id)))
      }
      let Some(i) = input else { return ask(terms_prompt(&vars), InputKind::Terms(vars.len())) };
      let inst = instantiate(all, Quantifier::ForAll, i.terms()).expect("one term per variable");
      cx.derive(inst, vec![Premise::Cite(id)])
    }
    Mode::Backward(g) => match (cx.at_most_one()?, input) {
      (Some((id, all)), _) if is_instance(g, all, Quantifier::ForAll) => cx.justify(vec![Premise::Cite(id)]),
      (Some((id, _)), _) => cx.fail(format!("the goal is not an instance of line {}", cx.number(id))),
      (None, None) => ask("Universal statement to instantiate", InputKind::Formula),
      (None, Some(i)) => {
        let all = i.formula();
        if !is_instance(g, all, Quantifier::ForAll) {
          return cx.fail(format!("the goal is not an instance of {all}"))
        }
        cx.justify(vec![Premise::Goal(all.clone())])
      }
    },
  }
}
