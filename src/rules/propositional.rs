use super::{ask, Action, BoxSpec, Context, Input, InputKind, Mode, Premise};
use crate::error::RuleResult;
use crate::proof::ItemId;
use crate::types::*;
use crate::unify::{flatten, operands};

/// Tries both orders of exactly two cited lines, returning the first result
/// of `f` and the citations in the order `f` took them.
pub(super) fn pair<'a, T>(
  cx: &Context<'a>, f: impl Fn(&'a Formula, &'a Formula) -> Option<T>,
) -> Option<(T, Vec<Premise>)> {
  let [(i, a), (j, b)] = cx.cites[..] else { return None };
  let cite = |x: ItemId, y: ItemId| vec![Premise::Cite(x), Premise::Cite(y)];
  f(a, b).map(|t| (t, cite(i, j))).or_else(|| f(b, a).map(|t| (t, cite(j, i))))
}

/// The cited line equal to `f`, or a new sub-goal for it.
fn cited_or_goal(cx: &Context<'_>, f: &Formula) -> Premise {
  match cx.cites.iter().find(|(_, c)| *c == f) {
    Some(&(id, _)) => Premise::Cite(id),
    None => Premise::Goal(f.clone()),
  }
}

/// The premises of goal `g` built with `op`: its two sides if every cited line
/// is one of them, and otherwise all of its flattened operands.
fn split_goal(cx: &Context<'_>, op: Binop, g: &Formula, what: &str) -> RuleResult<Vec<Premise>> {
  let (lhs, rhs) = g.as_binary(op).expect("checked by caller");
  let sides = vec![lhs, rhs];
  let parts = if cx.cites.iter().all(|(_, f)| sides.contains(f)) { sides } else { flatten(op, g) };
  if let Some(&(id, _)) = cx.cites.iter().find(|(_, f)| !parts.contains(f)) {
    return cx.fail(format!("line {} is not {what} of the goal", cx.number(id)))
  }
  Ok(parts.into_iter().map(|p| cited_or_goal(cx, p)).collect())
}

pub(super) fn tick(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  let (id, f) = cx.one()?;
  match cx.mode {
    Mode::Forward => cx.derive(f.clone(), vec![Premise::Cite(id)]),
    Mode::Backward(g) if g == f => cx.justify(vec![Premise::Cite(id)]),
    Mode::Backward(_) => cx.fail(format!("line {} is not the goal", cx.number(id))),
  }
}

pub(super) fn and_intro(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      cx.count("at least two", |n| n >= 2)?;
      let conj = Formula::mk_chain(Binop::And, cx.cites.iter().map(|&(_, f)| f.clone()));
      cx.derive(conj.expect("at least two"), cx.cite_ids())
    }
    Mode::Backward(g) => {
      if g.as_binary(Binop::And).is_none() {
        return cx.fail("the goal is not a conjunction")
      }
      cx.justify(split_goal(cx, Binop::And, g, "a conjunct")?)
    }
  }
}

pub(super) fn and_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  let (id, f) = cx.one()?;
  let parts = operands(Binop::And, f);
  if parts.len() < 2 {
    return cx.fail(format!("line {} is not a conjunction", cx.number(id)))
  }
  match (cx.mode, input) {
    (Mode::Forward, None) =>
      ask("Which conjunct?", InputKind::Choice(parts.iter().map(|p| p.to_string()).collect())),
    (Mode::Forward, Some(i)) => cx.derive(parts[i.choice()].clone(), vec![Premise::Cite(id)]),
    (Mode::Backward(g), _) if parts.contains(&g) => cx.justify(vec![Premise::Cite(id)]),
    (Mode::Backward(_), _) => cx.fail(format!("the goal is not a conjunct of line {}", cx.number(id))),
  }
}

pub(super) fn or_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      let Some(i) = input else { return ask("Disjunction to introduce", InputKind::Formula) };
      let d = i.formula();
      if !operands(Binop::Or, d).contains(&f) || d.as_binary(Binop::Or).is_none() {
        return cx.fail(format!("line {} is not a disjunct of {d}", cx.number(id)))
      }
      cx.derive(d.clone(), vec![Premise::Cite(id)])
    }
    Mode::Backward(g) => {
      let parts = operands(Binop::Or, g);
      if parts.len() < 2 {
        return cx.fail("the goal is not a disjunction")
      }
      match (cx.at_most_one()?, input) {
        (Some((id, f)), _) if parts.contains(&f) => cx.justify(vec![Premise::Cite(id)]),
        (Some((id, _)), _) => cx.fail(format!("line {} is not a disjunct of the goal", cx.number(id))),
        (None, None) =>
          ask("Which disjunct?", InputKind::Choice(parts.iter().map(|p| p.to_string()).collect())),
        (None, Some(i)) => cx.justify(vec![Premise::Goal(parts[i.choice()].clone())]),
      }
    }
  }
}

/// One box per disjunct of `d`, each assuming the disjunct and aiming for `goal`.
fn case_boxes(d: &Formula, goal: &Formula) -> Vec<Premise> {
  let cases = flatten(Binop::Or, d);
  let n = cases.len();
  let boxes = cases.into_iter().enumerate().map(|(i, case)| BoxSpec {
    adjacent: i + 1 < n,
    ..BoxSpec::assume(case.clone(), goal.clone())
  });
  boxes.map(Premise::Box).collect()
}

pub(super) fn or_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  let disj = cx.at_most_one()?;
  if let Some((id, f)) = disj {
    if f.as_binary(Binop::Or).is_none() {
      return cx.fail(format!("line {} is not a disjunction", cx.number(id)))
    }
  }
  match (cx.mode, disj) {
    (Mode::Forward, None) => cx.wrong_count("exactly one"),
    (Mode::Forward, Some((id, d))) => {
      let Some(i) = input else { return ask("Conclusion of every case", InputKind::Formula) };
      let c = i.formula();
      let mut premises = vec![Premise::Cite(id)];
      premises.extend(case_boxes(d, c));
      cx.derive(c.clone(), premises)
    }
    (Mode::Backward(g), Some((id, d))) => {
      let mut premises = vec![Premise::Cite(id)];
      premises.extend(case_boxes(d, g));
      cx.justify(premises)
    }
    (Mode::Backward(g), None) => {
      let Some(i) = input else { return ask("Disjunction to split on", InputKind::Formula) };
      let d = i.formula();
      if d.as_binary(Binop::Or).is_none() {
        return cx.fail(format!("{d} is not a disjunction"))
      }
      let mut premises = vec![Premise::Goal(d.clone())];
      premises.extend(case_boxes(d, g));
      cx.justify(premises)
    }
  }
}

pub(super) fn imp_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  let imp = match cx.mode {
    Mode::Forward => match input {
      None => return ask("Implication to prove", InputKind::Formula),
      Some(i) => i.formula(),
    },
    Mode::Backward(g) => g,
  };
  let Some((a, b)) = imp.as_binary(Binop::Implies) else {
    return cx.fail(format!("{imp} is not an implication"))
  };
  let boxed = vec![Premise::Box(BoxSpec::assume(a.clone(), b.clone()))];
  match cx.mode {
    Mode::Forward => cx.derive(imp.clone(), boxed),
    Mode::Backward(_) => cx.justify(boxed),
  }
}

pub(super) fn imp_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  let modus_ponens = |imp: &Formula, ant: &Formula| {
    let (a, b) = imp.as_binary(Binop::Implies)?;
    (a == ant).then(|| b.clone())
  };
  match cx.mode {
    Mode::Forward => {
      cx.count("exactly two", |n| n == 2)?;
      match pair(cx, modus_ponens) {
        Some((b, premises)) => cx.derive(b, premises),
        None => cx.fail("need an implication and its antecedent"),
      }
    }
    Mode::Backward(g) => match *cx.cites {
      [] => {
        let Some(i) = input else { return ask("Antecedent to use", InputKind::Formula) };
        let a = i.formula();
        cx.justify(vec![Premise::Goal(Formula::mk_implies(a.clone(), g.clone())), Premise::Goal(a.clone())])
      }
      [(id, f)] => match f.as_binary(Binop::Implies) {
        Some((a, b)) if b == g => cx.justify(vec![Premise::Cite(id), Premise::Goal(a.clone())]),
        _ => cx.justify(vec![Premise::Goal(Formula::mk_implies(f.clone(), g.clone())), Premise::Cite(id)]),
      },
      [_, _] => match pair(cx, |imp, ant| modus_ponens(imp, ant).filter(|b| b == g)) {
        Some((_, premises)) => cx.justify(premises),
        None => cx.fail("the cited lines do not give the goal by modus ponens"),
      },
      _ => cx.wrong_count("at most two"),
    },
  }
}

pub(super) fn not_intro(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  let neg = match cx.mode {
    Mode::Forward => match input {
      None => return ask("Negation to prove", InputKind::Formula),
      Some(i) => i.formula(),
    },
    Mode::Backward(g) => g,
  };
  let Some(a) = neg.as_neg() else { return cx.fail(format!("{neg} is not a negation")) };
  let boxed = vec![Premise::Box(BoxSpec::assume(a.clone(), Formula::Bottom))];
  match cx.mode {
    Mode::Forward => cx.derive(neg.clone(), boxed),
    Mode::Backward(_) => cx.justify(boxed),
  }
}

pub(super) fn not_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  let contradicts = |a: &Formula, na: &Formula| (na.as_neg() == Some(a)).then_some(());
  match cx.mode {
    Mode::Forward => {
      cx.count("exactly two", |n| n == 2)?;
      match pair(cx, contradicts) {
        Some((_, premises)) => cx.derive(Formula::Bottom, premises),
        None => cx.fail("need a formula and its negation"),
      }
    }
    Mode::Backward(g) if *g != Formula::Bottom => cx.fail("the goal is not ⊥"),
    Mode::Backward(_) => match *cx.cites {
      [] => {
        let Some(i) = input else { return ask("Formula to contradict", InputKind::Formula) };
        let a = i.formula();
        cx.justify(vec![Premise::Goal(a.clone()), Premise::Goal(a.clone().mk_neg())])
      }
      [(id, f)] => match f.as_neg() {
        Some(a) => cx.justify(vec![Premise::Goal(a.clone()), Premise::Cite(id)]),
        None => cx.justify(vec![Premise::Cite(id), Premise::Goal(f.clone().mk_neg())]),
      },
      [_, _] => match pair(cx, contradicts) {
        Some((_, premises)) => cx.justify(premises),
        None => cx.fail("need a formula and its negation"),
      },
      _ => cx.wrong_count("at most two"),
    },
  }
}

pub(super) fn not_not_intro(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      cx.derive(f.clone().mk_neg().mk_neg(), vec![Premise::Cite(id)])
    }
    Mode::Backward(g) => {
      let Some(a) = g.as_neg().and_then(Formula::as_neg) else {
        return cx.fail("the goal is not a double negation")
      };
      match cx.at_most_one()? {
        Some((id, f)) if f == a => cx.justify(vec![Premise::Cite(id)]),
        Some((id, _)) => cx.fail(format!("line {} is not {a}", cx.number(id))),
        None => cx.justify(vec![Premise::Goal(a.clone())]),
      }
    }
  }
}

pub(super) fn not_not_elim(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      match f.as_neg().and_then(Formula::as_neg) {
        Some(a) => cx.derive(a.clone(), vec![Premise::Cite(id)]),
        None => cx.fail(format!("line {} is not a double negation", cx.number(id))),
      }
    }
    Mode::Backward(g) => {
      let nng = g.clone().mk_neg().mk_neg();
      match cx.at_most_one()? {
        Some((id, f)) if *f == nng => cx.justify(vec![Premise::Cite(id)]),
        Some((id, _)) => cx.fail(format!("line {} is not {nng}", cx.number(id))),
        None => cx.justify(vec![Premise::Goal(nng)]),
      }
    }
  }
}

pub(super) fn top_intro(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  match cx.mode {
    Mode::Forward => cx.derive(Formula::Top, vec![]),
    Mode::Backward(Formula::Top) => cx.justify(vec![]),
    Mode::Backward(_) => cx.fail("the goal is not ⊤"),
  }
}

pub(super) fn bot_elim(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      let (id, f) = cx.one()?;
      if *f != Formula::Bottom {
        return cx.fail(format!("line {} is not ⊥", cx.number(id)))
      }
      match input {
        None => ask("Formula to conclude", InputKind::Formula),
        Some(i) => cx.derive(i.formula().clone(), vec![Premise::Cite(id)]),
      }
    }
    Mode::Backward(_) => match cx.at_most_one()? {
      Some((id, Formula::Bottom)) => cx.justify(vec![Premise::Cite(id)]),
      Some((id, _)) => cx.fail(format!("line {} is not ⊥", cx.number(id))),
      None => cx.justify(vec![Premise::Goal(Formula::Bottom)]),
    },
  }
}

pub(super) fn iff_intro(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  match cx.mode {
    Mode::Forward => {
      cx.count("exactly two", |n| n == 2)?;
      let converse = |ab: &Formula, ba: &Formula| {
        let (a, b) = ab.as_binary(Binop::Implies)?;
        (ba.as_binary(Binop::Implies)? == (b, a)).then(|| Formula::mk_iff(a.clone(), b.clone()))
      };
      match pair(cx, converse) {
        Some((iff, premises)) => cx.derive(iff, premises),
        None => cx.fail("need an implication and its converse"),
      }
    }
    Mode::Backward(g) => {
      let Some((a, b)) = g.as_binary(Binop::Iff) else {
        return cx.fail("the goal is not a biconditional")
      };
      let parts = [Formula::mk_implies(a.clone(), b.clone()), Formula::mk_implies(b.clone(), a.clone())];
      cx.count("at most two", |n| n <= 2)?;
      if let Some(&(id, _)) = cx.cites.iter().find(|(_, f)| !parts.contains(f)) {
        return cx.fail(format!("line {} is not {} or {}", cx.number(id), parts[0], parts[1]))
      }
      cx.justify(parts.iter().map(|p| cited_or_goal(cx, p)).collect())
    }
  }
}

pub(super) fn iff_elim(cx: &Context<'_>, _: Option<&Input>) -> RuleResult<Action> {
  let other_side = |iff: &Formula, side: &Formula| {
    let (a, b) = iff.as_binary(Binop::Iff)?;
    if a == side {
      Some(b.clone())
    } else if b == side {
      Some(a.clone())
    } else {
      None
    }
  };
  match cx.mode {
    Mode::Forward => {
      cx.count("exactly two", |n| n == 2)?;
      match pair(cx, other_side) {
        Some((f, premises)) => cx.derive(f, premises),
        None => cx.fail("need a biconditional and one of its sides"),
      }
    }
    Mode::Backward(g) => match *cx.cites {
      [(id, f)] => match f.as_binary(Binop::Iff) {
        Some((a, b)) if b == g => cx.justify(vec![Premise::Cite(id), Premise::Goal(a.clone())]),
        Some((a, b)) if a == g => cx.justify(vec![Premise::Cite(id), Premise::Goal(b.clone())]),
        _ => cx.fail(format!("line {} is not a biconditional with the goal as a side", cx.number(id))),
      },
      [_, _] => match pair(cx, |iff, side| other_side(iff, side).filter(|f| f == g)) {
        Some((_, premises)) => cx.justify(premises),
        None => cx.fail("the cited lines do not give the goal"),
      },
      _ => cx.wrong_count("one or two"),
    },
  }
}

pub(super) fn lem(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  match cx.mode {
    Mode::Forward => match input {
      None => ask("Formula for the excluded middle", InputKind::Formula),
      Some(i) => {
        let a = i.formula().clone();
        cx.derive(Formula::mk_or(a.clone(), a.mk_neg()), vec![])
      }
    },
    Mode::Backward(g) => match g.as_binary(Binop::Or) {
      Some((a, na)) if na.as_neg() == Some(a) => cx.justify(vec![]),
      _ => cx.fail("the goal is not of the form φ ∨ ¬φ"),
    },
  }
}

pub(super) fn pc(cx: &Context<'_>, input: Option<&Input>) -> RuleResult<Action> {
  cx.count("no", |n| n == 0)?;
  let a = match cx.mode {
    Mode::Forward => match input {
      None => return ask("Formula to prove by contradiction", InputKind::Formula),
      Some(i) => i.formula(),
    },
    Mode::Backward(g) => g,
  };
  let boxed = vec![Premise::Box(BoxSpec::assume(a.clone().mk_neg(), Formula::Bottom))];
  match cx.mode {
    Mode::Forward => cx.derive(a.clone(), boxed),
    Mode::Backward(_) => cx.justify(boxed),
  }
}
