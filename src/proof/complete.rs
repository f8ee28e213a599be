use super::{ItemId, ItemKind, Justification, Proof};
use crate::rules::Rule;
use tracing::debug;

impl Proof {
  /// Assigns increasing numbers to every line in pre-order. Box lines are
  /// numbered in place, continuing the enclosing sequence.
  pub fn renumber(&mut self) {
    for (n, id) in self.lines().into_iter().enumerate() {
      let n = n as u32 + 1;
      match &mut self.items[id].kind {
        ItemKind::Line { number, .. }
        | ItemKind::Empty { number }
        | ItemKind::Constants { number, .. } => *number = n,
        ItemKind::Box(_) => unreachable!(),
      }
    }
  }

  /// Closes every goal that the line two above it already proves, then
  /// recomputes the completion flags bottom-up. Returns whether the whole
  /// proof is complete. Does not renumber.
  pub fn check_completion(&mut self) -> bool {
    let root = self.root;
    self.complete_chain(root)
  }

  /// [`Proof::check_completion`] followed by [`Proof::renumber`].
  pub fn refresh(&mut self) -> bool {
    let done = self.check_completion();
    self.renumber();
    done
  }

  fn complete_chain(&mut self, id: ItemId) -> bool {
    self.close_goals(id);
    let mut complete = true;
    for c in self.children(id).collect::<Vec<_>>() {
      if self.box_data(c).is_some() {
        complete &= self.complete_chain(c)
      } else if self.is_goal(c) {
        complete = false
      }
    }
    if complete {
      for c in self.children(id).filter(|&c| self.is_empty_line(c)).collect::<Vec<_>>() {
        self.delete(c)
      }
    }
    let data = self.box_data_mut(id);
    if complete && !data.complete {
      debug!("box {id:?} complete");
    }
    data.complete = complete;
    complete
  }

  /// Rewrites `[X] [Empty] [Goal G]` with `X = G` in the chain of `id`.
  fn close_goals(&mut self, id: ItemId) {
    let mut cur = self.box_data(id).and_then(|b| b.head);
    while let Some(x) = cur {
      cur = self.items[x].next;
      let Some((fx, jx)) = self.line(x) else { continue };
      if jx.is_goal() {
        continue
      }
      let Some(empty) = self.items[x].next.filter(|&e| self.is_empty_line(e)) else { continue };
      let Some(goal) = self.items[empty].next.filter(|&g| self.is_goal(g)) else { continue };
      if self.formula(goal) != Some(fx) {
        continue
      }
      let given = matches!(jx, Justification::Given | Justification::Assumption);
      self.delete(empty);
      if given {
        debug!("goal {goal:?} ticked from {x:?}");
        self.set_justification(goal, Justification::Rule { rule: Rule::Tick, cites: vec![x] });
        cur = self.items[goal].next
      } else {
        debug!("goal {goal:?} already derived by {x:?}");
        cur = self.items[goal].next;
        self.delete(goal);
        self.redirect(goal, x)
      }
    }
  }

  /// Replaces every citation of `from` by `to`.
  fn redirect(&mut self, from: ItemId, to: ItemId) {
    for item in &mut self.items.0 {
      if let ItemKind::Line { just: Justification::Rule { cites, .. }, .. } = &mut item.kind {
        for c in cites.iter_mut().filter(|c| **c == from) {
          *c = to
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::signature::Signature;
  use crate::types::Formula;

  fn p(s: &str) -> Formula { Formula::Prop(s.into()) }

  #[test]
  fn given_goal_is_ticked() {
    let mut proof = Proof::new(vec![p("A")], p("A"), Signature::new());
    let ids: Vec<_> = proof.children(proof.root).collect();
    assert!(proof.refresh());
    assert_eq!(proof.children(proof.root).collect::<Vec<_>>(), [ids[0], ids[2]]);
    let tick = Justification::Rule { rule: Rule::Tick, cites: vec![ids[0]] };
    assert_eq!(proof.line(ids[2]).unwrap().1, &tick);
    assert_eq!(proof.number(ids[2]), Some(2));
    super::super::tests::check_links(&proof, proof.root);
  }

  #[test]
  fn derived_goal_is_dropped_and_citations_follow() {
    // 1 A ∧ B  Given
    // 2 B      ∧E 1
    // 3 (empty)
    // 4 B      Goal
    // 5 B ∧ B  ∧I 4, 4
    let goal_f = Formula::mk_and(p("B"), p("B"));
    let mut proof = Proof::new(vec![Formula::mk_and(p("A"), p("B"))], goal_f, Signature::new());
    let ids: Vec<_> = proof.children(proof.root).collect();
    let top_goal = ids[2];
    let and_e = Justification::Rule { rule: Rule::AndElim, cites: vec![ids[0]] };
    let sub = proof.prepend(ids[1], ItemKind::line(p("B"), and_e));
    let goal = proof.prepend(top_goal, ItemKind::line(p("B"), Justification::Goal));
    let and_i = |c| Justification::Rule { rule: Rule::AndIntro, cites: vec![c, c] };
    proof.set_justification(top_goal, and_i(goal));
    proof.renumber();
    assert!(proof.refresh());
    assert_eq!(proof.children(proof.root).collect::<Vec<_>>(), [ids[0], sub, top_goal]);
    assert_eq!(proof.line(top_goal).unwrap().1, &and_i(sub));
  }

  #[test]
  fn open_goal_keeps_everything() {
    let mut proof = Proof::new(vec![p("A")], p("B"), Signature::new());
    let before = proof.clone();
    assert!(!proof.refresh());
    assert_eq!(proof, before);
  }
}
