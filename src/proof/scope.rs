use super::{ItemId, ItemKind, Proof};
use crate::error::{RuleError, RuleResult};
use itertools::Itertools;

/// The lines a rule works on: one target (an empty line or a goal) and the
/// lines cited for it, in the order they were selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
  pub target: ItemId,
  pub cites: Vec<ItemId>,
}

impl Proof {
  /// Resolves line numbers to items. Every number must exist.
  pub fn resolve(&self, numbers: &[u32]) -> Vec<ItemId> {
    let lines = self.lines();
    numbers
      .iter()
      .unique()
      .map(|&n| {
        let found = lines.iter().copied().find(|&id| self.number(id) == Some(n));
        found.unwrap_or_else(|| panic!("no line numbered {n}"))
      })
      .collect()
  }

  /// Splits the selected lines into target and citations, and checks that
  /// every citation is visible from the target.
  pub fn select(&self, numbers: &[u32]) -> RuleResult<Selection> {
    let mut targets = vec![];
    let mut cites = vec![];
    for id in self.resolve(numbers) {
      match &self.items[id].kind {
        ItemKind::Empty { .. } => targets.push(id),
        ItemKind::Line { just, .. } if just.is_goal() => targets.push(id),
        ItemKind::Line { .. } => cites.push(id),
        ItemKind::Constants { number, .. } => return Err(RuleError::CitesConstants(*number)),
        ItemKind::Box(_) => unreachable!(),
      }
    }
    let target = match *targets {
      [] => return Err(RuleError::NoTarget),
      [t] => t,
      _ => return Err(RuleError::ManyTargets(targets.len())),
    };
    let tn = self.cite_number(target);
    for &c in &cites {
      let line = self.cite_number(c);
      if line >= tn {
        return Err(RuleError::CitesLaterLine { line, target: tn })
      }
      if !self.in_scope(c, target) {
        return Err(RuleError::OutOfScope { line, target: tn })
      }
    }
    Ok(Selection { target, cites })
  }

  /// Whether `item` lies in the chain of `target` or of one of its enclosing boxes.
  pub fn in_scope(&self, item: ItemId, target: ItemId) -> bool {
    self.ancestors(target).any(|b| self.children(b).any(|c| c == item))
  }
}
