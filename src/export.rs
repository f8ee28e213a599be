//! A read-only, serializable view of a proof, for printing and for `--json`.

use crate::format::FormatterConfig;
use crate::proof::{ItemId, ItemKind, Justification, Proof};
use itertools::Itertools;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub complete: bool,
  pub items: Vec<Row>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Row {
  Line {
    number: u32,
    formula: String,
    justification: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    goal: bool,
  },
  Empty {
    number: u32,
  },
  Constants {
    number: u32,
    names: Vec<String>,
  },
  Box {
    complete: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    adjacent: bool,
    items: Vec<Row>,
  },
}

struct Exporter<'a> {
  proof: &'a Proof,
  cfg: FormatterConfig,
}

impl Exporter<'_> {
  fn cite(&self, id: ItemId) -> String {
    match self.proof.items[id].kind {
      ItemKind::Box(_) => {
        let (lo, hi) = self.proof.box_range(id);
        format!("{lo}–{hi}")
      }
      _ => self.proof.cite_number(id).to_string(),
    }
  }

  fn justification(&self, just: &Justification) -> String {
    match just {
      Justification::Given => "Given".into(),
      Justification::Assumption => "Ass".into(),
      Justification::Goal => "Goal".into(),
      Justification::Rule { rule, cites } if cites.is_empty() => rule.to_string(),
      Justification::Rule { rule, cites } =>
        format!("{rule} {}", cites.iter().map(|&c| self.cite(c)).join(", ")),
    }
  }

  fn chain(&self, b: ItemId) -> Vec<Row> {
    let proof = self.proof;
    proof
      .children(b)
      .map(|id| match &proof.items[id].kind {
        ItemKind::Line { formula, just, number } => Row::Line {
          number: *number,
          formula: formula.pp(self.cfg),
          justification: self.justification(just),
          goal: just.is_goal(),
        },
        ItemKind::Empty { number } => Row::Empty { number: *number },
        ItemKind::Constants { names, number } => Row::Constants { number: *number, names: names.clone() },
        ItemKind::Box(data) =>
          Row::Box { complete: data.complete, adjacent: data.adjacent, items: self.chain(id) },
      })
      .collect()
  }
}

impl Snapshot {
  pub fn new(proof: &Proof, cfg: FormatterConfig) -> Self {
    let items = Exporter { proof, cfg }.chain(proof.root);
    Snapshot { complete: proof.is_complete(), items }
  }

  pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }

  /// One string per line, in the form `number formula  justification`, with a
  /// `│ ` bar for each enclosing box.
  pub fn lines(&self) -> Vec<String> {
    fn go(rows: &[Row], depth: usize, out: &mut Vec<String>) {
      let bars = "│ ".repeat(depth);
      for row in rows {
        match row {
          Row::Line { number, formula, justification, .. } =>
            out.push(format!("{number} {bars}{formula}  {justification}")),
          Row::Empty { number } => out.push(format!("{number} {bars}(empty)")),
          Row::Constants { number, names } =>
            out.push(format!("{number} {bars}{}  Constants", names.join(", "))),
          Row::Box { items, .. } => go(items, depth + 1, out),
        }
      }
    }
    let mut out = vec![];
    go(&self.items, 0, &mut out);
    out
  }
}

impl fmt::Display for Snapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for line in self.lines() {
      writeln!(f, "{line}")?
    }
    if self.complete {
      writeln!(f, "Proof complete.")?
    }
    Ok(())
  }
}
