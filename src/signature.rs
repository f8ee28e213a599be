use crate::error::{ParseError, ParseResult, SymbolKind};
use im::{OrdMap, OrdSet};
use tracing::trace;

/// Everything the parser and the quantifier rules have learned about names.
///
/// The collections are persistent, so [`Signature::clone`] is O(1) and doubles
/// as the snapshot taken before each independent parse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
  pub constants: OrdSet<String>,
  pub relations: OrdMap<String, usize>,
  pub functions: OrdMap<String, usize>,
  pub skolems: OrdSet<String>,
  pub skolem_next: u32,
}

impl Signature {
  pub fn new() -> Self { Self::default() }

  pub fn add_constant(&mut self, name: &str) {
    if !self.constants.contains(name) {
      trace!("new constant {name}");
      self.constants.insert(name.to_owned());
    }
  }

  pub fn arity(&self, kind: SymbolKind, name: &str) -> Option<usize> {
    match kind {
      SymbolKind::Relation => self.relations.get(name).copied(),
      SymbolKind::Function => self.functions.get(name).copied(),
    }
  }

  /// Records the arity of `name` on first use; later uses must agree with it.
  pub fn record_arity(&mut self, kind: SymbolKind, name: &str, found: usize) -> ParseResult<()> {
    if let Some(expected) = self.arity(kind, name) {
      if expected != found {
        return Err(ParseError::ArityConflict { kind, name: name.to_owned(), expected, found })
      }
      return Ok(())
    }
    trace!("{kind} {name}/{found}");
    let map = match kind {
      SymbolKind::Relation => &mut self.relations,
      SymbolKind::Function => &mut self.functions,
    };
    map.insert(name.to_owned(), found);
    Ok(())
  }

  /// The name [`Signature::fresh_skolem`] would return, without reserving it.
  pub fn peek_skolem(&self) -> String {
    let mut n = self.skolem_next;
    loop {
      let name = format!("c{n}");
      if !self.constants.contains(&name) {
        return name
      }
      n += 1;
    }
  }

  /// Reserves a constant that has never been used before.
  pub fn fresh_skolem(&mut self) -> String {
    let name = self.peek_skolem();
    self.skolem_next = name[1..].parse::<u32>().map_or(self.skolem_next, |n| n + 1);
    self.constants.insert(name.clone());
    self.skolems.insert(name.clone());
    name
  }

  pub fn is_skolem(&self, name: &str) -> bool { self.skolems.contains(name) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn arity_is_fixed_on_first_use() {
    let mut sig = Signature::new();
    sig.record_arity(SymbolKind::Relation, "P", 2).unwrap();
    sig.record_arity(SymbolKind::Relation, "P", 2).unwrap();
    let err = sig.record_arity(SymbolKind::Relation, "P", 1).unwrap_err();
    assert_eq!(
      err,
      ParseError::ArityConflict {
        kind: SymbolKind::Relation,
        name: "P".into(),
        expected: 2,
        found: 1
      }
    );
    // relations and functions are separate namespaces
    sig.record_arity(SymbolKind::Function, "P", 1).unwrap();
  }

  #[test]
  fn skolems_avoid_existing_constants() {
    let mut sig = Signature::new();
    sig.add_constant("c0");
    sig.add_constant("c2");
    assert_eq!(sig.peek_skolem(), "c1");
    assert_eq!(sig.fresh_skolem(), "c1");
    assert_eq!(sig.fresh_skolem(), "c3");
    assert_eq!(sig.skolem_next, 4);
    assert!(sig.is_skolem("c3"));
    assert!(!sig.is_skolem("c2"));
  }

  #[test]
  fn snapshot_restores_everything() {
    let mut sig = Signature::new();
    sig.add_constant("a");
    let snap = sig.clone();
    sig.add_constant("b");
    sig.record_arity(SymbolKind::Function, "f", 1).unwrap();
    sig.fresh_skolem();
    assert_ne!(sig, snap);
    sig = snap.clone();
    assert_eq!(sig, snap);
    assert!(!sig.constants.contains("b"));
  }
}
