//! The proof document: an arena of items linked into chains.
//!
//! Every item lives in [`Proof::items`] forever; linking and unlinking only
//! rewrites the `parent`/`prev`/`next` fields, so an [`ItemId`] stays valid
//! (though possibly orphaned) for the lifetime of the proof.

use crate::mk_id;
use crate::rules::Rule;
use crate::signature::Signature;
use crate::types::*;
use std::collections::BTreeSet;

pub mod complete;
pub mod scope;

mk_id! { ItemId, }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Justification {
  Given,
  Assumption,
  Goal,
  /// Cited items are lines or boxes.
  Rule { rule: Rule, cites: Vec<ItemId> },
}

impl Justification {
  pub fn is_goal(&self) -> bool { matches!(self, Justification::Goal) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoxData {
  pub head: Option<ItemId>,
  pub complete: bool,
  /// Render flush against the next sibling box. No effect on scope or completion.
  pub adjacent: bool,
  /// Skolem constants introduced by this box.
  pub skolems: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemKind {
  Line { formula: Formula, just: Justification, number: u32 },
  Empty { number: u32 },
  Constants { names: Vec<String>, number: u32 },
  Box(BoxData),
}

impl ItemKind {
  pub fn line(formula: Formula, just: Justification) -> Self {
    ItemKind::Line { formula, just, number: 0 }
  }
  pub fn empty() -> Self { ItemKind::Empty { number: 0 } }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
  pub parent: Option<ItemId>,
  pub prev: Option<ItemId>,
  pub next: Option<ItemId>,
  pub kind: ItemKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
  pub items: IdxVec<ItemId, Item>,
  pub root: ItemId,
  pub sig: Signature,
}

impl Proof {
  /// `[Given…] [Empty] [Goal]`, numbered but not yet checked for completion.
  pub fn new(givens: Vec<Formula>, goal: Formula, sig: Signature) -> Self {
    let mut items = IdxVec::default();
    let root =
      items.push(Item { parent: None, prev: None, next: None, kind: ItemKind::Box(BoxData::default()) });
    let mut proof = Proof { items, root, sig };
    for f in givens {
      proof.push_child(root, ItemKind::line(f, Justification::Given));
    }
    proof.push_child(root, ItemKind::empty());
    proof.push_child(root, ItemKind::line(goal, Justification::Goal));
    proof.renumber();
    proof
  }

  /// Allocates a detached item.
  pub fn alloc(&mut self, kind: ItemKind) -> ItemId {
    self.items.push(Item { parent: None, prev: None, next: None, kind })
  }

  fn box_data_mut(&mut self, id: ItemId) -> &mut BoxData {
    match &mut self.items[id].kind {
      ItemKind::Box(data) => data,
      k => panic!("{id:?} is not a box: {k:?}"),
    }
  }

  pub fn box_data(&self, id: ItemId) -> Option<&BoxData> {
    match &self.items[id].kind {
      ItemKind::Box(data) => Some(data),
      _ => None,
    }
  }

  /// Links the detached item `id` into the chain just before `at`.
  pub fn link_before(&mut self, at: ItemId, id: ItemId) {
    assert!(self.items[id].parent.is_none(), "{id:?} is already linked");
    let parent = self.items[at].parent.expect("cannot link beside the root");
    let prev = self.items[at].prev;
    let item = &mut self.items[id];
    (item.parent, item.prev, item.next) = (Some(parent), prev, Some(at));
    self.items[at].prev = Some(id);
    match prev {
      Some(p) => self.items[p].next = Some(id),
      None => self.box_data_mut(parent).head = Some(id),
    }
  }

  /// Links the detached item `id` into the chain just after `at`.
  pub fn link_after(&mut self, at: ItemId, id: ItemId) {
    assert!(self.items[id].parent.is_none(), "{id:?} is already linked");
    let parent = self.items[at].parent.expect("cannot link beside the root");
    let next = self.items[at].next;
    let item = &mut self.items[id];
    (item.parent, item.prev, item.next) = (Some(parent), Some(at), next);
    self.items[at].next = Some(id);
    if let Some(n) = next {
      self.items[n].prev = Some(id)
    }
  }

  pub fn prepend(&mut self, at: ItemId, kind: ItemKind) -> ItemId {
    let id = self.alloc(kind);
    self.link_before(at, id);
    id
  }

  pub fn append(&mut self, at: ItemId, kind: ItemKind) -> ItemId {
    let id = self.alloc(kind);
    self.link_after(at, id);
    id
  }

  /// Adds a new item at the end of the chain of box `parent`.
  pub fn push_child(&mut self, parent: ItemId, kind: ItemKind) -> ItemId {
    match self.last_child(parent) {
      Some(last) => self.append(last, kind),
      None => {
        let id = self.alloc(kind);
        self.items[id].parent = Some(parent);
        self.box_data_mut(parent).head = Some(id);
        id
      }
    }
  }

  /// Unlinks `id` from its chain. The arena slot is orphaned, not reused.
  pub fn delete(&mut self, id: ItemId) {
    let Item { parent, prev, next, .. } = self.items[id];
    let parent = parent.expect("deleting an unlinked item");
    match prev {
      Some(p) => self.items[p].next = next,
      None => self.box_data_mut(parent).head = next,
    }
    if let Some(n) = next {
      self.items[n].prev = prev
    }
    let item = &mut self.items[id];
    (item.parent, item.prev, item.next) = (None, None, None)
  }

  /// The chain of box `id`, in order.
  pub fn children(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
    let head = self.box_data(id).and_then(|b| b.head);
    std::iter::successors(head, |&c| self.items[c].next)
  }

  pub fn last_child(&self, id: ItemId) -> Option<ItemId> { self.children(id).last() }

  /// The boxes enclosing `id`, innermost first, ending with the root.
  pub fn ancestors(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
    std::iter::successors(self.items[id].parent, |&b| self.items[b].parent)
  }

  pub fn is_linked(&self, id: ItemId) -> bool { id == self.root || self.items[id].parent.is_some() }

  /// All numbered items under `id` in pre-order, descending into boxes.
  pub fn lines_under(&self, id: ItemId) -> Vec<ItemId> {
    fn go(p: &Proof, id: ItemId, out: &mut Vec<ItemId>) {
      for c in p.children(id) {
        match p.items[c].kind {
          ItemKind::Box(_) => go(p, c, out),
          _ => out.push(c),
        }
      }
    }
    let mut out = vec![];
    go(self, id, &mut out);
    out
  }

  pub fn lines(&self) -> Vec<ItemId> { self.lines_under(self.root) }

  /// The boxes under `id` (excluding `id` itself) in pre-order.
  pub fn boxes_under(&self, id: ItemId) -> Vec<ItemId> {
    let mut out = vec![];
    let mut stack = vec![id];
    while let Some(b) = stack.pop() {
      let mut kids: Vec<_> = self.children(b).filter(|&c| self.box_data(c).is_some()).collect();
      out.extend(kids.iter().copied());
      kids.reverse();
      stack.extend(kids);
    }
    out
  }

  /// The number of a line; `None` for boxes.
  pub fn number(&self, id: ItemId) -> Option<u32> {
    match self.items[id].kind {
      ItemKind::Line { number, .. }
      | ItemKind::Empty { number }
      | ItemKind::Constants { number, .. } => Some(number),
      ItemKind::Box(_) => None,
    }
  }

  /// First and last line numbers of a box.
  pub fn box_range(&self, id: ItemId) -> (u32, u32) {
    let lines = self.lines_under(id);
    let (Some(&first), Some(&last)) = (lines.first(), lines.last()) else {
      panic!("box {id:?} has no lines")
    };
    (self.number(first).expect("line"), self.number(last).expect("line"))
  }

  /// The number a citation of `id` is ordered by: a box counts as its last line.
  pub fn cite_number(&self, id: ItemId) -> u32 {
    self.number(id).unwrap_or_else(|| self.box_range(id).1)
  }

  pub fn line(&self, id: ItemId) -> Option<(&Formula, &Justification)> {
    match &self.items[id].kind {
      ItemKind::Line { formula, just, .. } => Some((formula, just)),
      _ => None,
    }
  }

  pub fn formula(&self, id: ItemId) -> Option<&Formula> { self.line(id).map(|(f, _)| f) }

  pub fn is_goal(&self, id: ItemId) -> bool { self.line(id).map_or(false, |(_, j)| j.is_goal()) }

  pub fn is_empty_line(&self, id: ItemId) -> bool {
    matches!(self.items[id].kind, ItemKind::Empty { .. })
  }

  pub fn set_justification(&mut self, id: ItemId, new: Justification) {
    match &mut self.items[id].kind {
      ItemKind::Line { just, .. } => *just = new,
      k => panic!("{id:?} is not a line: {k:?}"),
    }
  }

  /// The linked line carrying `number`, if any.
  pub fn find_line(&self, number: u32) -> Option<ItemId> {
    self.lines().into_iter().find(|&id| self.number(id) == Some(number))
  }

  /// The box that introduced the Skolem constant `name`.
  pub fn skolem_box(&self, name: &str) -> Option<ItemId> {
    let introduces = |b: ItemId| self.box_data(b).map_or(false, |d| d.skolems.contains(name));
    self.boxes_under(self.root).into_iter().find(|&b| introduces(b))
  }

  pub fn is_complete(&self) -> bool { self.box_data(self.root).map_or(false, |b| b.complete) }
}
