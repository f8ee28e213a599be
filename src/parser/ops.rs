use enum_map::{enum_map, Enum, EnumMap};
use once_cell::sync::Lazy;
use radix_trie::Trie;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Enum)]
pub enum Operator {
  Not,
  And,
  Or,
  Implies,
  Iff,
  ForAll,
  Exists,
}

/// Every textual spelling of every operator.
const ALIASES: &[(&str, Operator)] = &[
  ("~", Operator::Not),
  ("˜", Operator::Not),
  ("¬", Operator::Not),
  ("!", Operator::Not),
  ("∧", Operator::And),
  ("^", Operator::And),
  (".", Operator::And),
  ("·", Operator::And),
  ("&", Operator::And),
  ("&&", Operator::And),
  ("∨", Operator::Or),
  ("+", Operator::Or),
  ("|", Operator::Or),
  ("||", Operator::Or),
  ("→", Operator::Implies),
  ("⇒", Operator::Implies),
  ("⊃", Operator::Implies),
  ("->", Operator::Implies),
  (">", Operator::Implies),
  ("↔", Operator::Iff),
  ("⇔", Operator::Iff),
  ("≡", Operator::Iff),
  ("<->", Operator::Iff),
  ("<>", Operator::Iff),
  ("∀", Operator::ForAll),
  ("(A)", Operator::ForAll),
  ("∃", Operator::Exists),
  ("(E)", Operator::Exists),
];

static TABLE: Lazy<Trie<String, Operator>> = Lazy::new(|| {
  let mut trie = Trie::new();
  for &(s, op) in ALIASES {
    trie.insert(s.to_owned(), op);
  }
  trie
});

/// The longest alias is three characters long.
const MAX_ALIAS_CHARS: usize = 3;

impl Operator {
  /// Lower binds tighter.
  pub fn priority(self) -> u8 {
    let table: EnumMap<Operator, u8> = enum_map! {
      Operator::Not => 1,
      Operator::And => 2,
      Operator::Or => 3,
      Operator::Implies => 4,
      Operator::Iff => 5,
      Operator::ForAll | Operator::Exists => 1,
    };
    table[self]
  }

  pub fn is_quantifier(self) -> bool { matches!(self, Operator::ForAll | Operator::Exists) }

  /// Prefix operators take their operand on the right and never pop the stack when pushed.
  pub fn is_unary(self) -> bool { matches!(self, Operator::Not) || self.is_quantifier() }

  pub fn symbol(self) -> &'static str {
    match self {
      Operator::Not => "¬",
      Operator::And => "∧",
      Operator::Or => "∨",
      Operator::Implies => "→",
      Operator::Iff => "↔",
      Operator::ForAll => "∀",
      Operator::Exists => "∃",
    }
  }
}

/// Whether `c` can begin an operator. Opening brackets are excluded even
/// though `(A)` and `(E)` begin with one, because a bracket that is not one of
/// those aliases is still a bracket.
pub fn is_operator_lead(c: char) -> bool {
  c != '(' && ALIASES.iter().any(|(s, _)| s.starts_with(c))
}

/// Longest operator alias at the start of `s`, with its length in bytes.
pub fn match_operator(s: &str) -> Option<(Operator, usize)> {
  let ends = s.char_indices().skip(1).map(|(i, _)| i).chain([s.len()]).take(MAX_ALIAS_CHARS);
  let ends: Vec<usize> = ends.collect();
  ends.into_iter().rev().find_map(|end| Some((*TABLE.get(&s[..end])?, end)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn longest_match_wins() {
    assert_eq!(match_operator("&&b"), Some((Operator::And, 2)));
    assert_eq!(match_operator("&b"), Some((Operator::And, 1)));
    assert_eq!(match_operator("<->b"), Some((Operator::Iff, 3)));
    assert_eq!(match_operator("<>b"), Some((Operator::Iff, 2)));
    assert_eq!(match_operator("->"), Some((Operator::Implies, 2)));
    assert_eq!(match_operator(">"), Some((Operator::Implies, 1)));
    assert_eq!(match_operator("||"), Some((Operator::Or, 2)));
    assert_eq!(match_operator("(A)x"), Some((Operator::ForAll, 3)));
    assert_eq!(match_operator("∃x"), Some((Operator::Exists, "∃".len())));
  }

  #[test]
  fn partial_aliases_do_not_match() {
    assert_eq!(match_operator("-a"), None);
    assert_eq!(match_operator("<-a"), None);
    assert_eq!(match_operator("(a)"), None);
    assert_eq!(match_operator("a"), None);
    assert!(is_operator_lead('-'));
    assert!(is_operator_lead('<'));
    assert!(!is_operator_lead('('));
    assert!(!is_operator_lead('='));
  }

  #[test]
  fn priorities() {
    assert!(Operator::Not.priority() < Operator::And.priority());
    assert!(Operator::And.priority() < Operator::Or.priority());
    assert!(Operator::Or.priority() < Operator::Implies.priority());
    assert!(Operator::Implies.priority() < Operator::Iff.priority());
    assert_eq!(Operator::ForAll.priority(), Operator::Not.priority());
  }
}
