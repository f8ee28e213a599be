use crate::rules::Rule;
use itertools::Itertools;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type RuleResult<T> = Result<T, RuleError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
  Relation,
  Function,
}

impl std::fmt::Display for SymbolKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SymbolKind::Relation => write!(f, "relation"),
      SymbolKind::Function => write!(f, "function"),
    }
  }
}

/// A formula or term could not be read. Recoverable: fix the text and retry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("empty formula")]
  Empty,
  #[error("unknown operator symbol '{0}'")]
  UnknownOperator(char),
  #[error("unmatched '{0}'")]
  UnmatchedBracket(char),
  #[error("'{close}' does not match '{open}'")]
  MismatchedBracket { open: char, close: char },
  #[error("incomplete formula: '{0}' is missing an operand")]
  MissingOperand(&'static str),
  #[error("missing operator between operands")]
  MissingOperator,
  #[error("quantifier '{0}' needs a bound variable")]
  MissingBoundVariable(&'static str),
  #[error("{kind} '{name}' takes {expected} argument(s), but is used with {found}")]
  ArityConflict { kind: SymbolKind, name: String, expected: usize, found: usize },
  #[error("malformed equality '{0}': expected exactly two sides")]
  MalformedEquality(String),
  #[error("invalid name '{0}'")]
  InvalidName(String),
  #[error("empty argument in '{0}'")]
  EmptyArgument(String),
}

/// A rule could not be applied to the selected lines. The proof is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
  #[error("select one empty line or goal line to work on")]
  NoTarget,
  #[error("only one empty line or goal line may be selected, {0} were")]
  ManyTargets(usize),
  #[error("line {0} introduces constants and cannot be cited")]
  CitesConstants(u32),
  #[error("line {line} does not come before line {target}")]
  CitesLaterLine { line: u32, target: u32 },
  #[error("line {line} is out of scope for line {target}: it is inside a box that does not contain line {target}")]
  OutOfScope { line: u32, target: u32 },
  #[error("{rule} needs {expected} selected line(s), but {found} were selected")]
  WrongCount { rule: Rule, expected: &'static str, found: usize },
  #[error("{rule}: {msg}")]
  Invalid { rule: Rule, msg: String },
  #[error("constant '{name}' is not available at line {target}")]
  SkolemEscape { name: String, target: u32 },
  #[error("no rule is waiting for input")]
  NoPending,
  #[error("the lines the pending rule works on are gone, apply it again")]
  StalePending,
  #[error("expected {expected}")]
  WrongInput { expected: &'static str },
  #[error("choice {0} is not one of the options")]
  BadChoice(usize),
  #[error("no proof has been started")]
  NoProof,
  #[error("there is no line {0}")]
  NoSuchLine(u32),
}

/// The formulas of a batch that failed to parse, by position in the batch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", .0.iter().map(|(i, e)| format!("formula {}: {e}", i + 1)).join("; "))]
pub struct BatchError(pub Vec<(usize, ParseError)>);

/// Any user-facing error, for entry points that can raise more than one kind.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
  #[error("parse error: {0}")]
  Parse(#[from] ParseError),
  #[error("{0}")]
  Rule(#[from] RuleError),
  #[error("{0}")]
  Batch(#[from] BatchError),
}
