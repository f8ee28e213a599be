//! A natural deduction proof assistant for first-order logic.
//!
//! Formulas are read by [`parser`], assembled into a [`proof::Proof`] of
//! nested boxes, and extended one inference rule at a time by [`rules`].
//! [`session::Session`] ties these together for an interactive front end.

pub mod error;
pub mod export;
pub mod format;
pub mod parser;
pub mod proof;
pub mod rules;
pub mod session;
pub mod signature;
pub mod types;
pub mod unify;

pub use error::{Error, ParseError, RuleError};
pub use session::Session;

#[derive(Clone, Debug)]
pub struct Config {
  /// Print formulas with ASCII operators.
  pub ascii: bool,
  /// Close goals and drop finished empty lines after every rule.
  pub auto_complete: bool,
  /// Reject input that mentions a Skolem constant outside its box.
  pub check_skolem_scope: bool,
}

impl Config {
  pub const DEFAULT: Config = Config { ascii: false, auto_complete: true, check_skolem_scope: true };

  pub fn formatter(&self) -> format::FormatterConfig {
    if self.ascii {
      format::FormatterConfig::ASCII
    } else {
      format::FormatterConfig::UNICODE
    }
  }
}

impl Default for Config {
  fn default() -> Self { Self::DEFAULT }
}
