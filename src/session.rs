//! One interactive proof attempt: the document, the configuration and the
//! rule (if any) that is waiting for input.

use crate::error::{BatchError, Error, RuleError, RuleResult};
use crate::export::Snapshot;
use crate::parser::{parse_batch, parse_formula, parse_terms};
use crate::proof::Proof;
use crate::rules::{self, Input, InputKind, Outcome, Pending, Request, Rule};
use crate::signature::Signature;
use crate::Config;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Session {
  pub cfg: Config,
  proof: Option<Proof>,
  pending: Option<Pending>,
}

impl Session {
  pub fn new(cfg: Config) -> Self { Session { cfg, proof: None, pending: None } }

  /// Starts a new proof of `goal` from `givens`, replacing the current one.
  /// Nothing changes unless every formula parses.
  pub fn start<'t>(
    &mut self, givens: impl IntoIterator<Item = &'t str>, goal: &'t str,
  ) -> Result<(), BatchError> {
    let mut sig = Signature::new();
    let results = parse_batch(givens.into_iter().chain([goal]), &mut sig);
    let mut formulas = vec![];
    let mut errors = vec![];
    for (i, res) in results.into_iter().enumerate() {
      match res {
        Ok(f) => formulas.push(f),
        Err(e) => errors.push((i, e)),
      }
    }
    if !errors.is_empty() {
      return Err(BatchError(errors))
    }
    let goal = formulas.pop().expect("the goal is last");
    let mut proof = Proof::new(formulas, goal, sig);
    self.finish(&mut proof);
    info!("started a proof with {} line(s)", proof.lines().len());
    self.proof = Some(proof);
    self.pending = None;
    Ok(())
  }

  pub fn proof(&self) -> Option<&Proof> { self.proof.as_ref() }

  /// The request of the rule waiting for input.
  pub fn request(&self) -> Option<&Request> { self.pending.as_ref().map(|p| &p.request) }

  fn proof_mut(&mut self) -> RuleResult<&mut Proof> { self.proof.as_mut().ok_or(RuleError::NoProof) }

  fn finish(&self, proof: &mut Proof) {
    if self.cfg.auto_complete {
      proof.refresh();
    } else {
      proof.renumber()
    }
  }

  /// Applies `rule` to the given line numbers. Any rule still waiting for
  /// input is abandoned.
  pub fn apply(&mut self, rule: Rule, numbers: &[u32]) -> RuleResult<Outcome> {
    self.pending = None;
    let cfg = self.cfg.clone();
    let proof = self.proof_mut()?;
    if let Some(&n) = numbers.iter().find(|&&n| proof.find_line(n).is_none()) {
      return Err(RuleError::NoSuchLine(n))
    }
    let out = rules::begin(proof, &cfg, rule, numbers)?;
    self.settle(out)
  }

  /// Supplies the input the pending rule asked for. On error the rule keeps
  /// waiting, so the input can be corrected.
  pub fn resume(&mut self, input: Input) -> RuleResult<Outcome> {
    let pending = self.pending.take().ok_or(RuleError::NoPending)?;
    let cfg = self.cfg.clone();
    let res = match self.proof_mut() {
      Ok(proof) => rules::resume(proof, &cfg, &pending, input),
      Err(e) => Err(e),
    };
    match res {
      Ok(out) => self.settle(out),
      Err(e) => {
        self.pending = Some(pending);
        Err(e)
      }
    }
  }

  /// Reads the pending input from text: a formula, a 1-based choice, or a
  /// comma separated list of terms. Names first seen in text that is then
  /// rejected are forgotten again.
  pub fn resume_text(&mut self, text: &str) -> Result<Outcome, Error> {
    let kind = self.request().ok_or(RuleError::NoPending)?.kind.clone();
    let proof = self.proof_mut()?;
    let snapshot = proof.sig.clone();
    let input = match kind {
      InputKind::Formula => parse_formula(text, &mut proof.sig).map(Input::Formula),
      InputKind::Terms(_) => parse_terms(text, &mut proof.sig).map(Input::Terms),
      InputKind::Choice(_) => match text.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Input::Choice(n - 1)),
        _ => return Err(RuleError::WrongInput { expected: "the number of an option" }.into()),
      },
    };
    let res = match input {
      Ok(input) => self.resume(input).map_err(Error::from),
      Err(e) => Err(e.into()),
    };
    if res.is_err() {
      if let Some(proof) = &mut self.proof {
        proof.sig = snapshot
      }
    }
    res
  }

  /// Abandons the pending rule, if any.
  pub fn cancel(&mut self) -> bool { self.pending.take().is_some() }

  /// Runs the completion pass by hand. Returns whether the proof is complete.
  /// The pass may remove the line a pending rule works on, so any pending
  /// rule is abandoned.
  pub fn check(&mut self) -> RuleResult<bool> {
    self.pending = None;
    let done = self.proof_mut()?.refresh();
    info!("proof {}", if done { "complete" } else { "incomplete" });
    Ok(done)
  }

  pub fn snapshot(&self) -> Option<Snapshot> {
    Some(Snapshot::new(self.proof.as_ref()?, self.cfg.formatter()))
  }

  fn settle(&mut self, out: Outcome) -> RuleResult<Outcome> {
    match &out {
      Outcome::Done => {
        let complete = self.proof.as_ref().map_or(false, Proof::is_complete);
        if complete {
          info!("proof complete")
        }
      }
      Outcome::NeedsInput(p) => {
        debug!("{} waiting: {}", p.rule, p.request.prompt);
        self.pending = Some(p.clone())
      }
    }
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ParseError;

  fn session(givens: &[&str], goal: &str) -> Session {
    let mut s = Session::new(Config::DEFAULT);
    s.start(givens.iter().copied(), goal).unwrap();
    s
  }

  fn rows(s: &Session) -> Vec<String> { s.snapshot().unwrap().lines() }

  #[test]
  fn start_reports_every_bad_formula() {
    let mut s = Session::new(Config::DEFAULT);
    let err = s.start(["P(a)", "P(a, b)", "A ∧"], "(B").unwrap_err();
    assert_eq!(err.0.iter().map(|(i, _)| *i).collect::<Vec<_>>(), [1, 2, 3]);
    assert!(matches!(err.0[0].1, ParseError::ArityConflict { .. }));
    assert!(s.proof().is_none());
    assert_eq!(s.apply(Rule::Tick, &[1]), Err(RuleError::NoProof));
  }

  #[test]
  fn given_goal_is_complete_on_start() {
    let s = session(&["A"], "A");
    assert!(s.proof().unwrap().is_complete());
    assert_eq!(rows(&s), ["1 A  Given", "2 A  ✓ 1"]);
  }

  #[test]
  fn text_input_round() {
    let mut s = session(&["A ∧ B"], "B ∧ A");
    assert_eq!(s.apply(Rule::AndElim, &[1, 9]), Err(RuleError::NoSuchLine(9)));
    assert!(matches!(s.apply(Rule::AndElim, &[1, 2]), Ok(Outcome::NeedsInput(_))));
    assert!(matches!(s.request().unwrap().kind, InputKind::Choice(_)));
    assert!(matches!(s.resume_text("0"), Err(Error::Rule(RuleError::WrongInput { .. }))));
    assert!(matches!(s.resume_text("3"), Err(Error::Rule(RuleError::BadChoice(2)))));
    assert_eq!(s.resume_text("2"), Ok(Outcome::Done));
    assert!(s.request().is_none());
    assert_eq!(s.resume_text("1"), Err(Error::Rule(RuleError::NoPending)));
    assert_eq!(rows(&s), ["1 A ∧ B  Given", "2 B  ∧E 1", "3 (empty)", "4 B ∧ A  Goal"]);
  }

  #[test]
  fn rejected_text_leaves_no_names_behind() {
    let mut s = session(&["A"], "A ∨ B");
    s.apply(Rule::OrIntro, &[1, 2]).unwrap();
    assert!(s.resume_text("Q(fresh").is_err());
    assert!(!s.proof().unwrap().sig.constants.contains("fresh"));
    assert!(s.request().is_some());
    assert!(s.resume_text("C ∨ R(other)").is_err());
    assert!(!s.proof().unwrap().sig.constants.contains("other"));
    s.resume_text("A ∨ B").unwrap();
    assert!(s.proof().unwrap().is_complete());
  }

  #[test]
  fn check_discards_the_pending_rule() {
    let mut s = Session::new(Config { auto_complete: false, ..Config::DEFAULT });
    s.start(["A"], "A").unwrap();
    assert!(matches!(s.apply(Rule::Lem, &[2]), Ok(Outcome::NeedsInput(_))));
    assert_eq!(s.check(), Ok(true));
    assert!(s.request().is_none());
    assert_eq!(s.resume_text("B"), Err(Error::Rule(RuleError::NoPending)));
    assert_eq!(rows(&s), ["1 A  Given", "2 A  ✓ 1"]);
  }

  #[test]
  fn a_new_rule_discards_the_pending_one() {
    let mut s = session(&["A ∧ B"], "A");
    s.apply(Rule::AndElim, &[1, 2]).unwrap();
    assert!(s.request().is_some());
    assert!(s.apply(Rule::Tick, &[1, 3]).is_err());
    assert!(s.request().is_none());
    assert_eq!(s.resume(Input::Choice(0)), Err(RuleError::NoPending));
    s.apply(Rule::AndElim, &[1, 2]).unwrap();
    assert!(s.cancel());
    assert!(!s.cancel());
  }
}
