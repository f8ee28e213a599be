//! The inference rules and the engine that applies them.
//!
//! A rule handler only inspects the proof. It either asks for more input or
//! returns a [`Step`] describing the lines, goals and boxes to add, which
//! [`apply`] then splices in. Everything that can fail happens in the
//! handler, so a rejected rule leaves the proof untouched.

use crate::error::{RuleError, RuleResult};
use crate::proof::scope::Selection;
use crate::proof::{BoxData, ItemId, ItemKind, Justification, Proof};
use crate::types::*;
use crate::Config;
use tracing::debug;

mod equality;
mod propositional;
mod quantifier;

macro_rules! mk_rules {
  ($($id:ident: $name:literal $(| $alias:literal)*,)*) => {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum Rule { $($id),* }

    impl Rule {
      pub const ALL: &'static [Rule] = &[$(Rule::$id),*];

      /// The symbol shown in justifications.
      pub fn name(self) -> &'static str {
        match self { $(Rule::$id => $name),* }
      }

      /// Spellings accepted on the command line, besides [`Rule::name`].
      pub fn aliases(self) -> &'static [&'static str] {
        match self { $(Rule::$id => &[$($alias),*]),* }
      }
    }
  };
}

mk_rules! {
  Tick: "✓" | "tick" | "reit" | "r",
  AndIntro: "∧I" | "andi" | "&i",
  AndElim: "∧E" | "ande" | "&e",
  OrIntro: "∨I" | "ori" | "|i",
  OrElim: "∨E" | "ore" | "|e",
  ImpIntro: "→I" | "impi" | "->i",
  ImpElim: "→E" | "impe" | "->e" | "mp",
  NotIntro: "¬I" | "noti" | "~i",
  NotElim: "¬E" | "note" | "~e",
  NotNotIntro: "¬¬I" | "notnoti" | "~~i",
  NotNotElim: "¬¬E" | "notnote" | "~~e",
  TopIntro: "⊤I" | "topi",
  BotElim: "⊥E" | "bote" | "efq",
  IffIntro: "↔I" | "iffi" | "<->i",
  IffElim: "↔E" | "iffe" | "<->e",
  Lem: "LEM" | "tnd",
  Pc: "PC" | "raa",
  ExistsIntro: "∃I" | "existsi" | "ei",
  ExistsElim: "∃E" | "existse" | "ee",
  ForAllIntro: "∀I" | "foralli" | "ai",
  ForAllElim: "∀E" | "foralle" | "ae",
  EqIntro: "=I" | "eqi" | "refl",
  EqElim: "=E" | "eqe" | "subst",
  EqSym: "=Sym" | "eqsym" | "sym",
}

impl std::fmt::Display for Rule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl std::str::FromStr for Rule {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.to_lowercase();
    Rule::ALL
      .iter()
      .copied()
      .find(|r| r.name().to_lowercase() == s || r.aliases().contains(&&*s))
      .ok_or_else(|| format!("unknown rule '{s}'"))
  }
}

/// What the user has to supply before a rule can finish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
  Formula,
  /// Pick one of the listed options.
  Choice(Vec<String>),
  /// Exactly this many closed terms.
  Terms(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
  pub prompt: String,
  pub kind: InputKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
  Formula(Formula),
  /// Zero-based index into the offered options.
  Choice(usize),
  Terms(Vec<Term>),
}

impl Input {
  fn formula(&self) -> &Formula {
    match self {
      Input::Formula(f) => f,
      _ => panic!("input kind checked on resume"),
    }
  }

  fn choice(&self) -> usize {
    match *self {
      Input::Choice(i) => i,
      _ => panic!("input kind checked on resume"),
    }
  }

  fn terms(&self) -> &[Term] {
    match self {
      Input::Terms(tms) => tms,
      _ => panic!("input kind checked on resume"),
    }
  }

  fn constants(&self) -> Vec<&str> {
    match self {
      Input::Formula(f) => f.constants().into_iter().collect(),
      Input::Choice(_) => vec![],
      Input::Terms(tms) => tms.iter().flat_map(Term::constants).collect(),
    }
  }

  /// Checks that the input is an answer to `req`.
  fn check(&self, req: &Request) -> RuleResult<()> {
    match (self, &req.kind) {
      (Input::Formula(_), InputKind::Formula) => Ok(()),
      (Input::Choice(i), InputKind::Choice(opts)) if *i < opts.len() => Ok(()),
      (Input::Choice(i), InputKind::Choice(_)) => Err(RuleError::BadChoice(*i)),
      (Input::Terms(tms), InputKind::Terms(n)) if tms.len() == *n => Ok(()),
      (_, InputKind::Formula) => Err(RuleError::WrongInput { expected: "a formula" }),
      (_, InputKind::Choice(_)) => Err(RuleError::WrongInput { expected: "a choice" }),
      (_, InputKind::Terms(1)) => Err(RuleError::WrongInput { expected: "one term" }),
      (_, InputKind::Terms(_)) =>
        Err(RuleError::WrongInput { expected: "one term per quantified variable" }),
    }
  }
}

/// A rule waiting for input. Plain data: the selection it was started on and
/// the request that was handed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pending {
  pub rule: Rule,
  pub selection: Selection,
  pub request: Request,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
  Done,
  NeedsInput(Pending),
}

/// A box to be created, as `[Constants] [Assumption] [Empty] [Goal]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxSpec {
  pub skolem: Option<String>,
  pub assumption: Option<Formula>,
  pub goal: Formula,
  pub adjacent: bool,
}

impl BoxSpec {
  fn assume(assumption: Formula, goal: Formula) -> Self {
    BoxSpec { skolem: None, assumption: Some(assumption), goal, adjacent: false }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Premise {
  Cite(ItemId),
  /// A new sub-goal, inserted with an empty line above it.
  Goal(Formula),
  Box(BoxSpec),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
  /// Forward: add `formula` above the target empty line.
  Derive { formula: Formula, premises: Vec<Premise> },
  /// Backward: justify the target goal.
  Justify { premises: Vec<Premise> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
  Apply(Step),
  Ask(Request),
}

fn ask(prompt: impl Into<String>, kind: InputKind) -> RuleResult<Action> {
  Ok(Action::Ask(Request { prompt: prompt.into(), kind }))
}

#[derive(Copy, Clone, Debug)]
pub enum Mode<'a> {
  /// The target is an empty line.
  Forward,
  /// The target is a goal line with this formula.
  Backward(&'a Formula),
}

/// What a handler sees of the proof.
pub struct Context<'a> {
  pub rule: Rule,
  pub proof: &'a Proof,
  pub target: ItemId,
  pub mode: Mode<'a>,
  pub cites: Vec<(ItemId, &'a Formula)>,
}

impl<'a> Context<'a> {
  fn new(proof: &'a Proof, rule: Rule, sel: &Selection) -> Self {
    let mode = match proof.line(sel.target) {
      Some((f, j)) if j.is_goal() => Mode::Backward(f),
      _ => Mode::Forward,
    };
    let cites = sel.cites.iter().map(|&c| (c, proof.formula(c).expect("cites are lines"))).collect();
    Context { rule, proof, target: sel.target, mode, cites }
  }

  fn err(&self, msg: impl Into<String>) -> RuleError {
    RuleError::Invalid { rule: self.rule, msg: msg.into() }
  }

  fn fail<T>(&self, msg: impl Into<String>) -> RuleResult<T> { Err(self.err(msg)) }

  fn number(&self, id: ItemId) -> u32 { self.proof.cite_number(id) }

  /// Requires the number of cited lines to be in `ok`.
  fn count(&self, expected: &'static str, ok: impl FnOnce(usize) -> bool) -> RuleResult<()> {
    if ok(self.cites.len()) {
      Ok(())
    } else {
      self.wrong_count(expected)
    }
  }

  fn wrong_count<T>(&self, expected: &'static str) -> RuleResult<T> {
    Err(RuleError::WrongCount { rule: self.rule, expected, found: self.cites.len() })
  }

  /// The only cited line.
  fn one(&self) -> RuleResult<(ItemId, &'a Formula)> {
    self.count("exactly one", |n| n == 1)?;
    Ok(self.cites[0])
  }

  /// At most one cited line.
  fn at_most_one(&self) -> RuleResult<Option<(ItemId, &'a Formula)>> {
    self.count("at most one", |n| n <= 1)?;
    Ok(self.cites.first().copied())
  }

  fn cite_ids(&self) -> Vec<Premise> { self.cites.iter().map(|&(id, _)| Premise::Cite(id)).collect() }

  /// The Skolem constant the next box would introduce.
  fn skolem(&self) -> String { self.proof.sig.peek_skolem() }

  fn derive(&self, formula: Formula, premises: Vec<Premise>) -> RuleResult<Action> {
    Ok(Action::Apply(Step::Derive { formula, premises }))
  }

  fn justify(&self, premises: Vec<Premise>) -> RuleResult<Action> {
    Ok(Action::Apply(Step::Justify { premises }))
  }
}

type Handler = for<'a> fn(&Context<'a>, Option<&Input>) -> RuleResult<Action>;

fn handler(rule: Rule) -> Handler {
  use {equality::*, propositional::*, quantifier::*};
  match rule {
    Rule::Tick => tick,
    Rule::AndIntro => and_intro,
    Rule::AndElim => and_elim,
    Rule::OrIntro => or_intro,
    Rule::OrElim => or_elim,
    Rule::ImpIntro => imp_intro,
    Rule::ImpElim => imp_elim,
    Rule::NotIntro => not_intro,
    Rule::NotElim => not_elim,
    Rule::NotNotIntro => not_not_intro,
    Rule::NotNotElim => not_not_elim,
    Rule::TopIntro => top_intro,
    Rule::BotElim => bot_elim,
    Rule::IffIntro => iff_intro,
    Rule::IffElim => iff_elim,
    Rule::Lem => lem,
    Rule::Pc => pc,
    Rule::ExistsIntro => exists_intro,
    Rule::ExistsElim => exists_elim,
    Rule::ForAllIntro => forall_intro,
    Rule::ForAllElim => forall_elim,
    Rule::EqIntro => eq_intro,
    Rule::EqElim => eq_elim,
    Rule::EqSym => eq_sym,
  }
}

/// Starts applying `rule` to the selected line numbers.
pub fn begin(proof: &mut Proof, cfg: &Config, rule: Rule, numbers: &[u32]) -> RuleResult<Outcome> {
  let selection = proof.select(numbers)?;
  debug!("{rule} on {numbers:?}");
  run(proof, cfg, rule, selection, None)
}

/// Continues a pending rule with the input it asked for.
pub fn resume(proof: &mut Proof, cfg: &Config, pending: &Pending, input: Input) -> RuleResult<Outcome> {
  input.check(&pending.request)?;
  let sel = &pending.selection;
  if !proof.is_linked(sel.target) || !sel.cites.iter().all(|&c| proof.is_linked(c)) {
    return Err(RuleError::StalePending)
  }
  if cfg.check_skolem_scope {
    check_skolems(proof, pending.selection.target, &input)?;
  }
  debug!("{} resumed with {input:?}", pending.rule);
  run(proof, cfg, pending.rule, pending.selection.clone(), Some(input))
}

fn run(
  proof: &mut Proof, cfg: &Config, rule: Rule, selection: Selection, input: Option<Input>,
) -> RuleResult<Outcome> {
  let action = handler(rule)(&Context::new(proof, rule, &selection), input.as_ref())?;
  match action {
    Action::Ask(request) => Ok(Outcome::NeedsInput(Pending { rule, selection, request })),
    Action::Apply(step) => {
      apply(proof, rule, selection.target, step);
      if cfg.auto_complete {
        proof.refresh();
      } else {
        proof.renumber()
      }
      Ok(Outcome::Done)
    }
  }
}

/// Rejects user-supplied constants introduced by a box that does not enclose `target`.
fn check_skolems(proof: &Proof, target: ItemId, input: &Input) -> RuleResult<()> {
  for name in input.constants() {
    if !proof.sig.is_skolem(name) {
      continue
    }
    let visible = proof.skolem_box(name).map_or(false, |b| proof.ancestors(target).any(|a| a == b));
    if !visible {
      let target = proof.cite_number(target);
      return Err(RuleError::SkolemEscape { name: name.to_owned(), target })
    }
  }
  Ok(())
}

/// Splices a validated step into the proof. Cannot fail.
pub fn apply(proof: &mut Proof, rule: Rule, target: ItemId, step: Step) {
  let orig_prev = proof.items[target].prev;
  let (premises, derived) = match step {
    Step::Derive { formula, premises } => (premises, Some(formula)),
    Step::Justify { premises } => (premises, None),
  };
  let cites = premises
    .into_iter()
    .map(|p| match p {
      Premise::Cite(id) => id,
      Premise::Goal(f) => {
        proof.prepend(target, ItemKind::empty());
        proof.prepend(target, ItemKind::line(f, Justification::Goal))
      }
      Premise::Box(spec) => build_box(proof, target, spec),
    })
    .collect();
  let just = Justification::Rule { rule, cites };
  match derived {
    Some(f) => {
      proof.prepend(target, ItemKind::line(f, just));
    }
    None => {
      proof.set_justification(target, just);
      // the empty line above the goal is redundant if the goal now follows it directly
      if let Some(e) = orig_prev.filter(|&e| proof.is_empty_line(e)) {
        let next = proof.items[e].next.expect("the target follows");
        if next == target || proof.is_empty_line(next) {
          proof.delete(e)
        }
      }
    }
  }
}

fn build_box(proof: &mut Proof, target: ItemId, spec: BoxSpec) -> ItemId {
  let mut data = BoxData { adjacent: spec.adjacent, ..BoxData::default() };
  if let Some(c) = &spec.skolem {
    let fresh = proof.sig.fresh_skolem();
    assert_eq!(&fresh, c, "skolem constant changed since validation");
    data.skolems.insert(fresh);
  }
  let b = proof.alloc(ItemKind::Box(data));
  proof.link_before(target, b);
  if let Some(c) = spec.skolem {
    proof.push_child(b, ItemKind::Constants { names: vec![c], number: 0 });
  }
  if let Some(a) = spec.assumption {
    proof.push_child(b, ItemKind::line(a, Justification::Assumption));
  }
  proof.push_child(b, ItemKind::empty());
  proof.push_child(b, ItemKind::line(spec.goal, Justification::Goal));
  b
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::parser::{parse_formula, parse_terms};
  use crate::signature::Signature;

  /// A proof started from formula text, with the rule engine at hand.
  pub(crate) struct Harness {
    pub proof: Proof,
    pub cfg: Config,
    pub pending: Option<Pending>,
  }

  impl Harness {
    pub fn new(givens: &[&str], goal: &str) -> Self {
      let mut sig = Signature::new();
      let givens = givens.iter().map(|g| parse_formula(g, &mut sig).unwrap()).collect();
      let goal = parse_formula(goal, &mut sig).unwrap();
      let mut proof = Proof::new(givens, goal, sig);
      proof.refresh();
      Harness { proof, cfg: Config::DEFAULT, pending: None }
    }

    pub fn apply(&mut self, rule: Rule, numbers: &[u32]) -> RuleResult<()> {
      let before = self.proof.clone();
      let res = begin(&mut self.proof, &self.cfg, rule, numbers);
      self.settle(before, res)
    }

    pub fn formula(&mut self, text: &str) -> RuleResult<()> {
      let f = parse_formula(text, &mut self.proof.sig).unwrap();
      self.input(Input::Formula(f))
    }

    pub fn terms(&mut self, text: &str) -> RuleResult<()> {
      let tms = parse_terms(text, &mut self.proof.sig).unwrap();
      self.input(Input::Terms(tms))
    }

    pub fn input(&mut self, input: Input) -> RuleResult<()> {
      let pending = self.pending.take().expect("a rule is waiting for input");
      let before = self.proof.clone();
      let res = resume(&mut self.proof, &self.cfg, &pending, input);
      if res.is_err() {
        self.pending = Some(pending)
      }
      self.settle(before, res)
    }

    fn settle(&mut self, before: Proof, res: RuleResult<Outcome>) -> RuleResult<()> {
      match res {
        Ok(Outcome::Done) => {}
        Ok(Outcome::NeedsInput(p)) => {
          assert_eq!(self.proof, before, "asking for input must not change the proof");
          self.pending = Some(p)
        }
        Err(e) => {
          assert_eq!(self.proof.items, before.items, "a failed rule must not change the proof");
          return Err(e)
        }
      }
      check_invariants(&self.proof);
      Ok(())
    }

    pub fn request(&self) -> &Request { &self.pending.as_ref().expect("pending").request }

    /// The proof as `number formula justification` rows, boxes shown by indentation.
    pub fn rows(&self) -> Vec<String> {
      crate::export::Snapshot::new(&self.proof, crate::format::FormatterConfig::UNICODE).lines()
    }
  }

  /// Numbers increase in pre-order and every citation is in scope and earlier.
  pub(crate) fn check_invariants(proof: &Proof) {
    let lines = proof.lines();
    for w in lines.windows(2) {
      assert!(proof.number(w[0]) < proof.number(w[1]), "numbers must increase");
    }
    for &id in &lines {
      if let Some((_, Justification::Rule { cites, .. })) = proof.line(id) {
        for &c in cites {
          assert!(proof.is_linked(c), "citation of a deleted item");
          assert!(proof.cite_number(c) < proof.cite_number(id), "citation must come first");
          assert!(proof.in_scope(c, id), "citation out of scope");
        }
      }
    }
  }

  #[test]
  fn rule_names_parse() {
    for &r in Rule::ALL {
      assert_eq!(r.name().parse::<Rule>(), Ok(r));
    }
    assert_eq!("MP".parse::<Rule>(), Ok(Rule::ImpElim));
    assert_eq!("andi".parse::<Rule>(), Ok(Rule::AndIntro));
    assert_eq!("∧i".parse::<Rule>(), Ok(Rule::AndIntro));
    assert!("frobnicate".parse::<Rule>().is_err());
  }

  #[test]
  fn wrong_input_keeps_pending() {
    let mut h = Harness::new(&["A ∧ B"], "B");
    h.apply(Rule::AndElim, &[1, 2]).unwrap();
    assert!(matches!(h.request().kind, InputKind::Choice(ref opts) if opts.len() == 2));
    assert_eq!(h.input(Input::Choice(5)), Err(RuleError::BadChoice(5)));
    assert_eq!(h.formula("B"), Err(RuleError::WrongInput { expected: "a choice" }));
    h.input(Input::Choice(1)).unwrap();
    assert!(h.proof.is_complete());
    assert_eq!(h.rows(), ["1 A ∧ B  Given", "2 B  ∧E 1"]);
  }

  #[test]
  fn resuming_after_the_target_is_gone() {
    let mut h = Harness::new(&["A"], "B");
    h.apply(Rule::Lem, &[2]).unwrap();
    let target = h.pending.as_ref().unwrap().selection.target;
    h.proof.delete(target);
    assert_eq!(h.formula("C"), Err(RuleError::StalePending));
  }

  #[test]
  fn skolem_constants_stay_in_their_box() {
    let mut h = Harness::new(&["∃x[P(x)]"], "∃y[P(y)]");
    h.apply(Rule::ExistsElim, &[1, 3]).unwrap();
    assert_eq!(h.rows(), [
      "1 ∃x[P(x)]  Given",
      "2 (empty)",
      "3 │ c0  Constants",
      "4 │ P(c0)  Ass",
      "5 │ (empty)",
      "6 │ ∃y[P(y)]  Goal",
      "7 ∃y[P(y)]  ∃E 1, 3–6",
    ]);
    // the constant may be used inside the box ...
    h.apply(Rule::ExistsIntro, &[4, 5]).unwrap();
    h.formula("∃y[P(y)]").unwrap();
    assert!(h.proof.is_complete());
    // ... but not mentioned from outside it
    let mut h = Harness::new(&["∃x[P(x)]", "∀z[Q(z)]"], "Q(a)");
    h.apply(Rule::ExistsElim, &[1, 4]).unwrap();
    h.apply(Rule::ForAllElim, &[2, 3]).unwrap();
    assert_eq!(h.terms("c0"), Err(RuleError::SkolemEscape { name: "c0".into(), target: 3 }));
    h.terms("a").unwrap();
  }
}
