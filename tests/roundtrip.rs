use ndproof::format::FormatterConfig;
use ndproof::parser::parse_formula;
use ndproof::signature::Signature;
use ndproof::types::{Binop, Formula, Quantifier, Term};
use ndproof::unify::{flatten, replace_term};
use proptest::prelude::*;

fn constant() -> impl Strategy<Value = Term> {
  prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(|c| Term::Constant(c.into()))
}

fn term() -> impl Strategy<Value = Term> {
  constant().prop_recursive(2, 8, 2, |inner| {
    prop_oneof![
      inner.clone().prop_map(|t| Term::Function { name: "f".into(), args: Box::new([t]) }),
      (inner.clone(), inner).prop_map(|(s, t)| Term::Function { name: "g".into(), args: Box::new([s, t]) }),
    ]
  })
}

fn atom() -> impl Strategy<Value = Formula> {
  prop_oneof![
    prop_oneof![Just("A"), Just("B"), Just("C")].prop_map(|p| Formula::Prop(p.into())),
    Just(Formula::Top),
    Just(Formula::Bottom),
    term().prop_map(|t| Formula::Relation { name: "P".into(), args: Box::new([t]) }),
    (term(), term()).prop_map(|(s, t)| Formula::Relation { name: "R".into(), args: Box::new([s, t]) }),
    (term(), term()).prop_map(|(s, t)| Formula::mk_eq(s, t)),
  ]
}

fn binop() -> impl Strategy<Value = Binop> {
  prop_oneof![Just(Binop::And), Just(Binop::Or), Just(Binop::Implies), Just(Binop::Iff)]
}

/// Formulas whose quantifiers bind `x` or `y` in place of the constant `a`.
fn formula() -> impl Strategy<Value = Formula> {
  atom().prop_recursive(4, 32, 2, |inner| {
    prop_oneof![
      inner.clone().prop_map(Formula::mk_neg),
      (binop(), inner.clone(), inner.clone()).prop_map(|(op, l, r)| Formula::mk_binary(op, l, r)),
      (any::<bool>(), prop_oneof![Just("x"), Just("y")], inner).prop_map(|(all, var, body)| {
        let q = if all { Quantifier::ForAll } else { Quantifier::Exists };
        let (body, _) = replace_term(&body, &Term::Constant("a".into()), &Term::Variable(var.into()));
        Formula::mk_quant(q, var.into(), body)
      }),
    ]
  })
}

/// Re-associates every associative connective to the left, the only shape
/// the printer leaves unbracketed.
fn left_assoc(f: Formula) -> Formula {
  match f {
    Formula::Neg { f } => left_assoc(*f).mk_neg(),
    Formula::Quant { q, var, body } => Formula::mk_quant(q, var, left_assoc(*body)),
    Formula::Binary { op, lhs, rhs } if op.is_assoc() => {
      let whole = Formula::mk_binary(op, *lhs, *rhs);
      let parts: Vec<_> = flatten(op, &whole).into_iter().cloned().map(left_assoc).collect();
      Formula::mk_chain(op, parts).expect("at least two operands")
    }
    Formula::Binary { op, lhs, rhs } => Formula::mk_binary(op, left_assoc(*lhs), left_assoc(*rhs)),
    f => f,
  }
}

proptest! {
  #[test]
  fn printed_formulas_parse_back(f in formula(), ascii in any::<bool>()) {
    let f = left_assoc(f);
    let cfg = if ascii { FormatterConfig::ASCII } else { FormatterConfig::UNICODE };
    let text = f.pp(cfg);
    let back = parse_formula(&text, &mut Signature::new());
    prop_assert_eq!(back.as_ref(), Ok(&f), "{}", text);
  }

  #[test]
  fn alias_chains_are_left_associated(n in 2usize..8, alias in prop_oneof![Just("∧"), Just("^"), Just("&"), Just("&&")]) {
    let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
    let f = parse_formula(&names.join(&format!(" {alias} ")), &mut Signature::new()).unwrap();
    let mut depth = 0;
    let mut cur = &f;
    while let Some((lhs, rhs)) = cur.as_binary(Binop::And) {
      prop_assert!(rhs.as_binary(Binop::And).is_none());
      depth += 1;
      cur = lhs;
    }
    prop_assert_eq!(depth, n - 1);
  }
}
