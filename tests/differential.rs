//! Differential testing of the engine against exhaustive enumeration.
//!
//! Small random formulas are decided both by the engine and by brute
//! force over every assignment; the verdicts must agree, and a
//! satisfiable verdict must come with a model satisfying every clause.

use lynx_sat::{
    config::Config,
    context::Engine,
    reports::Report,
    structures::literal::{CLiteral, Literal},
};

use proptest::prelude::*;

/// A clause as distinct atoms paired with polarities.
type TestClause = Vec<(u32, bool)>;

/// A strategy for formulas over `atoms` variables.
fn formula(atoms: u32) -> impl Strategy<Value = Vec<TestClause>> {
    let clause = proptest::collection::btree_set(0..atoms, 1..=3usize.min(atoms as usize))
        .prop_flat_map(|set| {
            let size = set.len();
            let members = set.into_iter().collect::<Vec<_>>();
            proptest::collection::vec(any::<bool>(), size)
                .prop_map(move |polarities| {
                    members
                        .iter()
                        .copied()
                        .zip(polarities)
                        .collect::<TestClause>()
                })
        });

    proptest::collection::vec(clause, 1..12)
}

/// Brute force satisfiability over every assignment of `atoms` variables.
fn brute_force(atoms: u32, clauses: &[TestClause]) -> bool {
    (0..(1u32 << atoms)).any(|assignment| {
        clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&(atom, polarity)| ((assignment >> atom) & 1 == 1) == polarity)
        })
    })
}

/// Whether the engine's model satisfies `clauses`, with unassigned atoms
/// satisfying nothing.
fn model_satisfies(engine: &Engine, clauses: &[TestClause]) -> bool {
    let model = engine.model();
    clauses.iter().all(|clause| {
        clause
            .iter()
            .any(|&(atom, polarity)| model[atom as usize] == Some(polarity))
    })
}

fn decide(atoms: u32, clauses: &[TestClause]) -> (Engine, Report) {
    let mut engine = Engine::from_config(Config::default());
    for _ in 0..atoms {
        engine.fresh_atom();
    }

    for clause in clauses {
        let literals = clause
            .iter()
            .map(|&(atom, polarity)| CLiteral::new(atom, polarity))
            .collect::<Vec<_>>();
        engine.add_clause(literals).unwrap();
    }

    let report = engine.search().unwrap();
    (engine, report)
}

proptest! {
    #[test]
    fn verdicts_agree_with_enumeration(clauses in formula(5)) {
        let expected = brute_force(5, &clauses);
        let (engine, report) = decide(5, &clauses);

        match expected {
            true => {
                prop_assert_eq!(report, Report::Satisfiable);
                prop_assert!(model_satisfies(&engine, &clauses));
            }
            false => prop_assert_eq!(report, Report::Unsatisfiable),
        }
    }

    #[test]
    fn wider_clauses_agree_with_enumeration(
        clauses in proptest::collection::vec(
            proptest::collection::btree_set(0..6u32, 1..=4usize).prop_flat_map(|set| {
                let size = set.len();
                let members = set.into_iter().collect::<Vec<_>>();
                proptest::collection::vec(any::<bool>(), size).prop_map(move |polarities| {
                    members.iter().copied().zip(polarities).collect::<TestClause>()
                })
            }),
            1..10,
        )
    ) {
        let expected = brute_force(6, &clauses);
        let (engine, report) = decide(6, &clauses);

        match expected {
            true => {
                prop_assert_eq!(report, Report::Satisfiable);
                prop_assert!(model_satisfies(&engine, &clauses));
            }
            false => prop_assert_eq!(report, Report::Unsatisfiable),
        }
    }

    #[test]
    fn simplified_units_hold_in_every_model(clauses in formula(4)) {
        let mut engine = Engine::from_config(Config::default());
        for _ in 0..4 {
            engine.fresh_atom();
        }
        for clause in &clauses {
            let literals = clause
                .iter()
                .map(|&(atom, polarity)| CLiteral::new(atom, polarity))
                .collect::<Vec<_>>();
            engine.add_clause(literals).unwrap();
        }

        let units = engine.simplify().unwrap();

        // conjoining the negation of a reported unit must be unsatisfiable
        for unit in units {
            let mut strengthened = clauses.clone();
            strengthened.push(vec![(unit.atom(), !unit.polarity())]);
            prop_assert!(!brute_force(4, &strengthened));
        }
    }
}
