use lynx_sat::{
    config::Config,
    context::{ClauseOk, Engine},
    reports::Report,
    structures::literal::{CLiteral, Literal},
};

/// An engine together with `count` fresh positive literals.
fn engine_with_literals(count: usize) -> (Engine, Vec<CLiteral>) {
    let mut engine = Engine::from_config(Config::default());
    let literals = (0..count).map(|_| engine.fresh_literal()).collect();
    (engine, literals)
}

/// Whether the model of `engine` satisfies `clauses`, treating unassigned
/// atoms as satisfying nothing.
fn model_satisfies(engine: &Engine, clauses: &[Vec<CLiteral>]) -> bool {
    let model = engine.model();
    clauses.iter().all(|clause| {
        clause
            .iter()
            .any(|literal| model[literal.atom() as usize] == Some(literal.polarity()))
    })
}

mod basic {
    use super::*;

    #[test]
    fn empty_formula() {
        let mut engine = Engine::from_config(Config::default());

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert!(engine.model().is_empty());
    }

    #[test]
    fn one_literal() {
        let (mut engine, literals) = engine_with_literals(1);
        let p = literals[0];

        assert_eq!(engine.add_clause(p), Ok(ClauseOk::Added));
        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert_eq!(engine.value_of(p.atom()), Some(true));
    }

    #[test]
    fn contradictory_units() {
        let (mut engine, literals) = engine_with_literals(1);
        let p = literals[0];

        assert!(engine.add_clause(p).is_ok());
        assert!(engine.add_clause(-p).is_ok());

        assert_eq!(engine.search(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn tautology_skipped() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert_eq!(engine.add_clause(vec![p, -q, -p]), Ok(ClauseOk::Skipped));
        assert_eq!(engine.add_clause(vec![p, p, q]), Ok(ClauseOk::Added));

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
    }

    #[test]
    fn empty_clause_is_an_error() {
        let mut engine = Engine::from_config(Config::default());
        assert!(engine.add_clause(Vec::<CLiteral>::new()).is_err());
    }

    #[test]
    fn unknown_atom_is_an_error() {
        let mut engine = Engine::from_config(Config::default());
        assert!(engine.add_clause(CLiteral::new(3, true)).is_err());
    }

    #[test]
    fn unit_propagates_through_binaries() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, q]).is_ok());
        assert!(engine.add_clause(-p).is_ok());

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert_eq!(engine.value_of(p.atom()), Some(false));
        assert_eq!(engine.value_of(q.atom()), Some(true));
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn all_four_binaries_unsatisfiable() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        for clause in [vec![p, q], vec![-p, q], vec![p, -q], vec![-p, -q]] {
            assert!(engine.add_clause(clause).is_ok());
        }

        assert_eq!(engine.search(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn exactly_one_of_three() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        let clauses = vec![vec![p, q, r], vec![-p, -q], vec![-q, -r], vec![-p, -r]];
        for clause in &clauses {
            assert!(engine.add_clause(clause.clone()).is_ok());
        }

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert!(model_satisfies(&engine, &clauses));

        let truths = [p, q, r]
            .iter()
            .filter(|l| engine.value_of(l.atom()) == Some(true))
            .count();
        assert_eq!(truths, 1);
    }

    #[test]
    fn chained_binaries_satisfiable() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        let clauses = vec![vec![p, q], vec![-p, r], vec![-r, -q]];
        for clause in &clauses {
            assert!(engine.add_clause(clause.clone()).is_ok());
        }

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert!(model_satisfies(&engine, &clauses));
    }

    #[test]
    fn pigeonhole_four_in_three() {
        // pigeon p sits in some hole, no two pigeons share a hole
        let mut engine = Engine::from_config(Config::default());
        let mut slot = vec![vec![CLiteral::new(0, true); 3]; 4];
        for pigeon in 0..4 {
            for hole in 0..3 {
                slot[pigeon][hole] = engine.fresh_literal();
            }
        }

        for row in &slot {
            assert!(engine.add_clause(row.clone()).is_ok());
        }
        for hole in 0..3 {
            for first in 0..4 {
                for second in (first + 1)..4 {
                    let exclusive = vec![-slot[first][hole], -slot[second][hole]];
                    assert!(engine.add_clause(exclusive).is_ok());
                }
            }
        }

        assert_eq!(engine.search(), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn long_clauses_satisfiable() {
        let (mut engine, literals) = engine_with_literals(6);
        let [a, b, c, d, e, f] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        let clauses = vec![
            vec![a, b, c, d],
            vec![-a, -b, e, f],
            vec![-c, -d, -e],
            vec![b, -f, c],
            vec![-b, d, -a, e],
        ];
        for clause in &clauses {
            assert!(engine.add_clause(clause.clone()).is_ok());
        }

        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert!(model_satisfies(&engine, &clauses));
    }

    #[test]
    fn search_twice_is_stable() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, q]).is_ok());
        assert!(engine.add_clause(vec![-q, r]).is_ok());

        assert_eq!(engine.search(), Ok(Report::Satisfiable));

        // strengthening the formula between searches takes effect
        assert!(engine.add_clause(-p).is_ok());
        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert_eq!(engine.value_of(p.atom()), Some(false));
        assert_eq!(engine.value_of(q.atom()), Some(true));
        assert_eq!(engine.value_of(r.atom()), Some(true));
    }
}
