use lynx_sat::{
    config::Config,
    context::Engine,
    extension::{Extension, ExtensionPropagation},
    reports::Report,
    structures::literal::{CLiteral, Literal},
};

use std::{cell::RefCell, rc::Rc};

fn engine_with_literals(count: usize) -> (Engine, Vec<CLiteral>) {
    let mut engine = Engine::from_config(Config::default());
    let literals = (0..count).map(|_| engine.fresh_literal()).collect();
    (engine, literals)
}

mod simplify {
    use super::*;

    #[test]
    fn forced_unit_is_reported() {
        // p and q are interderivable and, over the four clauses, forced;
        // r and s are merely equivalent and must not appear
        let (mut engine, literals) = engine_with_literals(4);
        let [p, q, r, s] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        for clause in [
            vec![p, q],
            vec![-p, q],
            vec![p, -q],
            vec![-r, s],
            vec![r, -s],
        ] {
            assert!(engine.add_clause(clause).is_ok());
        }

        let units = engine.simplify().unwrap();

        assert!(units.contains(&q));
        assert!(units.contains(&p));
        assert!(!units.iter().any(|u| u.atom() == r.atom()));
        assert!(!units.iter().any(|u| u.atom() == s.atom()));
    }

    #[test]
    fn root_conflict_reports_unsatisfiable() {
        let (mut engine, literals) = engine_with_literals(1);
        let p = literals[0];

        assert!(engine.add_clause(p).is_ok());
        assert!(engine.add_clause(-p).is_ok());

        let units = engine.simplify().unwrap();
        assert!(units.is_empty());
        assert_eq!(engine.report(), Report::Unsatisfiable);
    }

    #[test]
    fn units_agree_with_search() {
        let (mut engine, literals) = engine_with_literals(4);
        let [p, q, r, s] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        let clauses = vec![
            vec![p, q, r],
            vec![-q, s],
            vec![-s, q],
            vec![-p, q],
            vec![p, -q],
        ];
        for clause in &clauses {
            assert!(engine.add_clause(clause.clone()).is_ok());
        }

        let units = engine.simplify().unwrap();

        // whatever was reported must hold in every model
        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        for unit in units {
            assert_eq!(engine.value_of(unit.atom()), Some(unit.polarity()));
        }
    }
}

mod scc {
    use super::*;

    #[test]
    fn mutual_implication_is_discovered() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, -q]).is_ok());
        assert!(engine.add_clause(vec![q, -p]).is_ok());

        let outcome = engine.scc().unwrap();

        assert_eq!(outcome.eliminable.len(), 1);
        let eliminated = outcome.eliminable[0];
        let root = outcome.roots[eliminated as usize];

        assert_ne!(root.atom(), eliminated);
        assert!(root.polarity(), "the equivalence is same-signed");

        let mut pair = [root.atom(), eliminated];
        pair.sort_unstable();
        assert_eq!(pair, [p.atom(), q.atom()]);
    }

    #[test]
    fn negated_equivalence_keeps_sign() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        // p and ¬q are interchangeable
        assert!(engine.add_clause(vec![p, q]).is_ok());
        assert!(engine.add_clause(vec![-p, -q]).is_ok());

        let outcome = engine.scc().unwrap();

        assert_eq!(outcome.eliminable.len(), 1);
        let eliminated = outcome.eliminable[0];
        let root = outcome.roots[eliminated as usize];

        assert_ne!(root.atom(), eliminated);
        assert!(!root.polarity(), "the equivalence flips sign");
    }

    #[test]
    fn contradictory_cycle_reports_unsatisfiable() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        // p ↔ q and p ↔ ¬q together put p and ¬p in one component
        for clause in [
            vec![p, -q],
            vec![q, -p],
            vec![p, q],
            vec![-p, -q],
        ] {
            assert!(engine.add_clause(clause).is_ok());
        }

        let outcome = engine.scc().unwrap();
        assert!(outcome.eliminable.is_empty());
        assert_eq!(engine.report(), Report::Unsatisfiable);
    }

    #[test]
    fn independent_variables_have_no_roots() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, q, r]).is_ok());

        let outcome = engine.scc().unwrap();
        assert!(outcome.eliminable.is_empty());
    }
}

mod select_lookahead {
    use super::*;

    #[test]
    fn restriction_is_respected() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, q]).is_ok());
        assert!(engine.add_clause(vec![-p, r]).is_ok());
        assert!(engine.add_clause(vec![-q, r]).is_ok());

        let chosen = engine.select_lookahead(&[], &[p.atom()]).unwrap();

        let literal = chosen.expect("a candidate was available");
        assert_eq!(literal.atom(), p.atom());
    }

    #[test]
    fn conflicting_assumptions_select_nothing() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![p, q]).is_ok());

        let chosen = engine.select_lookahead(&[p, -p], &[q.atom()]).unwrap();
        assert_eq!(chosen, None);
    }

    #[test]
    fn assumptions_are_popped() {
        let (mut engine, literals) = engine_with_literals(3);
        let [p, q, r] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        assert!(engine.add_clause(vec![-p, q]).is_ok());
        assert!(engine.add_clause(vec![q, r]).is_ok());

        let _ = engine.select_lookahead(&[p], &[r.atom()]).unwrap();

        // the assumption must not leak into a following search
        assert_eq!(engine.search(), Ok(Report::Satisfiable));
    }
}

mod resource_limits {
    use super::*;

    #[test]
    fn time_limit_reports_unknown() {
        let mut config = Config::default();
        config.time_limit.value = std::time::Duration::from_nanos(1);

        let mut engine = Engine::from_config(config);
        let p = engine.fresh_literal();
        let q = engine.fresh_literal();
        assert!(engine.add_clause(vec![p, q]).is_ok());

        assert_eq!(engine.search(), Ok(Report::Unknown));
        assert_eq!(engine.report(), Report::Unknown);
    }

    #[test]
    fn memory_ceiling_reports_unknown() {
        let mut config = Config::default();
        config.memory_limit.value = 1;

        let mut engine = Engine::from_config(config);
        let literals = (0..4).map(|_| engine.fresh_literal()).collect::<Vec<_>>();
        assert!(engine.add_clause(literals).is_ok());

        assert_eq!(engine.search(), Ok(Report::Unknown));
    }
}

mod extension {
    use super::*;

    /// An extension implying a fixed literal whenever its watch fires,
    /// recording the lookahead notifications it receives.
    struct Implier {
        implied: CLiteral,
        notifications: Rc<RefCell<Vec<bool>>>,
    }

    impl Extension for Implier {
        fn propagate(&mut self, _literal: CLiteral, _constraint: u32) -> ExtensionPropagation {
            ExtensionPropagation::Implied {
                literal: self.implied,
                keep: true,
            }
        }

        fn set_lookahead(&mut self, active: bool) {
            self.notifications.borrow_mut().push(active);
        }
    }

    /// An extension reporting a conflict whenever its watch fires.
    struct Refuter;

    impl Extension for Refuter {
        fn propagate(&mut self, _literal: CLiteral, _constraint: u32) -> ExtensionPropagation {
            ExtensionPropagation::Conflict
        }

        fn set_lookahead(&mut self, _active: bool) {}
    }

    #[test]
    fn implied_literals_are_assigned() {
        let (mut engine, literals) = engine_with_literals(2);
        let [p, q] = *literals.as_slice() else {
            panic!("insufficient literals");
        };

        let notifications = Rc::new(RefCell::new(Vec::new()));
        engine.set_extension(Box::new(Implier {
            implied: q,
            notifications: notifications.clone(),
        }));
        engine.watch_external(p, 7);

        assert!(engine.add_clause(p).is_ok());
        assert_eq!(engine.search(), Ok(Report::Satisfiable));
        assert_eq!(engine.value_of(q.atom()), Some(true));

        // entry and exit of the public operation were signalled
        assert_eq!(*notifications.borrow(), vec![true, false]);
    }

    #[test]
    fn extension_conflicts_are_native_conflicts() {
        let (mut engine, literals) = engine_with_literals(1);
        let p = literals[0];

        engine.set_extension(Box::new(Refuter));
        engine.watch_external(p, 3);

        assert!(engine.add_clause(p).is_ok());
        assert_eq!(engine.search(), Ok(Report::Unsatisfiable));
    }
}

mod proof {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl std::io::Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unsatisfiable_proof_ends_with_the_empty_clause() {
        let mut config = Config::default();
        config.drat.value = true;

        let mut engine = Engine::from_config(config);
        let p = engine.fresh_literal();
        let q = engine.fresh_literal();

        for clause in [vec![p, q], vec![-p, q], vec![p, -q], vec![-p, -q]] {
            assert!(engine.add_clause(clause).is_ok());
        }

        let sink = SharedSink::default();
        engine.transcribe_to(Box::new(sink.clone()));

        assert_eq!(engine.search(), Ok(Report::Unsatisfiable));

        let proof = String::from_utf8(sink.0.borrow().clone()).unwrap();
        assert!(!proof.is_empty());
        assert!(proof.lines().all(|line| line.ends_with('0')));
        assert_eq!(proof.lines().last(), Some("0"));
    }

    #[test]
    fn satisfiable_searches_emit_no_empty_clause() {
        let mut config = Config::default();
        config.drat.value = true;

        let mut engine = Engine::from_config(config);
        let p = engine.fresh_literal();
        let q = engine.fresh_literal();
        assert!(engine.add_clause(vec![p, q]).is_ok());

        let sink = SharedSink::default();
        engine.transcribe_to(Box::new(sink.clone()));

        assert_eq!(engine.search(), Ok(Report::Satisfiable));

        let proof = String::from_utf8(sink.0.borrow().clone()).unwrap();
        assert!(proof.lines().all(|line| line != "0"));
    }
}
