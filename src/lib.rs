//! A lookahead engine for deciding the satisfiability of boolean formulas
//! written in conjunctive normal form.
//!
//! lynx_sat decides satisfiability in the tradition of the March solvers:
//! at each decision every pre-selected free variable is *probed* in both
//! polarities, the consequences of each probe are propagated and scored,
//! and the branch taken is the one which reduces the formula most.
//! There is no conflict-driven learning, no restarting, and no clause
//! database reduction --- the strength of the engine is in how much it
//! learns *before* committing to a branch, not in how it recovers after.
//!
//! Alongside deciding satisfiability the engine offers two services to an
//! enclosing solver: extracting the unit literals a lookahead pass forces
//! at the root, and extracting equivalences between literals sharing a
//! strongly connected component of the binary implication graph.
//!
//! # Orientation
//!
//! The library is designed around the core structure of an
//! [engine](crate::context).
//!
//! Engines are built with a [configuration](crate::config), issue atoms on
//! request, and accept clauses over those atoms.
//! Internally, a solve is viewed in terms of a handful of cooperating
//! structures:
//!
//! - A binary implication graph and a clause arena store the formula,
//!   examined through [watch lists](crate::db::watch) during propagation.
//! - A single stamped assignment array is shared by the search and by
//!   every nested hypothetical probe, which is the trick that makes
//!   probing hundreds of literals per decision affordable --- see
//!   [db::trail](crate::db::trail).
//! - A scoring fixpoint picks probe [candidates](crate::procedures::preselect),
//!   a component decomposition [deduplicates them](crate::procedures::scc),
//!   and the [lookahead pass](crate::procedures::lookahead) turns probes
//!   into scores, windfall binaries, autarkies, and forced units.
//!
//! Useful starting points, then, may be:
//!
//! - The high-level [search procedure](crate::procedures::search) to
//!   inspect the dynamics of a solve.
//! - The [trail module](crate::db::trail) for the truth stamp scheme the
//!   rest of the engine leans on.
//! - The [configuration](crate::config) to see which knobs exist.
//!
//! # Example
//!
//! ```rust
//! # use lynx_sat::config::Config;
//! # use lynx_sat::context::Engine;
//! # use lynx_sat::reports::Report;
//! # use lynx_sat::structures::literal::{CLiteral, Literal};
//! let mut engine = Engine::from_config(Config::default());
//!
//! let p = engine.fresh_atom();
//! let q = engine.fresh_atom();
//!
//! // p ∨ q, ¬p ∨ q, p ∨ ¬q
//! engine.add_clause(vec![CLiteral::new(p, true), CLiteral::new(q, true)]).unwrap();
//! engine.add_clause(vec![CLiteral::new(p, false), CLiteral::new(q, true)]).unwrap();
//! engine.add_clause(vec![CLiteral::new(p, true), CLiteral::new(q, false)]).unwrap();
//!
//! assert_eq!(engine.search().unwrap(), Report::Satisfiable);
//! assert_eq!(engine.value_of(p), Some(true));
//! assert_eq!(engine.value_of(q), Some(true));
//! ```
//!
//! # Logs
//!
//! Trace-level logging runs through the [log] facade, one target per
//! subsystem ([misc::log] holds the list), so a probe gone wrong can be
//! watched in isolation.
//! The crate installs no logger itself; without one, the calls compile to
//! nothing observable.

pub mod config;
pub mod context;
pub mod procedures;

pub mod structures;
pub mod types;

pub mod generic;

pub mod db;

pub mod extension;
pub mod misc;
pub mod reports;
