//! # Boxoffice Core
//!
//! Core traits for the boxoffice booking engine.
//!
//! This crate provides the fundamental abstractions for building the engine's
//! state machines using the Reducer pattern: pure transition functions that
//! mutate state in place and return side-effect descriptions for a dispatcher
//! to execute.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: Pure function `(State, Action, Environment) → Effects`
//! - **Effect**: Side-effect descriptions (values, not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use boxoffice_core::{Reducer, SmallVec, smallvec};
//! use boxoffice_core::environment::{Clock, FixedClock};
//! use chrono::{DateTime, TimeZone, Utc};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default)]
//! struct TallyState {
//!     total: u64,
//!     updated_at: Option<DateTime<Utc>>,
//! }
//!
//! #[derive(Debug)]
//! enum TallyAction {
//!     Add(u64),
//! }
//!
//! #[derive(Debug, PartialEq, Eq)]
//! enum TallyEffect {
//!     Announce(u64),
//! }
//!
//! struct TallyEnvironment {
//!     clock: Arc<dyn Clock>,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = TallyState;
//!     type Action = TallyAction;
//!     type Environment = TallyEnvironment;
//!     type Effect = TallyEffect;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TallyState,
//!         action: TallyAction,
//!         env: &TallyEnvironment,
//!     ) -> SmallVec<[TallyEffect; 4]> {
//!         match action {
//!             TallyAction::Add(n) => {
//!                 state.total += n;
//!                 state.updated_at = Some(env.clock.now());
//!                 smallvec![TallyEffect::Announce(state.total)]
//!             }
//!         }
//!     }
//! }
//!
//! let env = TallyEnvironment {
//!     clock: Arc::new(FixedClock::new(
//!         Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
//!     )),
//! };
//! let mut state = TallyState::default();
//! let effects = TallyReducer.reduce(&mut state, TallyAction::Add(2), &env);
//! assert_eq!(state.total, 2);
//! assert!(state.updated_at.is_some());
//! assert_eq!(effects[0], TallyEffect::Announce(2));
//! ```

// Re-export commonly used types so domain crates share one vocabulary.
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

pub use reducer::Reducer;

/// Reducer module - the core trait for business logic.
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They contain all business logic and are deterministic and testable. All
/// I/O lives behind the returned effect values, executed elsewhere.
pub mod reducer {
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic.
    ///
    /// # Associated Types
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Effect`: The side-effect vocabulary this reducer emits
    ///
    /// Effects are plain values describing work for a dispatcher (send a
    /// notification, issue a ticket). Keeping them as data keeps the reducer
    /// pure and the transition observable in tests.
    pub trait Reducer {
        /// The state type this reducer operates on.
        type State;

        /// The action type this reducer processes.
        type Action;

        /// The environment type with injected dependencies.
        type Environment;

        /// The side-effect description type this reducer emits.
        type Effect;

        /// Reduce an action into state changes and effects.
        ///
        /// This is a pure function that:
        /// 1. Validates the action against current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most reductions emit zero or one effect, so the inline capacity
        /// of the returned buffer avoids allocation on the hot path.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Self::Effect; 4]>;
    }
}

/// Environment module - dependency injection traits.
///
/// All external dependencies reducers need (today: time) are abstracted
/// behind traits and injected via the Environment parameter, so transitions
/// stay deterministic under test.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability.
    pub trait Clock: Send + Sync {
        /// Get the current time.
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Test clock that always returns the same instant.
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        instant: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a clock pinned to `instant`.
        #[must_use]
        pub const fn new(instant: DateTime<Utc>) -> Self {
            Self { instant }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.instant
        }
    }
}
