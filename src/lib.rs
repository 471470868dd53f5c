//! Eames: project lifecycle and payment reconciliation engine.
//!
//! This crate provides the core functionality for tracking a home-renovation
//! or interior-design project through its fixed delivery stages while
//! independently reconciling payment milestones and execution tasks against
//! the same project identity.
//!
//! # Architecture
//!
//! Eames follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`project`]: Stage catalog, stage tracking, payment ledger, task board,
//!   and the project engine composition root

pub mod project;
