//! Unit and behaviour tests for project lifecycle and payment
//! reconciliation.

mod payment_ledger_tests;
mod stage_tracker_tests;
