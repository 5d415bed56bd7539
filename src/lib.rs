//! # hmi-lts: Human-Machine Interaction as Labelled Transition Systems
//!
//! **`hmi-lts`** models a machine and an operator's mental picture of that machine as
//! **Labelled Transition Systems (LTS)**, and checks whether the mental model gives the operator
//! **full control** of the machine: every command the operator believes possible is possible,
//! and every reaction of the machine is one the operator anticipates (no *automation surprise*).
//!
//! ## Key Features
//!
//! - **Generic engine**: [`Lts`][crate::lts::Lts] stores states and transitions in arenas addressed by
//!   [`StateId`][crate::reference::StateId] / [`TransitionId`][crate::reference::TransitionId] handles,
//!   with uniqueness and tau-edge invariants checked before every mutation.
//! - **Hooks**: a [`Listener`][crate::lts::Listener] observes every successful mutation.
//! - **HMI specialization**: [`HmiLts`][crate::hmi::HmiLts] labels transitions with
//!   [`Action`][crate::action::Action]s (commands, observations, tau) and maintains its alphabet.
//! - **Full-control analysis**: [`FullControlCheck`][crate::check::FullControlCheck] compares two models
//!   and explains failures with a witness trace.
//!
//! ## Basic Usage
//!
//! ```rust
//! use hmi_lts::action::Action;
//! use hmi_lts::check::FullControlCheck;
//! use hmi_lts::hmi::HmiLts;
//!
//! # fn main() -> Result<(), hmi_lts::error::LtsError> {
//! // 1. Build the system model
//! let mut system = HmiLts::new("Idle")?;
//! system.add_state("Busy")?;
//! system.add_transition(Action::command("start"), "Idle", "Busy")?;
//! system.add_transition(Action::observation("done"), "Busy", "Idle")?;
//!
//! // 2. Build the operator's mental model
//! let mut mental = HmiLts::new("Waiting")?;
//! mental.add_state("Working")?;
//! mental.add_transition(Action::command("start"), "Waiting", "Working")?;
//! mental.add_transition(Action::observation("done"), "Working", "Waiting")?;
//!
//! // 3. Check
//! let check = FullControlCheck::new(&system);
//! assert!(check.is_full_control(&mental));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Components
//!
//! - **[`lts`]**: the generic transition-system engine.
//! - **[`hmi`]**: states, transitions and alphabet of HMI models.
//! - **[`check`]**: the full-control analysis.
//!
//! All operations are synchronous and in-process. Models are built on one thread and are then
//! read-only; the analysis never mutates them.

pub mod action;
pub mod check;
pub mod error;
pub mod hmi;
pub mod label;
pub mod lts;
pub mod reference;
