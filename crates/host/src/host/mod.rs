//! Engine-Subsystem des Wirts
//!
//! Stellt Runtime, Ressourcen-Grenzen und Import-Verknuepfung bereit.

pub mod grenzen;
pub(crate) mod linker;
pub mod runtime;
