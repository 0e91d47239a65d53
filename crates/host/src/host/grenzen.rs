//! Ressourcen-Grenzen fuer Gast-Module
//!
//! Legt fest wie viel linearen Speicher und wie viele Instruktionen ein
//! Modul verbrauchen darf.

use serde::{Deserialize, Serialize};

/// Standard-Speichergrenze: 64 MB
pub const STANDARD_MAX_SPEICHER: u64 = 64 * 1024 * 1024;

/// Grenzen die fuer jede Instanz eines Wirts gelten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenzKonfiguration {
    /// Maximale Groesse des linearen Speichers in Bytes
    pub max_speicher_bytes: u64,
    /// Fuel pro Instanziierung bzw. pro Aufruf (0 = unbegrenzt, Fuel aus)
    pub max_instruktionen: u64,
}

impl GrenzKonfiguration {
    /// Standard-Grenzen – 64 MB, keine Instruktionsgrenze
    pub fn standard() -> Self {
        Self {
            max_speicher_bytes: STANDARD_MAX_SPEICHER,
            max_instruktionen: 0,
        }
    }

    /// Ist Fuel-Zaehlung fuer die Engine noetig?
    pub fn fuel_aktiv(&self) -> bool {
        self.max_instruktionen > 0
    }
}

impl Default for GrenzKonfiguration {
    fn default() -> Self {
        Self::standard()
    }
}
