//! Fehlertypen fuer den Modul-Wirt
//!
//! Jede Fehlerklasse ist fuer den Aufrufer unterscheidbar. Der Wirt
//! wiederholt nichts automatisch und faellt nie still auf Standardwerte zurueck.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phase in der ein Gast-Trap aufgetreten ist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapPhase {
    /// Start-Funktion waehrend der Instanziierung
    Initialisierung,
    /// Aufruf eines Exports
    Ausfuehrung,
}

impl fmt::Display for TrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrapPhase::Initialisierung => write!(f, "Initialisierung"),
            TrapPhase::Ausfuehrung => write!(f, "Ausfuehrung"),
        }
    }
}

/// Fehler beim Verknuepfen der Modul-Imports mit der Import-Tabelle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerknuepfungsFehler {
    #[error("Import fehlt: {namensraum}.{name}")]
    ImportFehlt { namensraum: String, name: String },

    #[error(
        "Import-Signatur inkompatibel: {namensraum}.{name} erwartet {erwartet}, bereitgestellt {bereitgestellt}"
    )]
    SignaturInkompatibel {
        namensraum: String,
        name: String,
        erwartet: String,
        bereitgestellt: String,
    },

    #[error("Nicht unterstuetzte Import-Art fuer {namensraum}.{name}: {art}")]
    NichtUnterstuetzteArt {
        namensraum: String,
        name: String,
        art: String,
    },
}

/// Alle moeglichen Fehler im Modul-Wirt
#[derive(Debug, Error)]
pub enum WirtError {
    // --- Byte-Quelle ---
    #[error("Byte-Quelle nicht verfuegbar ({quelle}): {grund}")]
    QuelleNichtVerfuegbar { quelle: String, grund: String },

    // --- Modul ---
    #[error("Ungueltiges WASM-Modul: {0}")]
    ModulUngueltig(String),

    #[error("Verknuepfungsfehler: {0}")]
    Verknuepfung(#[from] VerknuepfungsFehler),

    #[error("Instanziierung fehlgeschlagen: {0}")]
    Instanziierung(String),

    // --- Aufruf ---
    #[error("Export nicht gefunden: {0}")]
    ExportNichtGefunden(String),

    #[error("Signatur passt nicht zu Export '{export}': {grund}")]
    SignaturFehler { export: String, grund: String },

    #[error("WASM Trap waehrend {phase}: {ursache}")]
    Trap {
        phase: TrapPhase,
        code: Option<wasmtime::Trap>,
        ursache: String,
    },

    // --- Import-Tabelle ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl WirtError {
    /// Gibt true zurueck wenn ein erneuter Versuch sinnvoll sein koennte.
    ///
    /// Nur die Byte-Beschaffung ist wiederholbar; ein ungueltiges Modul bleibt
    /// ungueltig, und Verknuepfungsfehler brauchen eine korrigierte Tabelle.
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::QuelleNichtVerfuegbar { .. })
    }

    /// Nach einem Trap waehrend der Ausfuehrung ist der Gast-Zustand unbestimmt
    pub fn instanz_verwerfen_empfohlen(&self) -> bool {
        matches!(
            self,
            Self::Trap {
                phase: TrapPhase::Ausfuehrung,
                ..
            }
        )
    }

    /// Trap-Code falls der Fehler ein Gast-Trap ist
    pub fn trap_code(&self) -> Option<wasmtime::Trap> {
        match self {
            Self::Trap { code, .. } => *code,
            _ => None,
        }
    }

    /// Ordnet einen wasmtime-Fehler aus einem Gast-Lauf ein
    pub(crate) fn aus_gast_lauf(fehler: wasmtime::Error, phase: TrapPhase) -> Self {
        let code = fehler.downcast_ref::<wasmtime::Trap>().copied();
        Self::Trap {
            phase,
            code,
            ursache: format!("{:#}", fehler),
        }
    }
}

/// Result-Alias fuer den Modul-Wirt
pub type Result<T> = std::result::Result<T, WirtError>;
