//! Grundlegende Typen fuer Modul-Instanzen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasmtime::{ExternType, Module};

use crate::imports::Signatur;

/// Eindeutige Instanz-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanzId(pub Uuid);

impl InstanzId {
    /// Erstellt eine neue zufaellige InstanzId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for InstanzId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanzId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instanz:{}", self.0)
    }
}

/// Art eines Exports wie vom Modul deklariert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArt {
    /// Funktion; `None` wenn sie Typen ausserhalb von f64 verwendet
    Funktion(Option<Signatur>),
    Speicher,
    Tabelle,
    Global,
    Sonstiges,
}

impl ExportArt {
    pub fn ist_funktion(&self) -> bool {
        matches!(self, Self::Funktion(_))
    }
}

impl std::fmt::Display for ExportArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportArt::Funktion(Some(sig)) => write!(f, "Funktion {}", sig),
            ExportArt::Funktion(None) => write!(f, "Funktion (nicht f64)"),
            ExportArt::Speicher => write!(f, "Speicher"),
            ExportArt::Tabelle => write!(f, "Tabelle"),
            ExportArt::Global => write!(f, "Global"),
            ExportArt::Sonstiges => write!(f, "Sonstiges"),
        }
    }
}

/// Ein Eintrag der Export-Tabelle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInfo {
    pub name: String,
    pub art: ExportArt,
}

/// Liest die Export-Tabelle in Deklarationsreihenfolge aus dem Modul
pub(crate) fn exporte_lesen(modul: &Module) -> Vec<ExportInfo> {
    modul
        .exports()
        .map(|export| {
            let art = match export.ty() {
                ExternType::Func(ty) => ExportArt::Funktion(Signatur::aus_functyp(&ty)),
                ExternType::Memory(_) => ExportArt::Speicher,
                ExternType::Table(_) => ExportArt::Tabelle,
                ExternType::Global(_) => ExportArt::Global,
                _ => ExportArt::Sonstiges,
            };
            ExportInfo {
                name: export.name().to_string(),
                art,
            }
        })
        .collect()
}

/// Oeffentliche Informationen ueber eine Instanz
#[derive(Debug, Clone)]
pub struct InstanzInfo {
    pub id: InstanzId,
    /// SHA-256 des Modul-Binaries (hex)
    pub modul_hash: String,
    pub instanziiert_am: DateTime<Utc>,
    pub exporte: Vec<ExportInfo>,
}
