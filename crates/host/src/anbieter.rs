//! Standard-Importe – aufruferseitige Konvention, keine Pflicht des Wirts
//!
//! Stellt die Gruppen bereit, die typische Gast-Module erwarten:
//! - `Math`: `sin`, `cos`, `tan`, `acos`
//! - `console`: `log`, `error` (landen im tracing-Log)
//! - `ext`: `twox`
//!
//! Der Wirt selbst setzt keinen dieser Namensraeume voraus. Ein Modul das nur
//! einen Teil davon importiert, bekommt den Rest einfach nicht verknuepft.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Result;
use crate::imports::{HostFunktion, ImportNamensraum, ImportTabelle};

/// Log-Target fuer Ausgaben des Gasts
pub const GAST_LOG_TARGET: &str = "wasmwirt::gast";

/// Welche Standard-Gruppen bereitgestellt werden
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnbieterKonfiguration {
    pub math: bool,
    pub console: bool,
    pub ext: bool,
}

impl Default for AnbieterKonfiguration {
    fn default() -> Self {
        Self {
            math: true,
            console: true,
            ext: true,
        }
    }
}

/// Verarbeitet einen console.log Aufruf vom Gast
pub fn gast_log(wert: f64) {
    info!(target: GAST_LOG_TARGET, wert, "[Gast] {}", wert);
}

/// Verarbeitet einen console.error Aufruf vom Gast
pub fn gast_error(wert: f64) {
    error!(target: GAST_LOG_TARGET, wert, "[Gast] {}", wert);
}

pub fn math_namensraum() -> Result<ImportNamensraum> {
    ImportNamensraum::neu()
        .mit_funktion("sin", HostFunktion::unaer(f64::sin))?
        .mit_funktion("cos", HostFunktion::unaer(f64::cos))?
        .mit_funktion("tan", HostFunktion::unaer(f64::tan))?
        .mit_funktion("acos", HostFunktion::unaer(f64::acos))
}

pub fn console_namensraum() -> Result<ImportNamensraum> {
    ImportNamensraum::neu()
        .mit_funktion("log", HostFunktion::effekt_unaer(gast_log))?
        .mit_funktion("error", HostFunktion::effekt_unaer(gast_error))
}

pub fn ext_namensraum() -> Result<ImportNamensraum> {
    ImportNamensraum::neu().mit_funktion("twox", HostFunktion::unaer(|x| 2.0 * x))
}

/// Baut die Tabelle fuer die ausgewaehlten Gruppen
pub fn importe_fuer(konfiguration: &AnbieterKonfiguration) -> Result<ImportTabelle> {
    let mut tabelle = ImportTabelle::neu();
    if konfiguration.math {
        tabelle.namensraum("Math", math_namensraum()?)?;
    }
    if konfiguration.console {
        tabelle.namensraum("console", console_namensraum()?)?;
    }
    if konfiguration.ext {
        tabelle.namensraum("ext", ext_namensraum()?)?;
    }
    Ok(tabelle)
}

/// Alle Standard-Gruppen
pub fn standard_importe() -> Result<ImportTabelle> {
    importe_fuer(&AnbieterKonfiguration::default())
}
