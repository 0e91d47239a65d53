//! Import-Tabelle – Host-Funktionen gruppiert nach Namensraum
//!
//! Die Tabelle ist eine zweistufige Zuordnung (Namensraum, Funktionsname)
//! -> [`HostFunktion`]. Namen werden beim Aufbau einmal validiert; der Wirt
//! prueft danach nur noch, ob jeder Modul-Import vorhanden und passend ist.
//! Eintraege die ein Modul nicht importiert, werden ignoriert.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use wasmtime::{FuncType, ValType};

use crate::error::{Result, WirtError};

/// Host-Funktion mit Zahl-Rueckgabe
pub type WertFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// Host-Funktion ohne Rueckgabe (Seiteneffekt)
pub type EffektFn = dyn Fn(&[f64]) + Send + Sync;

/// Signatur im Zahlenbereich des Wirts: n f64-Parameter, 0..n f64-Ergebnisse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signatur {
    pub parameter: usize,
    pub ergebnisse: usize,
}

impl Signatur {
    pub fn neu(parameter: usize, ergebnisse: usize) -> Self {
        Self {
            parameter,
            ergebnisse,
        }
    }

    /// Leitet die Signatur aus einem wasmtime-Funktionstyp ab.
    ///
    /// Gibt `None` zurueck wenn ein Parameter oder Ergebnis kein f64 ist.
    pub fn aus_functyp(ty: &FuncType) -> Option<Self> {
        let ist_f64 = |t: ValType| matches!(t, ValType::F64);
        if !ty.params().all(ist_f64) || !ty.results().all(ist_f64) {
            return None;
        }
        Some(Self::neu(ty.params().len(), ty.results().len()))
    }
}

impl fmt::Display for Signatur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let liste = |n: usize| vec!["f64"; n].join(", ");
        write!(
            f,
            "({}) -> ({})",
            liste(self.parameter),
            liste(self.ergebnisse)
        )
    }
}

/// Beschreibt einen wasmtime-Funktionstyp lesbar (auch ausserhalb von f64)
pub(crate) fn functyp_beschreiben(ty: &FuncType) -> String {
    let liste = |typen: Vec<String>| typen.join(", ");
    format!(
        "({}) -> ({})",
        liste(ty.params().map(|t| t.to_string()).collect()),
        liste(ty.results().map(|t| t.to_string()).collect())
    )
}

/// Eine vom Wirt bereitgestellte Funktion
#[derive(Clone)]
pub enum HostFunktion {
    /// Zahl rein, Zahl raus
    Wert { stelligkeit: usize, f: Arc<WertFn> },
    /// Zahl rein, kein Ergebnis (z.B. Logging)
    Effekt { stelligkeit: usize, f: Arc<EffektFn> },
}

impl HostFunktion {
    pub fn wert(stelligkeit: usize, f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::Wert {
            stelligkeit,
            f: Arc::new(f),
        }
    }

    pub fn unaer(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::wert(1, move |args| f(args[0]))
    }

    pub fn binaer(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::wert(2, move |args| f(args[0], args[1]))
    }

    pub fn effekt(stelligkeit: usize, f: impl Fn(&[f64]) + Send + Sync + 'static) -> Self {
        Self::Effekt {
            stelligkeit,
            f: Arc::new(f),
        }
    }

    pub fn effekt_unaer(f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        Self::effekt(1, move |args| f(args[0]))
    }

    /// Signatur dieser Funktion im f64-Zahlenbereich
    pub fn signatur(&self) -> Signatur {
        match self {
            Self::Wert { stelligkeit, .. } => Signatur::neu(*stelligkeit, 1),
            Self::Effekt { stelligkeit, .. } => Signatur::neu(*stelligkeit, 0),
        }
    }

    pub fn stelligkeit(&self) -> usize {
        match self {
            Self::Wert { stelligkeit, .. } | Self::Effekt { stelligkeit, .. } => *stelligkeit,
        }
    }

    /// Fuehrt die Funktion aus. `args` muss genau `stelligkeit` Elemente haben.
    pub fn aufrufen(&self, args: &[f64]) -> Result<Option<f64>> {
        if args.len() != self.stelligkeit() {
            return Err(WirtError::SignaturFehler {
                export: "Host-Funktion".into(),
                grund: format!(
                    "erwartet {} Argument(e), erhalten {}",
                    self.stelligkeit(),
                    args.len()
                ),
            });
        }
        Ok(match self {
            Self::Wert { f, .. } => Some(f(args)),
            Self::Effekt { f, .. } => {
                f(args);
                None
            }
        })
    }
}

impl fmt::Debug for HostFunktion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunktion")
            .field("signatur", &self.signatur().to_string())
            .finish_non_exhaustive()
    }
}

/// Benannte Gruppe von Host-Funktionen (z.B. "Math", "console", "ext")
#[derive(Debug, Clone, Default)]
pub struct ImportNamensraum {
    funktionen: BTreeMap<String, HostFunktion>,
}

impl ImportNamensraum {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt eine Funktion hinzu. Leere oder doppelte Namen sind Fehler.
    pub fn funktion(&mut self, name: impl Into<String>, f: HostFunktion) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(WirtError::Konfiguration("Leerer Funktionsname".into()));
        }
        if self.funktionen.contains_key(&name) {
            return Err(WirtError::Konfiguration(format!(
                "Funktion doppelt definiert: {}",
                name
            )));
        }
        self.funktionen.insert(name, f);
        Ok(self)
    }

    /// Builder-Variante von [`funktion`](Self::funktion)
    pub fn mit_funktion(mut self, name: impl Into<String>, f: HostFunktion) -> Result<Self> {
        self.funktion(name, f)?;
        Ok(self)
    }

    pub fn suchen(&self, name: &str) -> Option<&HostFunktion> {
        self.funktionen.get(name)
    }

    pub fn namen(&self) -> impl Iterator<Item = &str> {
        self.funktionen.keys().map(String::as_str)
    }

    pub fn anzahl(&self) -> usize {
        self.funktionen.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.funktionen.is_empty()
    }
}

/// Vollstaendige Import-Tabelle: Namensraum -> Funktionen
#[derive(Debug, Clone, Default)]
pub struct ImportTabelle {
    namensraeume: BTreeMap<String, ImportNamensraum>,
}

impl ImportTabelle {
    /// Leere Tabelle – der Wirt setzt keine Standard-Namensraeume voraus
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuegt einen Namensraum hinzu. Leere oder doppelte Namen sind Fehler.
    pub fn namensraum(
        &mut self,
        name: impl Into<String>,
        namensraum: ImportNamensraum,
    ) -> Result<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(WirtError::Konfiguration("Leerer Namensraum".into()));
        }
        if self.namensraeume.contains_key(&name) {
            return Err(WirtError::Konfiguration(format!(
                "Namensraum doppelt definiert: {}",
                name
            )));
        }
        if namensraum.ist_leer() {
            debug!(namensraum = %name, "Leerer Namensraum registriert");
        }
        self.namensraeume.insert(name, namensraum);
        Ok(self)
    }

    /// Builder-Variante von [`namensraum`](Self::namensraum)
    pub fn mit_namensraum(
        mut self,
        name: impl Into<String>,
        namensraum: ImportNamensraum,
    ) -> Result<Self> {
        self.namensraum(name, namensraum)?;
        Ok(self)
    }

    pub fn namensraum_suchen(&self, name: &str) -> Option<&ImportNamensraum> {
        self.namensraeume.get(name)
    }

    /// Zweistufige Suche (Namensraum, Funktionsname)
    pub fn suchen(&self, namensraum: &str, name: &str) -> Option<&HostFunktion> {
        self.namensraeume.get(namensraum)?.suchen(name)
    }

    pub fn namensraeume(&self) -> impl Iterator<Item = &str> {
        self.namensraeume.keys().map(String::as_str)
    }

    /// Anzahl aller Funktionen ueber alle Namensraeume
    pub fn anzahl_funktionen(&self) -> usize {
        self.namensraeume.values().map(ImportNamensraum::anzahl).sum()
    }
}
