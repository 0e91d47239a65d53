//! Modul-Instanz – gelinkte, aufrufbare Instanz eines Moduls
//!
//! Jede Instanz besitzt einen eigenen wasmtime Store und damit eigenen
//! linearen Speicher. Aufrufe in dieselbe Instanz werden ueber einen Mutex
//! serialisiert; verschiedene Instanzen teilen keinen veraenderlichen Zustand.
//!
//! Nach einem Trap bleibt die Instanz technisch benutzbar. Ob der Gast-Zustand
//! danach noch konsistent ist, haengt vom Modul ab; im Zweifel sollte der
//! Aufrufer die Instanz verwerfen (siehe [`ModulInstanz::hat_getrappt`]).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};
use wasmtime::{Extern, Instance, Store, Val};

use crate::error::{Result, TrapPhase, WirtError};
use crate::host::runtime::{HostDaten, WirtEngine};
use crate::imports::{functyp_beschreiben, Signatur};
use crate::types::{ExportInfo, InstanzId, InstanzInfo};

/// Store und Instanz-Handle gehoeren zusammen
struct InstanzZustand {
    store: Store<HostDaten>,
    instanz: Instance,
}

/// Eine lebende Modul-Instanz
pub struct ModulInstanz {
    info: InstanzInfo,
    engine: WirtEngine,
    zustand: Mutex<InstanzZustand>,
    getrappt: AtomicBool,
}

impl ModulInstanz {
    pub(crate) fn neu(
        info: InstanzInfo,
        engine: WirtEngine,
        store: Store<HostDaten>,
        instanz: Instance,
    ) -> Self {
        Self {
            info,
            engine,
            zustand: Mutex::new(InstanzZustand { store, instanz }),
            getrappt: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> InstanzId {
        self.info.id
    }

    pub fn info(&self) -> &InstanzInfo {
        &self.info
    }

    /// Export-Tabelle genau wie vom Modul deklariert
    pub fn exporte(&self) -> &[ExportInfo] {
        &self.info.exporte
    }

    /// True sobald ein Aufruf dieser Instanz getrappt hat
    pub fn hat_getrappt(&self) -> bool {
        self.getrappt.load(Ordering::Acquire)
    }

    /// Ruft einen exportierten Funktions-Export auf und liefert alle Ergebnisse
    pub fn aufrufen(&self, export: &str, args: &[f64]) -> Result<Vec<f64>> {
        self.aufrufen_intern(export, args, None)
    }

    /// Wie [`aufrufen`](Self::aufrufen), verlangt aber genau ein Ergebnis
    pub fn aufrufen_skalar(&self, export: &str, args: &[f64]) -> Result<f64> {
        let ergebnisse = self.aufrufen_intern(export, args, Some(1))?;
        Ok(ergebnisse[0])
    }

    fn aufrufen_intern(
        &self,
        export: &str,
        args: &[f64],
        erwartete_ergebnisse: Option<usize>,
    ) -> Result<Vec<f64>> {
        let mut zustand = self.zustand.lock();
        let InstanzZustand { store, instanz } = &mut *zustand;

        let func = instanz
            .get_export(&mut *store, export)
            .and_then(Extern::into_func)
            .ok_or_else(|| WirtError::ExportNichtGefunden(export.to_string()))?;

        let ty = func.ty(&*store);
        let signatur = Signatur::aus_functyp(&ty).ok_or_else(|| WirtError::SignaturFehler {
            export: export.to_string(),
            grund: format!(
                "Export verwendet Typen ausserhalb von f64: {}",
                functyp_beschreiben(&ty)
            ),
        })?;

        if args.len() != signatur.parameter {
            return Err(WirtError::SignaturFehler {
                export: export.to_string(),
                grund: format!(
                    "erwartet {} Argumente, erhalten {}",
                    signatur.parameter,
                    args.len()
                ),
            });
        }
        if let Some(n) = erwartete_ergebnisse {
            if signatur.ergebnisse != n {
                return Err(WirtError::SignaturFehler {
                    export: export.to_string(),
                    grund: format!(
                        "erwartet {} Ergebnis(se), Export liefert {}",
                        n, signatur.ergebnisse
                    ),
                });
            }
        }

        self.engine.fuel_auffuellen(store)?;

        let params: Vec<Val> = args.iter().map(|x| Val::F64(x.to_bits())).collect();
        let mut ergebnisse = vec![Val::F64(0); signatur.ergebnisse];

        debug!(instanz = %self.info.id, export, ?args, "Export-Aufruf");
        func.call(&mut *store, &params, &mut ergebnisse)
            .map_err(|e| {
                self.getrappt.store(true, Ordering::Release);
                let fehler = WirtError::aus_gast_lauf(e, TrapPhase::Ausfuehrung);
                warn!(instanz = %self.info.id, export, "Gast-Trap: {}", fehler);
                fehler
            })?;

        ergebnisse
            .iter()
            .map(|v| {
                v.f64()
                    .ok_or_else(|| WirtError::Intern("Ergebnis ist kein f64".into()))
            })
            .collect()
    }
}

impl std::fmt::Debug for ModulInstanz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModulInstanz")
            .field("info", &self.info)
            .field("getrappt", &self.hat_getrappt())
            .finish_non_exhaustive()
    }
}
