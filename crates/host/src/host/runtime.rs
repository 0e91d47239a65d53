//! wasmtime Runtime Setup und Engine-Konfiguration

use tracing::{debug, info, warn};
use wasmtime::{Engine, Module, Store};

use crate::error::{Result, WirtError};
use crate::host::grenzen::GrenzKonfiguration;

/// Magic-Header jedes binaeren WASM-Moduls
const WASM_MAGIC: &[u8; 4] = b"\0asm";

/// Gemeinsame wasmtime Engine (wiederverwendbar, thread-safe)
#[derive(Clone)]
pub struct WirtEngine {
    engine: Engine,
    grenzen: GrenzKonfiguration,
}

impl WirtEngine {
    /// Erstellt eine neue Engine fuer die gegebenen Grenzen
    pub fn neu(grenzen: GrenzKonfiguration) -> Result<Self> {
        let mut config = wasmtime::Config::new();
        // Fuel-basierte CPU-Begrenzung nur wenn konfiguriert
        config.consume_fuel(grenzen.fuel_aktiv());

        let engine = Engine::new(&config)
            .map_err(|e| WirtError::Intern(format!("Engine-Erstellung fehlgeschlagen: {}", e)))?;

        info!(
            max_speicher_bytes = grenzen.max_speicher_bytes,
            max_instruktionen = grenzen.max_instruktionen,
            "wasmtime Engine initialisiert"
        );
        Ok(Self { engine, grenzen })
    }

    /// Gibt Referenz auf die interne Engine zurueck
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn grenzen(&self) -> &GrenzKonfiguration {
        &self.grenzen
    }

    /// Kompiliert einen binaeren Modul-Puffer
    pub fn kompilieren(&self, wasm_bytes: &[u8]) -> Result<Module> {
        if wasm_bytes.is_empty() {
            return Err(WirtError::ModulUngueltig("Leerer Byte-Puffer".into()));
        }
        if !wasm_bytes.starts_with(WASM_MAGIC) {
            return Err(WirtError::ModulUngueltig(
                "Kein binaeres WASM-Modul (Magic-Header fehlt)".into(),
            ));
        }
        debug!("Kompiliere WASM-Modul ({} Bytes)", wasm_bytes.len());
        Module::new(&self.engine, wasm_bytes)
            .map_err(|e| WirtError::ModulUngueltig(format!("{:#}", e)))
    }

    /// Erstellt einen frischen Store mit Speicherlimit und Fuel
    pub(crate) fn store_erstellen(&self) -> Result<Store<HostDaten>> {
        let host = HostDaten {
            limiter: SpeicherLimiter {
                max_bytes: self.grenzen.max_speicher_bytes,
            },
        };
        let mut store = Store::new(&self.engine, host);

        // Speicherlimit setzen – Referenz auf Feld in Host-Daten
        store.limiter(|host| &mut host.limiter);

        self.fuel_auffuellen(&mut store)?;
        Ok(store)
    }

    /// Setzt das Fuel-Budget fuer den naechsten Gast-Lauf zurueck
    pub(crate) fn fuel_auffuellen(&self, store: &mut Store<HostDaten>) -> Result<()> {
        if !self.grenzen.fuel_aktiv() {
            return Ok(());
        }
        store
            .set_fuel(self.grenzen.max_instruktionen)
            .map_err(|e| WirtError::Intern(format!("Fuel setzen fehlgeschlagen: {}", e)))
    }
}

impl std::fmt::Debug for WirtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WirtEngine")
            .field("grenzen", &self.grenzen)
            .finish_non_exhaustive()
    }
}

/// Host-Daten fuer den Store
pub(crate) struct HostDaten {
    pub(crate) limiter: SpeicherLimiter,
}

/// Speicherlimiter fuer WASM-Instanzen
pub(crate) struct SpeicherLimiter {
    max_bytes: u64,
}

impl wasmtime::ResourceLimiter for SpeicherLimiter {
    fn memory_growing(
        &mut self,
        current: usize,
        desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        if desired as u64 > self.max_bytes {
            warn!(
                aktuell = current,
                "Modul ueberschreitet Speicherlimit: {} > {}",
                desired,
                self.max_bytes
            );
            return Ok(false);
        }
        Ok(true)
    }

    fn table_growing(
        &mut self,
        _current: usize,
        _desired: usize,
        _maximum: Option<usize>,
    ) -> wasmtime::Result<bool> {
        Ok(true)
    }
}
