//! ModulWirt – Instanziierung und Gesamtablauf
//!
//! Ablauf: Byte-Quelle -> [`ModulWirt::instanziieren`] -> [`ModulInstanz::aufrufen`].
//! Nur die Byte-Beschaffung ist asynchron; Verknuepfen, Instanziieren und
//! Aufrufen laufen synchron bis zum Ende oder Fehler.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{Result, TrapPhase, WirtError};
use crate::host::grenzen::GrenzKonfiguration;
use crate::host::linker::linker_aufbauen;
use crate::host::runtime::WirtEngine;
use crate::imports::ImportTabelle;
use crate::instanz::ModulInstanz;
use crate::quelle::ByteQuelle;
use crate::types::{exporte_lesen, InstanzId, InstanzInfo};

/// Berechnet SHA-256 Hash des Modul-Binaries (hex)
pub fn modul_hash(wasm_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(wasm_bytes);
    format!("{:x}", hasher.finalize())
}

/// Der Modul-Wirt – haelt die Engine, erzeugt unabhaengige Instanzen
#[derive(Debug, Clone)]
pub struct ModulWirt {
    engine: WirtEngine,
}

impl ModulWirt {
    /// Erstellt einen Wirt mit den gegebenen Ressourcen-Grenzen
    pub fn neu(grenzen: GrenzKonfiguration) -> Result<Self> {
        Ok(Self {
            engine: WirtEngine::neu(grenzen)?,
        })
    }

    /// Wirt mit Standard-Grenzen
    pub fn standard() -> Result<Self> {
        Self::neu(GrenzKonfiguration::standard())
    }

    pub fn engine(&self) -> &WirtEngine {
        &self.engine
    }

    /// Verknuepft ein Modul mit der Import-Tabelle und instanziiert es.
    ///
    /// Eine eventuelle Start-Funktion laeuft hier, vor der Rueckgabe. Bei
    /// jedem Fehler entsteht keine Instanz.
    pub fn instanziieren(&self, bytes: &[u8], importe: &ImportTabelle) -> Result<ModulInstanz> {
        let modul = self.engine.kompilieren(bytes)?;
        let linker = linker_aufbauen(self.engine.engine(), &modul, importe)?;
        let mut store = self.engine.store_erstellen()?;

        let instanz = linker.instantiate(&mut store, &modul).map_err(|e| {
            if e.downcast_ref::<wasmtime::Trap>().is_some() {
                let fehler = WirtError::aus_gast_lauf(e, TrapPhase::Initialisierung);
                warn!("Trap in Start-Funktion: {}", fehler);
                fehler
            } else {
                WirtError::Instanziierung(format!("{:#}", e))
            }
        })?;

        let info = InstanzInfo {
            id: InstanzId::new(),
            modul_hash: modul_hash(bytes),
            instanziiert_am: Utc::now(),
            exporte: exporte_lesen(&modul),
        };

        info!(
            instanz = %info.id,
            modul_hash = %info.modul_hash,
            exporte = info.exporte.len(),
            funktionen = info.exporte.iter().filter(|e| e.art.ist_funktion()).count(),
            "Modul instanziiert"
        );

        Ok(ModulInstanz::neu(info, self.engine.clone(), store, instanz))
    }

    /// Kompletter Ablauf als eine logische Aufgabe: Bytes holen (async),
    /// dann synchron instanziieren und einen Export aufrufen.
    pub async fn laden_und_aufrufen(
        &self,
        quelle: &dyn ByteQuelle,
        importe: &ImportTabelle,
        export: &str,
        args: &[f64],
    ) -> Result<Vec<f64>> {
        let bytes = quelle.bytes_holen().await?;
        info!(quelle = %quelle.beschreibung(), bytes = bytes.len(), "Modul geladen");
        let instanz = self.instanziieren(&bytes, importe)?;
        instanz.aufrufen(export, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{HostFunktion, ImportNamensraum};
    use crate::types::ExportArt;

    fn bytes(wat: &str) -> Vec<u8> {
        wat::parse_str(wat).unwrap()
    }

    #[test]
    fn hash_ist_stabil() {
        let h = modul_hash(b"abc");
        assert_eq!(
            h,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(h, modul_hash(b"abc"));
    }

    #[test]
    fn info_enthaelt_exporte_in_reihenfolge() {
        let wirt = ModulWirt::standard().unwrap();
        let instanz = wirt
            .instanziieren(
                &bytes(
                    r#"(module
                         (memory (export "mem") 1)
                         (global (export "g") f64 (f64.const 1))
                         (func (export "eins") (result f64) f64.const 1)
                         (func (export "int") (param i32) (result i32) local.get 0))"#,
                ),
                &ImportTabelle::neu(),
            )
            .unwrap();

        let exporte = instanz.exporte();
        let namen: Vec<&str> = exporte.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(namen, vec!["mem", "g", "eins", "int"]);
        assert_eq!(exporte[0].art, ExportArt::Speicher);
        assert_eq!(exporte[1].art, ExportArt::Global);
        assert!(matches!(exporte[2].art, ExportArt::Funktion(Some(_))));
        assert_eq!(exporte[3].art, ExportArt::Funktion(None));
        assert_eq!(instanz.info().modul_hash.len(), 64);
    }

    #[test]
    fn text_format_wird_abgelehnt() {
        let wirt = ModulWirt::standard().unwrap();
        let err = wirt
            .instanziieren(b"(module)", &ImportTabelle::neu())
            .unwrap_err();
        assert!(matches!(err, WirtError::ModulUngueltig(_)));
    }

    #[test]
    fn speicher_ueber_grenze() {
        let wirt = ModulWirt::neu(GrenzKonfiguration {
            max_speicher_bytes: 64 * 1024,
            ..Default::default()
        })
        .unwrap();
        // 2 Seiten = 128 KiB > 64 KiB
        let err = wirt
            .instanziieren(&bytes(r#"(module (memory 2))"#), &ImportTabelle::neu())
            .unwrap_err();
        assert!(matches!(err, WirtError::Instanziierung(_)));
    }

    #[test]
    fn fuel_erschoepft_ist_trap() {
        let wirt = ModulWirt::neu(GrenzKonfiguration {
            max_instruktionen: 10_000,
            ..Default::default()
        })
        .unwrap();
        let instanz = wirt
            .instanziieren(
                &bytes(r#"(module (func (export "endlos") (result f64) (loop $l (br $l)) f64.const 0))"#),
                &ImportTabelle::neu(),
            )
            .unwrap();
        let err = instanz.aufrufen("endlos", &[]).unwrap_err();
        assert_eq!(err.trap_code(), Some(wasmtime::Trap::OutOfFuel));
        assert!(instanz.hat_getrappt());
    }

    #[test]
    fn fuel_wird_pro_aufruf_aufgefuellt() {
        let wirt = ModulWirt::neu(GrenzKonfiguration {
            max_instruktionen: 1_000,
            ..Default::default()
        })
        .unwrap();
        let instanz = wirt
            .instanziieren(
                &bytes(r#"(module (func (export "k") (result f64) f64.const 7))"#),
                &ImportTabelle::neu(),
            )
            .unwrap();
        for _ in 0..50 {
            assert_eq!(instanz.aufrufen_skalar("k", &[]).unwrap(), 7.0);
        }
    }

    #[test]
    fn binaere_host_funktion() {
        let wirt = ModulWirt::standard().unwrap();
        let importe = ImportTabelle::neu()
            .mit_namensraum(
                "Math",
                ImportNamensraum::neu()
                    .mit_funktion("pow", HostFunktion::binaer(f64::powf))
                    .unwrap(),
            )
            .unwrap();
        let instanz = wirt
            .instanziieren(
                &bytes(
                    r#"(module
                         (import "Math" "pow" (func $pow (param f64 f64) (result f64)))
                         (func (export "quadrat") (param f64) (result f64)
                           local.get 0 f64.const 2 call $pow))"#,
                ),
                &importe,
            )
            .unwrap();
        assert_eq!(instanz.aufrufen_skalar("quadrat", &[3.0]).unwrap(), 9.0);
    }
}
