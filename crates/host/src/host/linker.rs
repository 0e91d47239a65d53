//! Verknuepfung der Modul-Imports mit der Import-Tabelle
//!
//! Es werden nur die Funktionen in den Linker uebernommen, die das Modul
//! tatsaechlich importiert. Fehlende oder unpassende Imports brechen ab,
//! bevor Gast-Code laeuft.

use tracing::debug;
use wasmtime::{Engine, ExternType, Linker, Module, Val};

use crate::error::{Result, VerknuepfungsFehler, WirtError};
use crate::host::runtime::HostDaten;
use crate::imports::{functyp_beschreiben, ImportTabelle, Signatur};

fn art_name(ty: &ExternType) -> &'static str {
    match ty {
        ExternType::Func(_) => "func",
        ExternType::Global(_) => "global",
        ExternType::Table(_) => "table",
        ExternType::Memory(_) => "memory",
        _ => "sonstige",
    }
}

/// Baut einen Linker der alle Modul-Imports aus der Tabelle bedient
pub(crate) fn linker_aufbauen(
    engine: &Engine,
    modul: &Module,
    importe: &ImportTabelle,
) -> Result<Linker<HostDaten>> {
    let mut linker = Linker::new(engine);
    // Ein Modul darf denselben Import mehrfach deklarieren
    linker.allow_shadowing(true);

    for import in modul.imports() {
        let namensraum = import.module();
        let name = import.name();

        let ty = match import.ty() {
            ExternType::Func(ty) => ty,
            andere => {
                return Err(VerknuepfungsFehler::NichtUnterstuetzteArt {
                    namensraum: namensraum.into(),
                    name: name.into(),
                    art: art_name(&andere).into(),
                }
                .into())
            }
        };

        let host_fn = importe.suchen(namensraum, name).ok_or_else(|| {
            VerknuepfungsFehler::ImportFehlt {
                namensraum: namensraum.into(),
                name: name.into(),
            }
        })?;

        let bereitgestellt = host_fn.signatur();
        if Signatur::aus_functyp(&ty) != Some(bereitgestellt) {
            return Err(VerknuepfungsFehler::SignaturInkompatibel {
                namensraum: namensraum.into(),
                name: name.into(),
                erwartet: functyp_beschreiben(&ty),
                bereitgestellt: bereitgestellt.to_string(),
            }
            .into());
        }

        debug!(namensraum, name, signatur = %bereitgestellt, "Import verknuepft");

        let f = host_fn.clone();
        linker
            .func_new(namensraum, name, ty, move |_caller, params, results| {
                let args = params
                    .iter()
                    .map(|v| {
                        v.f64()
                            .ok_or_else(|| wasmtime::Error::msg("Host-Funktion erwartet f64"))
                    })
                    .collect::<wasmtime::Result<Vec<f64>>>()?;
                let ergebnis = f
                    .aufrufen(&args)
                    .map_err(|e| wasmtime::Error::msg(e.to_string()))?;
                if let (Some(wert), Some(ziel)) = (ergebnis, results.first_mut()) {
                    *ziel = Val::F64(wert.to_bits());
                }
                Ok(())
            })
            .map_err(|e| {
                WirtError::Intern(format!("Import {}.{} nicht definierbar: {}", namensraum, name, e))
            })?;
    }

    Ok(linker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::grenzen::GrenzKonfiguration;
    use crate::host::runtime::WirtEngine;
    use crate::imports::{HostFunktion, ImportNamensraum};

    const TWOX_MODUL: &str = r#"
        (module
          (import "ext" "twox" (func $twox (param f64) (result f64)))
          (func (export "f1") (param f64) (result f64)
            local.get 0
            call $twox
            f64.const 1
            f64.add))
    "#;

    fn modul(engine: &WirtEngine, wat: &str) -> Module {
        engine.kompilieren(&wat::parse_str(wat).unwrap()).unwrap()
    }

    fn engine() -> WirtEngine {
        WirtEngine::neu(GrenzKonfiguration::standard()).unwrap()
    }

    fn tabelle_mit(name: &str, f: HostFunktion) -> ImportTabelle {
        ImportTabelle::neu()
            .mit_namensraum("ext", ImportNamensraum::neu().mit_funktion(name, f).unwrap())
            .unwrap()
    }

    #[test]
    fn vollstaendige_tabelle_verknuepft() {
        let engine = engine();
        let m = modul(&engine, TWOX_MODUL);
        let tabelle = tabelle_mit("twox", HostFunktion::unaer(|x| 2.0 * x));
        assert!(linker_aufbauen(engine.engine(), &m, &tabelle).is_ok());
    }

    #[test]
    fn fehlende_funktion() {
        let engine = engine();
        let m = modul(&engine, TWOX_MODUL);
        let tabelle = tabelle_mit("threex", HostFunktion::unaer(|x| 3.0 * x));
        let err = linker_aufbauen(engine.engine(), &m, &tabelle).err().unwrap();
        assert!(matches!(
            err,
            WirtError::Verknuepfung(VerknuepfungsFehler::ImportFehlt { ref namensraum, ref name })
                if namensraum == "ext" && name == "twox"
        ));
    }

    #[test]
    fn falsche_stelligkeit() {
        let engine = engine();
        let m = modul(&engine, TWOX_MODUL);
        let tabelle = tabelle_mit("twox", HostFunktion::binaer(|a, b| a * b));
        let err = linker_aufbauen(engine.engine(), &m, &tabelle).err().unwrap();
        assert!(matches!(
            err,
            WirtError::Verknuepfung(VerknuepfungsFehler::SignaturInkompatibel { .. })
        ));
    }

    #[test]
    fn effekt_statt_wert() {
        let engine = engine();
        let m = modul(&engine, TWOX_MODUL);
        let tabelle = tabelle_mit("twox", HostFunktion::effekt_unaer(|_| {}));
        let err = linker_aufbauen(engine.engine(), &m, &tabelle).err().unwrap();
        assert!(err.to_string().contains("(f64) -> (f64)"));
    }

    #[test]
    fn integer_import_inkompatibel() {
        let engine = engine();
        let m = modul(
            &engine,
            r#"(module (import "ext" "twox" (func (param i32) (result i32))))"#,
        );
        let tabelle = tabelle_mit("twox", HostFunktion::unaer(|x| 2.0 * x));
        let err = linker_aufbauen(engine.engine(), &m, &tabelle).err().unwrap();
        assert!(err.to_string().contains("i32"));
    }

    #[test]
    fn speicher_import_nicht_unterstuetzt() {
        let engine = engine();
        let m = modul(&engine, r#"(module (import "env" "memory" (memory 1)))"#);
        let err = linker_aufbauen(engine.engine(), &m, &ImportTabelle::neu())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            WirtError::Verknuepfung(VerknuepfungsFehler::NichtUnterstuetzteArt { ref art, .. })
                if art == "memory"
        ));
    }

    #[test]
    fn doppelter_import_erlaubt() {
        let engine = engine();
        let m = modul(
            &engine,
            r#"(module
                 (import "ext" "twox" (func (param f64) (result f64)))
                 (import "ext" "twox" (func (param f64) (result f64))))"#,
        );
        let tabelle = tabelle_mit("twox", HostFunktion::unaer(|x| 2.0 * x));
        assert!(linker_aufbauen(engine.engine(), &m, &tabelle).is_ok());
    }
}
