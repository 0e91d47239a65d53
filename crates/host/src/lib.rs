//! wasmwirt-host – minimaler WebAssembly Modul-Wirt
//!
//! Laedt ein binaeres Modul, verknuepft es mit einer Tabelle von
//! Host-Funktionen (nach Namensraum gruppiert), instanziiert es und ruft
//! einen Export mit f64-Argumenten auf.
//!
//! # Architektur
//! - [`wirt::ModulWirt`] – Instanziierung und Gesamtablauf
//! - [`instanz::ModulInstanz`] – Export-Aufrufe, serialisiert pro Instanz
//! - [`imports::ImportTabelle`] – Host-Funktionen nach Namensraum
//! - [`quelle::ByteQuelle`] – Beschaffung der Modul-Bytes (async)
//! - [`anbieter`] – Standard-Importe (Math, console, ext)
//! - [`host`] – wasmtime Engine, Grenzen und Linker

pub mod anbieter;
pub mod error;
pub mod host;
pub mod imports;
pub mod instanz;
pub mod quelle;
pub mod types;
pub mod wirt;

// Bequeme Re-Exporte
pub use error::{Result, TrapPhase, VerknuepfungsFehler, WirtError};
pub use host::grenzen::GrenzKonfiguration;
pub use imports::{HostFunktion, ImportNamensraum, ImportTabelle, Signatur};
pub use instanz::ModulInstanz;
pub use quelle::{ByteQuelle, DateiQuelle, SpeicherQuelle};
pub use types::{ExportArt, ExportInfo, InstanzId, InstanzInfo};
pub use wirt::ModulWirt;
