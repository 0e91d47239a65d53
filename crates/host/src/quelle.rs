//! Byte-Quellen – liefern den vollstaendigen Modul-Puffer
//!
//! Die Beschaffung ist asynchron (I/O); der Wirt braucht nur einen fertigen,
//! nicht-streamenden Puffer bevor die Instanziierung beginnt.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, WirtError};

/// Alles was einen Modul-Puffer liefern kann
#[async_trait]
pub trait ByteQuelle: Send + Sync {
    /// Holt den vollstaendigen Puffer
    async fn bytes_holen(&self) -> Result<Vec<u8>>;

    /// Kurze Beschreibung fuer Logs und Fehlermeldungen
    fn beschreibung(&self) -> String;
}

/// Liest das Modul aus einer Datei
#[derive(Debug, Clone)]
pub struct DateiQuelle {
    pfad: PathBuf,
}

impl DateiQuelle {
    pub fn neu(pfad: impl Into<PathBuf>) -> Self {
        Self { pfad: pfad.into() }
    }

    pub fn pfad(&self) -> &Path {
        &self.pfad
    }
}

#[async_trait]
impl ByteQuelle for DateiQuelle {
    async fn bytes_holen(&self) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.pfad)
            .await
            .map_err(|e| WirtError::QuelleNichtVerfuegbar {
                quelle: self.beschreibung(),
                grund: e.to_string(),
            })?;
        debug!(quelle = %self.beschreibung(), bytes = bytes.len(), "Modul gelesen");
        Ok(bytes)
    }

    fn beschreibung(&self) -> String {
        format!("datei:{}", self.pfad.display())
    }
}

/// Liefert einen bereits im Speicher liegenden Puffer (z.B. eingebettet)
#[derive(Debug, Clone)]
pub struct SpeicherQuelle {
    name: String,
    bytes: Bytes,
}

impl SpeicherQuelle {
    pub fn neu(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl ByteQuelle for SpeicherQuelle {
    async fn bytes_holen(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }

    fn beschreibung(&self) -> String {
        format!("speicher:{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn datei_lesen() {
        let mut datei = tempfile::NamedTempFile::new().unwrap();
        datei.write_all(b"\0asm\x01\0\0\0").unwrap();

        let quelle = DateiQuelle::neu(datei.path());
        let bytes = quelle.bytes_holen().await.unwrap();
        assert_eq!(bytes, b"\0asm\x01\0\0\0");
    }

    #[tokio::test]
    async fn datei_fehlt() {
        let quelle = DateiQuelle::neu("/existiert/nicht/modul.wasm");
        let err = quelle.bytes_holen().await.unwrap_err();
        assert!(matches!(err, WirtError::QuelleNichtVerfuegbar { .. }));
        assert!(err.ist_wiederholbar());
        assert!(err.to_string().contains("/existiert/nicht/modul.wasm"));
    }

    #[tokio::test]
    async fn speicher_quelle() {
        let quelle = SpeicherQuelle::neu("eingebettet", vec![1u8, 2, 3]);
        assert_eq!(quelle.bytes_holen().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(quelle.beschreibung(), "speicher:eingebettet");
    }
}
