//! Persistance du ledger dans un fichier JSON unique.

use crate::model::Ledger;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    fn load(&self) -> anyhow::Result<Ledger>;
    /// Remplace le contenu persisté d'un bloc : un lecteur voit l'ancien
    /// ledger ou le nouveau, jamais un fichier tronqué.
    fn save(&self, ledger: &Ledger) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Ledger vide au premier lancement ; toute autre erreur remonte.
    pub fn load_or_default(&self) -> anyhow::Result<Ledger> {
        match File::open(&self.path) {
            Ok(file) => self.parse(file),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger yet, starting empty");
                Ok(Ledger::default())
            }
            Err(err) => Err(err).with_context(|| format!("opening {}", self.path.display())),
        }
    }

    fn parse(&self, file: File) -> anyhow::Result<Ledger> {
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing ledger {}", self.path.display()))
    }

    /// Le fichier temporaire doit vivre sur le même volume que la cible.
    fn staging_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Ledger> {
        let file =
            File::open(&self.path).with_context(|| format!("opening {}", self.path.display()))?;
        self.parse(file)
    }

    fn save(&self, ledger: &Ledger) -> anyhow::Result<()> {
        let tmp = NamedTempFile::new_in(self.staging_dir())
            .with_context(|| format!("staging ledger next to {}", self.path.display()))?;
        let mut out = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut out, ledger)?;
        out.flush()?;
        let tmp = out.into_inner().map_err(|err| err.into_error())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            kits = ledger.kits.len(),
            assignments = ledger.assignments.len(),
            "ledger saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Kit, KitType, OrgId};
    use tempfile::tempdir;

    #[test]
    fn corrupt_file_is_an_error_not_an_empty_ledger() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let storage = JsonStorage::open(&path).unwrap();
        assert!(storage.exists());
        let err = storage.load_or_default().unwrap_err();
        assert!(format!("{err:#}").contains("parsing ledger"));
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::open(dir.path().join("ledger.json")).unwrap();

        let mut ledger = Ledger::default();
        storage.save(&ledger).unwrap();
        ledger
            .kits
            .push(Kit::new(OrgId::default(), "K", KitType::Tabletop, "Lyon", 1, 1));
        storage.save(&ledger).unwrap();

        assert_eq!(storage.load().unwrap().kits, ledger.kits);
        // seul le fichier cible reste dans le dossier
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
