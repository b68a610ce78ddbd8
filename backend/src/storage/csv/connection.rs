use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// CsvConnection manages the data directory layout and ensures record files
/// exist before repositories touch them.
///
/// Layout:
/// ```text
/// <base>/
///   residents.csv
///   <incharger>/
///     labours.csv
///     allotments/
///       <allotment id>.yaml
/// ```
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

pub const LABOURS_CSV_HEADER: &str = "id,name,phone_number,working_areas,office,incharger_id,incharger_name,incharger_phone,last_latitude,last_longitude\n";
pub const RESIDENTS_CSV_HEADER: &str =
    "user_id,username,user_address,contact,street,latitude,longitude,today_status\n";

impl CsvConnection {
    /// Create a new connection rooted at the given base directory.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default data directory:
    /// `$COLLECTION_OPS_DATA_DIR` if set, else `~/Documents/Collection Ops`.
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var("COLLECTION_OPS_DATA_DIR") {
            return Self::new(dir);
        }

        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let documents_dir = PathBuf::from(home_dir).join("Documents");
        Self::new(documents_dir.join("Collection Ops"))
    }

    /// The data directory root.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Generate a safe filesystem name from an externally supplied id.
    /// Ids arrive from clients as opaque strings; anything outside
    /// alphanumerics, dashes, and underscores becomes an underscore.
    pub fn safe_name(id: &str) -> String {
        id.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Directory holding one incharger's data.
    pub fn incharger_directory(&self, incharger_id: &str) -> PathBuf {
        self.base_directory.join(Self::safe_name(incharger_id))
    }

    /// Directory holding one incharger's allotment documents.
    pub fn allotments_directory(&self, incharger_id: &str) -> PathBuf {
        self.incharger_directory(incharger_id).join("allotments")
    }

    /// Path of one incharger's labours file.
    pub fn labours_file_path(&self, incharger_id: &str) -> PathBuf {
        self.incharger_directory(incharger_id).join("labours.csv")
    }

    /// Path of the service-wide residents file.
    pub fn residents_file_path(&self) -> PathBuf {
        self.base_directory.join("residents.csv")
    }

    /// Ensure an incharger's labours file exists with its header.
    pub fn ensure_labours_file_exists(&self, incharger_id: &str) -> Result<()> {
        let dir = self.incharger_directory(incharger_id);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let file_path = self.labours_file_path(incharger_id);
        if !file_path.exists() {
            fs::write(&file_path, LABOURS_CSV_HEADER)?;
        }

        Ok(())
    }

    /// Ensure the residents file exists with its header.
    pub fn ensure_residents_file_exists(&self) -> Result<()> {
        let file_path = self.residents_file_path();
        if !file_path.exists() {
            fs::write(&file_path, RESIDENTS_CSV_HEADER)?;
        }
        Ok(())
    }

    /// Ensure an incharger's allotments directory exists.
    pub fn ensure_allotments_directory_exists(&self, incharger_id: &str) -> Result<()> {
        let dir = self.allotments_directory(incharger_id);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Discover every incharger directory under the base, by scanning for
    /// subdirectories. Files (residents.csv) are skipped.
    pub fn incharger_directories(&self) -> Result<Vec<PathBuf>> {
        if !self.base_directory.exists() {
            return Ok(Vec::new());
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.base_directory)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}
