//! Filesystem layout of conversion jobs.
//!
//! A job owns two files keyed by its id:
//!
//! ```text
//! {upload_dir}/{id}_{original_filename}
//! {output_dir}/{id}_cmyk.tiff
//! ```
//!
//! There is no index. A job is found again by scanning `output_dir` for the
//! first TIFF whose name starts with the id. Outputs are encoded into
//! `{upload_dir}/{id}_cmyk.tiff.part` and moved into `output_dir` when
//! complete, so neither a scan nor the static `/view-images` mount ever sees a
//! half-written file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Paths belonging to one conversion.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub original_filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Staging path of the output while it is being encoded. Lives in the
    /// upload directory, outside anything served statically.
    pub partial_path: PathBuf,
}

/// A stored output located by [`JobStore::find_output`].
#[derive(Debug, Clone)]
pub struct StoredOutput {
    pub path: PathBuf,
    pub file_name: String,
}

/// Owner of the upload and output directories.
#[derive(Debug, Clone)]
pub struct JobStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl JobStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Create both directories if they are missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Allocate a fresh id and derive the job's paths.
    pub fn new_job(&self, original_filename: &str) -> Job {
        let id = Uuid::new_v4().to_string();
        let original_filename = sanitize_filename(original_filename);
        let output_name = format!("{id}_cmyk.tiff");
        Job {
            input_path: self.upload_dir.join(format!("{id}_{original_filename}")),
            partial_path: self.upload_dir.join(format!("{output_name}.part")),
            output_path: self.output_dir.join(output_name),
            id,
            original_filename,
        }
    }

    /// First file in the output directory named `{image_id}…` with a `.tif`
    /// or `.tiff` extension.
    pub async fn find_output(&self, image_id: &str) -> std::io::Result<Option<StoredOutput>> {
        let mut entries = match fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            if file_name.starts_with(image_id) && is_tiff_name(&file_name) {
                if !entry.file_type().await?.is_file() {
                    continue;
                }
                return Ok(Some(StoredOutput {
                    path: entry.path(),
                    file_name,
                }));
            }
        }
        Ok(None)
    }

    /// Best-effort removal of every file the job may have written. Failures
    /// are logged and otherwise ignored.
    pub async fn discard(&self, job: &Job) {
        for path in [&job.input_path, &job.partial_path, &job.output_path] {
            match fs::remove_file(path).await {
                Ok(()) => debug!(image_id = %job.id, path = %path.display(), "removed job file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    image_id = %job.id,
                    path = %path.display(),
                    error = %e,
                    "failed to remove job file"
                ),
            }
        }
    }
}

pub fn is_tiff_name(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".tif") || lower.ends_with(".tiff")
}

/// Reduce a client-supplied name to a single safe path component.
fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn job_paths_share_the_id_prefix() {
        let store = JobStore::new("/data/in", "/data/out");
        let job = store.new_job("cat photo.png");
        assert!(Uuid::parse_str(&job.id).is_ok());
        assert_eq!(job.original_filename, "cat_photo.png");
        assert_eq!(job.input_path, PathBuf::from(format!("/data/in/{}_cat_photo.png", job.id)));
        assert_eq!(job.output_path, PathBuf::from(format!("/data/out/{}_cmyk.tiff", job.id)));
        assert_eq!(
            job.partial_path,
            PathBuf::from(format!("/data/in/{}_cmyk.tiff.part", job.id))
        );
        assert!(!job.partial_path.starts_with("/data/out"));
    }

    #[test]
    fn each_job_gets_a_distinct_id() {
        let store = JobStore::new("in", "out");
        assert_ne!(store.new_job("a.png").id, store.new_job("a.png").id);
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\img 1.jpg"), "img_1.jpg");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn tiff_names_are_case_insensitive() {
        assert!(is_tiff_name("x_cmyk.tiff"));
        assert!(is_tiff_name("x.TIF"));
        assert!(!is_tiff_name("x_cmyk.tiff.part"));
        assert!(!is_tiff_name("x.png"));
    }

    #[tokio::test]
    async fn find_output_matches_prefix_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("in"), dir.path().join("out"));
        store.ensure_dirs().await.unwrap();
        let out = dir.path().join("out");
        std::fs::write(out.join("abc_cmyk.tiff.part"), b"partial").unwrap();
        std::fs::write(out.join("abc_notes.txt"), b"x").unwrap();
        assert!(store.find_output("abc").await.unwrap().is_none());

        std::fs::write(out.join("abc_cmyk.tiff"), b"tiff").unwrap();
        let found = store.find_output("abc").await.unwrap().unwrap();
        assert_eq!(found.file_name, "abc_cmyk.tiff");
        assert!(store.find_output("zzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_output_tolerates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("in"), dir.path().join("missing"));
        assert!(store.find_output("abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn discard_removes_whatever_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(dir.path().join("in"), dir.path().join("out"));
        store.ensure_dirs().await.unwrap();
        let job = store.new_job("a.png");
        std::fs::write(&job.input_path, b"in").unwrap();
        std::fs::write(&job.partial_path, b"half").unwrap();

        store.discard(&job).await;
        assert!(!job.input_path.exists());
        assert!(!job.partial_path.exists());
        assert!(!job.output_path.exists());
    }
}
