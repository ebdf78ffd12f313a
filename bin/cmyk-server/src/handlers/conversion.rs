use std::path::{Path, PathBuf};

use cmyk_imaging::ImagingError;
use thiserror::Error;
use tokio::task;
use tracing::{debug, info};

use crate::store::{Job, JobStore};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Imaging(#[from] ImagingError),

    #[error("conversion task aborted: {0}")]
    Join(#[from] task::JoinError),
}

/// Stores uploads and runs the RGB → CMYK conversion.
pub struct ConversionService;

impl ConversionService {
    /// Persist `bytes` as the job's original, convert it and move the TIFF
    /// into place. On error every file of the job is removed before
    /// returning.
    pub async fn run(store: &JobStore, job: &Job, bytes: &[u8]) -> Result<(u32, u32), ConversionError> {
        match Self::convert(job, bytes).await {
            Ok(dims) => Ok(dims),
            Err(e) => {
                store.discard(job).await;
                Err(e)
            }
        }
    }

    async fn convert(job: &Job, bytes: &[u8]) -> Result<(u32, u32), ConversionError> {
        tokio::fs::write(&job.input_path, bytes).await?;
        debug!(
            image_id = %job.id,
            original = %job.original_filename,
            path = %job.input_path.display(),
            size_bytes = bytes.len(),
            "stored original upload"
        );

        let input: PathBuf = job.input_path.clone();
        let partial: PathBuf = job.partial_path.clone();
        let (width, height) =
            task::spawn_blocking(move || cmyk_imaging::convert_to_cmyk_tiff(&input, &partial)).await??;

        publish(&job.partial_path, &job.output_path).await?;
        info!(
            image_id = %job.id,
            width,
            height,
            output = %job.output_path.display(),
            "converted image to CMYK"
        );
        Ok((width, height))
    }

    /// Render the stored TIFF at `path` as JPEG bytes.
    pub async fn preview(path: PathBuf, quality: u8) -> Result<Vec<u8>, ConversionError> {
        let jpeg = task::spawn_blocking(move || cmyk_imaging::render_preview(&path, quality)).await??;
        Ok(jpeg)
    }
}

/// Move a finished staging file into the output directory. A plain rename
/// is atomic; across filesystems the file is copied and the staging file
/// removed.
async fn publish(staged: &Path, output: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(staged, output).await {
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            debug!(from = %staged.display(), to = %output.display(), "rename crosses devices, copying");
            tokio::fs::copy(staged, output).await?;
            tokio::fs::remove_file(staged).await
        }
        res => res,
    }
}
