/*! Bulk corpus synchronisation

Prepares one source text against many target texts for an external aligner.
For each target, the scripture corpus is built with empty rows kept and the
synchronised source and target files are written, named like their inputs, in
`<out_dir>/<source stem>/<target stem>/`. The aligner then writes
`alignment.scores.txt` next to them, one score per row; targets that already
have scores are skipped.
!*/
use std::path::{Path, PathBuf};

use log::{error, info};
use rayon::prelude::*;

use crate::corpus::ParallelCorpus;
use crate::error::Error;
use crate::io::write_corpus;
use crate::pipelines::SCORES_FILE;

/// Outcome of a bulk synchronisation, as target paths.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

enum SyncStatus {
    Synced,
    Skipped,
    Failed,
}

fn file_stem(path: &Path) -> Result<String, Error> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Custom(format!("{:?} has no file name", path)))
}

/// Write the synchronised source and target files of one corpus pair into `dst_dir`.
pub fn sync_corpus(vref_path: &Path, src_path: &Path, trg_path: &Path, dst_dir: &Path) -> Result<usize, Error> {
    let corpus = ParallelCorpus::from_paths(vref_path, src_path, trg_path, false)?;
    std::fs::create_dir_all(dst_dir)?;
    let name = |path: &Path| -> Result<PathBuf, Error> {
        path.file_name()
            .map(|name| dst_dir.join(name))
            .ok_or_else(|| Error::Custom(format!("{:?} has no file name", path)))
    };
    write_corpus(&name(src_path)?, corpus.iter().map(|row| &row.source), false)?;
    write_corpus(&name(trg_path)?, corpus.iter().map(|row| &row.target), false)?;
    Ok(corpus.len())
}

/// `*.txt` files of `trg_dir`, except the source and reference files.
pub fn target_paths(trg_dir: &Path, src_path: &Path, vref_path: &Path) -> Result<Vec<PathBuf>, Error> {
    let pattern = trg_dir.join("*.txt");
    let mut paths = Vec::new();
    for path in glob::glob(&pattern.to_string_lossy())? {
        let path = path?;
        if path.file_name() == src_path.file_name() || path.file_name() == vref_path.file_name() {
            continue;
        }
        paths.push(path);
    }
    Ok(paths)
}

/// Synchronise `src_path` with every target, on half of the available cores.
///
/// A failing target is logged and reported, other targets are still processed.
pub fn bulk_sync(
    vref_path: &Path,
    src_path: &Path,
    trg_paths: &[PathBuf],
    out_dir: &Path,
) -> Result<SyncReport, Error> {
    let src_dir = out_dir.join(file_stem(src_path)?);
    std::fs::create_dir_all(&src_dir)?;

    let num_threads = std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| Error::Custom(e.to_string()))?;
    info!("synchronising {} targets on {} threads", trg_paths.len(), num_threads);

    let statuses: Vec<SyncStatus> = pool.install(|| {
        trg_paths
            .par_iter()
            .map(|trg_path| {
                let dst_dir = match file_stem(trg_path) {
                    Ok(stem) => src_dir.join(stem),
                    Err(e) => {
                        error!("{}", e);
                        return SyncStatus::Failed;
                    }
                };
                if dst_dir.join(SCORES_FILE).exists() {
                    info!("already aligned: {:?}", trg_path);
                    return SyncStatus::Skipped;
                }
                match sync_corpus(vref_path, src_path, trg_path, &dst_dir) {
                    Ok(nb_rows) => {
                        info!("synchronised {:?} ({} rows)", trg_path, nb_rows);
                        SyncStatus::Synced
                    }
                    Err(e) => {
                        error!("could not synchronise {:?}: {}", trg_path, e);
                        SyncStatus::Failed
                    }
                }
            })
            .collect()
    });

    let mut report = SyncReport::default();
    for (trg_path, status) in trg_paths.iter().zip(statuses) {
        let paths = match status {
            SyncStatus::Synced => &mut report.synced,
            SyncStatus::Skipped => &mut report.skipped,
            SyncStatus::Failed => &mut report.failed,
        };
        paths.push(trg_path.clone());
    }
    Ok(report)
}
