//! The merge utility: load every run bundle in a directory, merge the
//! ensembles with source-group retention, and render one comparison plot.

use std::fs::read_dir;
use std::path::Path;

use log::{debug, info};

use crate::ensemble::{Ensemble, MergedEnsemble, BUNDLE_EXTENSION};
use crate::error::WhatifError;
use crate::plot::plot_merged;

/// Conventional output path of the combined comparison image.
pub const MERGED_IMAGE: &str = "Merged_image.png";

/// Loads every `.sim` bundle in `directory`, in discovery order. Files
/// with any other extension are skipped silently; that is filtering, not
/// an error. A corrupt bundle fails the whole load, naming the file.
///
/// # Errors
///
/// Returns `IoError` if the directory cannot be read and `DecodeError`
/// for an unreadable bundle.
pub fn load_bundles<P: AsRef<Path>>(directory: P) -> Result<Vec<Ensemble>, WhatifError> {
    let mut ensembles = Vec::new();
    for entry in read_dir(directory.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some(BUNDLE_EXTENSION) {
            debug!("skipping non-bundle file {}", path.display());
            continue;
        }
        info!("loading {}", path.display());
        ensembles.push(Ensemble::load(&path)?);
    }
    Ok(ensembles)
}

/// Merges everything in `directory` and writes the comparison plot to
/// `output`. Returns the merged ensemble.
///
/// # Errors
///
/// Fails when the directory holds no run bundles, when any bundle is
/// unreadable, or when the plot cannot be written.
pub fn merge_and_plot<P: AsRef<Path>, Q: AsRef<Path>>(
    directory: P,
    output: Q,
) -> Result<MergedEnsemble, WhatifError> {
    let ensembles = load_bundles(directory.as_ref())?;
    if ensembles.is_empty() {
        return Err(WhatifError::WhatifError(format!(
            "no run bundles found in '{}'",
            directory.as_ref().display()
        )));
    }

    let merged = Ensemble::merge(ensembles)?;
    plot_merged(&merged, output.as_ref())?;
    info!(
        "merged {} run bundles into {}",
        merged.group_count(),
        output.as_ref().display()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BaseParameters, SimConfig};

    fn saved_ensemble(dir: &Path, label: &str, file: &str) {
        let config = SimConfig::new(
            label,
            BaseParameters {
                pop_size: 300,
                pop_infected: 5,
                start_day: "2025-01-01".to_string(),
                n_days: 10,
                rand_seed: 4,
            },
            vec![],
        );
        let mut ensemble = Ensemble::run(config, 2);
        ensemble.reduce_median();
        ensemble.save(dir.join(file)).unwrap();
    }

    #[test]
    fn merge_preserves_one_group_per_bundle() {
        let dir = tempfile::tempdir().unwrap();
        saved_ensemble(dir.path(), "Baseline", "a.sim");
        saved_ensemble(dir.path(), "Mask (strict)", "b.sim");

        let output = dir.path().join("merged.png");
        let merged = merge_and_plot(dir.path(), &output).unwrap();
        assert_eq!(merged.group_count(), 2);
        assert!(output.exists());

        let mut labels = merged.labels();
        labels.sort_unstable();
        assert_eq!(labels, vec!["Baseline", "Mask (strict)"]);
    }

    #[test]
    fn non_bundle_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        saved_ensemble(dir.path(), "Baseline", "a.sim");
        std::fs::write(dir.path().join("notes.txt"), b"not a bundle").unwrap();
        std::fs::write(dir.path().join("export.csv"), b"day,value\n0,1\n").unwrap();

        let ensembles = load_bundles(dir.path()).unwrap();
        assert_eq!(ensembles.len(), 1);
    }

    #[test]
    fn empty_directory_is_an_explicit_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = merge_and_plot(dir.path(), dir.path().join("merged.png")).unwrap_err();
        assert!(error.to_string().contains("no run bundles found"));
        assert!(!dir.path().join("merged.png").exists());
    }

    #[test]
    fn corrupt_bundle_fails_the_whole_merge() {
        let dir = tempfile::tempdir().unwrap();
        saved_ensemble(dir.path(), "Baseline", "a.sim");
        std::fs::write(dir.path().join("broken.sim"), b"garbage").unwrap();

        let error = merge_and_plot(dir.path(), dir.path().join("merged.png")).unwrap_err();
        assert!(matches!(error, WhatifError::DecodeError { .. }));
        assert!(error.to_string().contains("broken.sim"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let result = load_bundles("no/such/directory");
        assert!(matches!(result, Err(WhatifError::IoError(_))));
    }
}
