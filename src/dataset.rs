use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
pub const GROUND_TRUTH_EXTENSION: &str = "txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    /// File name including extension, e.g. `receipt_01.png`.
    pub name: String,
    /// File name without extension, used to pair ground truth and outputs.
    pub stem: String,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<ImageEntry>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read image directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let (Some(name), Some(stem)) = (
            path.file_name().and_then(|n| n.to_str()),
            path.file_stem().and_then(|s| s.to_str()),
        ) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        images.push(ImageEntry {
            name: name.to_string(),
            stem: stem.to_string(),
            path,
        });
    }

    images.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(images)
}

pub fn ground_truth_path(gt_dir: &Path, image: &ImageEntry) -> PathBuf {
    gt_dir.join(format!("{}.{}", image.stem, GROUND_TRUTH_EXTENSION))
}

/// Reads a ground-truth file with trailing whitespace removed.
pub fn read_ground_truth(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read ground truth {}", path.display()))?;
    Ok(raw.trim_end().to_string())
}

pub fn raw_output_path(results_dir: &Path, image: &ImageEntry, engine: &str) -> PathBuf {
    results_dir.join(format!("{}__{}.txt", image.stem, engine))
}
