use std::path::{Path, PathBuf};

use crate::recognition::domain::face_classifier::TrainingError;
use crate::recognition::domain::label_table::{label_from_filename, LabelTable};
use crate::recognition::domain::training_set::TrainingSet;
use crate::shared::constants::{
    CANONICAL_FACE_HEIGHT, CANONICAL_FACE_WIDTH, GALLERY_EXTENSIONS,
};
use crate::shared::gray_image::GrayImage;

/// Reads a labeled image gallery into a fresh label table and training
/// set.
///
/// Files are visited in sorted filename order so that label id
/// assignment is deterministic across platforms, not at the mercy of
/// directory iteration order. Every image is converted to grayscale and
/// rescaled to the canonical classification size.
pub fn load_gallery(dir: &Path) -> Result<(LabelTable, TrainingSet), TrainingError> {
    let mut paths = gallery_paths(dir)?;
    if paths.is_empty() {
        return Err(TrainingError::EmptyGallery {
            path: dir.to_path_buf(),
        });
    }
    paths.sort();

    let mut table = LabelTable::new();
    let mut set = TrainingSet::new();
    for path in paths {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = label_from_filename(&file_name).ok_or_else(|| {
            TrainingError::UnlabeledImage {
                name: file_name.clone(),
            }
        })?;
        let id = table.intern(label);

        let decoded = image::open(&path).map_err(|source| TrainingError::ImageRead {
            path: path.clone(),
            source,
        })?;
        let gray = image::imageops::resize(
            &decoded.to_luma8(),
            CANONICAL_FACE_WIDTH,
            CANONICAL_FACE_HEIGHT,
            image::imageops::FilterType::Triangle,
        );
        set.push(
            GrayImage::from_packed(
                gray.into_raw(),
                CANONICAL_FACE_WIDTH as usize,
                CANONICAL_FACE_HEIGHT as usize,
            ),
            id,
        );
        log::debug!("gallery image {file_name} -> label {label} (id {id})");
    }

    Ok((table, set))
}

fn gallery_paths(dir: &Path) -> Result<Vec<PathBuf>, TrainingError> {
    let gallery_err = |source| TrainingError::GalleryRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(gallery_err)? {
        let path = entry.map_err(gallery_err)?.path();
        if path.is_file() && has_gallery_extension(&path) {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn has_gallery_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| GALLERY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_gallery_image(dir: &Path, name: &str, shade: u8) {
        let mut img = image::GrayImage::new(32, 32);
        for (i, pixel) in img.pixels_mut().enumerate() {
            // Per-image shade plus a gradient so images are not uniform
            *pixel = image::Luma([shade.saturating_add((i % 64) as u8)]);
        }
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_labels_assigned_first_seen_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery_image(dir.path(), "alice-1.jpg", 10);
        write_gallery_image(dir.path(), "bob-1.jpg", 120);
        write_gallery_image(dir.path(), "alice-2.jpg", 20);

        let (table, set) = load_gallery(dir.path()).unwrap();
        assert_eq!(table.len(), 3); // unknown + alice + bob
        assert_eq!(table.id_of("unknown"), Some(-1));
        assert_eq!(table.id_of("alice"), Some(1));
        assert_eq!(table.id_of("bob"), Some(2));
        // Sorted order: alice-1, alice-2, bob-1
        assert_eq!(set.labels(), &[1, 1, 2]);
    }

    #[test]
    fn test_images_rescaled_to_canonical_size() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery_image(dir.path(), "carol-1.png", 77);

        let (_, set) = load_gallery(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.images()[0].width(), CANONICAL_FACE_WIDTH as usize);
        assert_eq!(set.images()[0].height(), CANONICAL_FACE_HEIGHT as usize);
    }

    #[test]
    fn test_empty_directory_is_a_training_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_gallery(dir.path()).unwrap_err();
        assert!(matches!(err, TrainingError::EmptyGallery { .. }));
    }

    #[test]
    fn test_missing_directory_is_a_training_failure() {
        let err = load_gallery(Path::new("/nonexistent/gallery")).unwrap_err();
        assert!(matches!(err, TrainingError::GalleryRead { .. }));
    }

    #[test]
    fn test_unlabeled_file_is_a_training_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery_image(dir.path(), "nodelimiter.jpg", 50);
        let err = load_gallery(dir.path()).unwrap_err();
        assert!(matches!(err, TrainingError::UnlabeledImage { .. }));
    }

    #[test]
    fn test_non_image_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery_image(dir.path(), "dave-1.jpg", 90);
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let (table, set) = load_gallery(dir.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(table.id_of("dave"), Some(1));
    }

    #[test]
    fn test_corrupt_image_is_a_training_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eve-1.jpg"), b"not a jpeg").unwrap();
        let err = load_gallery(dir.path()).unwrap_err();
        assert!(matches!(err, TrainingError::ImageRead { .. }));
    }
}
