use std::path::{Path, PathBuf};

use crate::shared::gray_image::GrayImage;

/// Persists the most recent normalized face to a fixed well-known path.
///
/// Purely diagnostic: the file is overwritten on every successful
/// normalization and never read back by the pipeline.
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, face: &GrayImage) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let img = image::GrayImage::from_raw(
            face.width() as u32,
            face.height() as u32,
            face.packed().into_owned(),
        )
        .ok_or("face buffer does not match its dimensions")?;
        img.save(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(shade: u8) -> GrayImage {
        let mut img = GrayImage::new(20, 15);
        for y in 0..15 {
            img.row_mut(y).fill(shade);
        }
        img
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("last_face.png"));
        writer.write(&face(128)).unwrap();
        assert!(writer.path().exists());
    }

    #[test]
    fn test_write_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("last_face.png"));
        writer.write(&face(10)).unwrap();
        writer.write(&face(240)).unwrap();

        let saved = image::open(writer.path()).unwrap().to_luma8();
        assert_eq!(saved.get_pixel(0, 0).0, [240]);
    }

    #[test]
    fn test_write_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("diag/faces/last.png"));
        writer.write(&face(100)).unwrap();
        assert!(writer.path().exists());
    }
}
