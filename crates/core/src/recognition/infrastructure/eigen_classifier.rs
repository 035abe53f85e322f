use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};

use crate::recognition::domain::face_classifier::{FaceClassifier, Prediction, TrainingError};
use crate::recognition::domain::training_set::TrainingSet;
use crate::shared::gray_image::GrayImage;

/// Upper bound on the subspace dimension; galleries are small, so a
/// handful of components captures the variation that matters.
const MAX_COMPONENTS: usize = 16;

/// Eigenvalues below this fraction of the largest are treated as noise.
const EIGENVALUE_FLOOR: f64 = 1e-10;

const JACOBI_MAX_SWEEPS: usize = 50;
const JACOBI_TOLERANCE: f64 = 1e-12;

/// Gallery-trained face classifier over an eigen subspace.
///
/// Training fits a PCA basis via the snapshot method (eigendecomposition
/// of the small image-by-image Gram matrix rather than the huge
/// pixel-by-pixel covariance) and stores one centroid per identity in
/// the subspace.
///
/// The prediction distance combines the in-subspace offset from the
/// nearest centroid with the reconstruction residual. The residual term
/// is what rejects off-manifold inputs: a noise image can project close
/// to a centroid while lying nowhere near the face subspace.
pub struct EigenFaceClassifier {
    threshold: f64,
    model: Option<EigenModel>,
}

struct EigenModel {
    dim: usize,
    mean: Array1<f64>,
    /// `k x d`, rows orthonormal.
    components: Array2<f64>,
    /// Per-identity centroid in the `k`-dim subspace, sorted by label.
    centroids: Vec<(i32, Array1<f64>)>,
}

impl EigenFaceClassifier {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            model: None,
        }
    }

    fn fit(set: &TrainingSet) -> Result<EigenModel, TrainingError> {
        if set.is_empty() {
            return Err(TrainingError::NoTrainingImages);
        }

        let first = &set.images()[0];
        let (width, height) = (first.width(), first.height());
        let dim = width * height;
        for (index, img) in set.images().iter().enumerate() {
            if img.width() != width || img.height() != height {
                return Err(TrainingError::InconsistentDimensions {
                    index,
                    expected_w: width,
                    expected_h: height,
                    actual_w: img.width(),
                    actual_h: img.height(),
                });
            }
        }

        let n = set.len();
        let mut samples = Array2::<f64>::zeros((n, dim));
        for (i, img) in set.images().iter().enumerate() {
            for (value, pixel) in samples.row_mut(i).iter_mut().zip(img.packed().iter()) {
                *value = *pixel as f64;
            }
        }

        let mean = samples
            .mean_axis(Axis(0))
            .expect("training set is non-empty");
        let centered = &samples - &mean;

        // Snapshot method: eigenvectors of the n x n Gram matrix lift to
        // eigenfaces of the d x d covariance.
        let gram = centered.dot(&centered.t());
        let (eigenvalues, eigenvectors) = symmetric_eigen(gram);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let largest = eigenvalues[order[0]];
        if largest <= 0.0 {
            return Err(TrainingError::DegenerateGallery);
        }
        let floor = largest * EIGENVALUE_FLOOR;
        let k = order
            .iter()
            .take(n.saturating_sub(1).max(1).min(MAX_COMPONENTS))
            .take_while(|&&j| eigenvalues[j] > floor)
            .count();
        if k == 0 {
            return Err(TrainingError::DegenerateGallery);
        }

        let mut components = Array2::<f64>::zeros((k, dim));
        for (row, &j) in order[..k].iter().enumerate() {
            let lifted = centered.t().dot(&eigenvectors.column(j));
            let norm = lifted.dot(&lifted).sqrt();
            components
                .row_mut(row)
                .assign(&lifted.mapv(|v| v / norm));
        }

        let mut sums: BTreeMap<i32, (Array1<f64>, usize)> = BTreeMap::new();
        for (i, &label) in set.labels().iter().enumerate() {
            let projection = components.dot(&centered.row(i));
            let entry = sums
                .entry(label)
                .or_insert_with(|| (Array1::zeros(k), 0));
            entry.0 += &projection;
            entry.1 += 1;
        }
        let centroids = sums
            .into_iter()
            .map(|(label, (sum, count))| (label, sum / count as f64))
            .collect();

        Ok(EigenModel {
            dim,
            mean,
            components,
            centroids,
        })
    }
}

impl FaceClassifier for EigenFaceClassifier {
    fn train(&mut self, set: &TrainingSet) -> Result<(), TrainingError> {
        // Replaced wholesale: a failed fit leaves no model at all, so a
        // stale model can never answer for a new gallery.
        self.model = None;
        self.model = Some(Self::fit(set)?);
        log::info!(
            "trained eigen classifier on {} images, {} identities",
            set.len(),
            self.model.as_ref().map_or(0, |m| m.centroids.len())
        );
        Ok(())
    }

    fn predict(&self, face: &GrayImage) -> Prediction {
        let Some(model) = &self.model else {
            return Prediction::Unavailable;
        };

        let pixels = face.packed();
        if pixels.len() != model.dim {
            // The normalizer guarantees canonical input on every real
            // path; anything else is a malformed face that matches nobody.
            log::warn!(
                "face has {} pixels, model expects {}",
                pixels.len(),
                model.dim
            );
            return Prediction::Unknown;
        }

        let centered =
            Array1::from_iter(pixels.iter().map(|&p| p as f64)) - &model.mean;
        let projection = model.components.dot(&centered);
        let reconstruction = model.components.t().dot(&projection);
        let residual_sq = {
            let off_subspace = &centered - &reconstruction;
            off_subspace.dot(&off_subspace)
        };

        let (label, in_space_sq) = model
            .centroids
            .iter()
            .map(|(label, centroid)| {
                let delta = &projection - centroid;
                (*label, delta.dot(&delta))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .expect("a fitted model has at least one centroid");

        let distance = (in_space_sq + residual_sq).sqrt();
        if distance > self.threshold {
            Prediction::Unknown
        } else {
            Prediction::Match { label, distance }
        }
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn reset(&mut self) {
        self.model = None;
    }
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns `(eigenvalues, eigenvectors)` with eigenvectors in columns.
/// The Gram matrices decomposed here are tiny (one row per training
/// image), so the quadratic sweeps are immaterial.
fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);
    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off_diagonal: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        if off_diagonal.sqrt() <= JACOBI_TOLERANCE * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= JACOBI_TOLERANCE * scale {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::REJECTION_THRESHOLD;
    use approx::assert_relative_eq;

    const W: usize = 60;
    const H: usize = 40;

    fn image_from(f: impl Fn(usize, usize) -> u8) -> GrayImage {
        let mut img = GrayImage::new(W, H);
        for y in 0..H {
            for x in 0..W {
                img.set_pixel(x, y, f(x, y));
            }
        }
        img
    }

    fn horizontal_gradient(offset: u8) -> GrayImage {
        image_from(|x, _| ((x * 255 / (W - 1)) as u8).saturating_add(offset))
    }

    fn vertical_gradient(offset: u8) -> GrayImage {
        image_from(|_, y| ((y * 255 / (H - 1)) as u8).saturating_add(offset))
    }

    fn noise() -> GrayImage {
        image_from(|x, y| if (x * 31 + y * 17) % 2 == 0 { 255 } else { 0 })
    }

    fn two_identity_set() -> TrainingSet {
        let mut set = TrainingSet::new();
        set.push(horizontal_gradient(0), 1);
        set.push(horizontal_gradient(12), 1);
        set.push(vertical_gradient(0), 2);
        set.push(vertical_gradient(12), 2);
        set
    }

    #[test]
    fn test_untrained_predicts_unavailable() {
        let classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        assert!(!classifier.is_trained());
        assert_eq!(classifier.predict(&noise()), Prediction::Unavailable);
    }

    #[test]
    fn test_training_image_matches_its_identity() {
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        classifier.train(&two_identity_set()).unwrap();

        match classifier.predict(&horizontal_gradient(0)) {
            Prediction::Match { label, distance } => {
                assert_eq!(label, 1);
                assert!(distance <= REJECTION_THRESHOLD);
            }
            other => panic!("expected a match, got {other:?}"),
        }
        match classifier.predict(&vertical_gradient(12)) {
            Prediction::Match { label, .. } => assert_eq!(label, 2),
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn test_noise_is_rejected_as_unknown() {
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        let mut set = TrainingSet::new();
        set.push(horizontal_gradient(0), 1);
        set.push(horizontal_gradient(10), 1);
        set.push(horizontal_gradient(20), 1);
        classifier.train(&set).unwrap();

        assert_eq!(classifier.predict(&noise()), Prediction::Unknown);
    }

    #[test]
    fn test_empty_set_fails_training() {
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        let err = classifier.train(&TrainingSet::new()).unwrap_err();
        assert!(matches!(err, TrainingError::NoTrainingImages));
        assert!(!classifier.is_trained());
    }

    #[test]
    fn test_mixed_dimensions_fail_training() {
        let mut set = TrainingSet::new();
        set.push(GrayImage::new(W, H), 1);
        set.push(GrayImage::new(W / 2, H), 1);
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        let err = classifier.train(&set).unwrap_err();
        assert!(matches!(err, TrainingError::InconsistentDimensions { index: 1, .. }));
    }

    #[test]
    fn test_identical_images_are_degenerate() {
        let mut set = TrainingSet::new();
        set.push(horizontal_gradient(0), 1);
        set.push(horizontal_gradient(0), 1);
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        let err = classifier.train(&set).unwrap_err();
        assert!(matches!(err, TrainingError::DegenerateGallery));
    }

    #[test]
    fn test_failed_retrain_clears_previous_model() {
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        classifier.train(&two_identity_set()).unwrap();
        assert!(classifier.is_trained());

        let _ = classifier.train(&TrainingSet::new());
        assert!(!classifier.is_trained());
        assert_eq!(
            classifier.predict(&horizontal_gradient(0)),
            Prediction::Unavailable
        );
    }

    // ── Jacobi eigensolver ───────────────────────────────────────────

    #[test]
    fn test_symmetric_eigen_recovers_diagonal() {
        let m = Array2::from_diag(&ndarray::arr1(&[3.0, 1.0, 2.0]));
        let (values, _) = symmetric_eigen(m);
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        assert_relative_eq!(sorted[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(sorted[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(sorted[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_symmetric_eigen_known_2x2() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3
        let m = ndarray::arr2(&[[2.0, 1.0], [1.0, 2.0]]);
        let (values, vectors) = symmetric_eigen(m.clone());
        for j in 0..2 {
            let v = vectors.column(j).to_owned();
            let mv = m.dot(&v);
            // M v = lambda v
            for k in 0..2 {
                assert_relative_eq!(mv[k], values[j] * v[k], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_components_are_orthonormal() {
        let mut classifier = EigenFaceClassifier::new(REJECTION_THRESHOLD);
        classifier.train(&two_identity_set()).unwrap();
        let model = classifier.model.as_ref().unwrap();
        let k = model.components.nrows();
        for i in 0..k {
            for j in 0..k {
                let dot = model.components.row(i).dot(&model.components.row(j));
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(dot, expected, epsilon = 1e-6);
            }
        }
    }
}
