use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of a model in its own (untransformed) coordinates.
/// Used to recentre the model and to frame the camera around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = Vec3::from_array(*points.next()?);
        let (min, max) = points.fold((first, first), |(min, max), p| {
            let p = Vec3::from_array(*p);
            (min.min(p), max.max(p))
        });
        Some(Self { min, max })
    }

    pub fn union(&self, other: &ModelBounds) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Center point used as the camera look-at and orbit target.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent along any axis; drives the framing distance.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_points() {
        let points = [[0.0, 2.0, -1.0], [1.0, -3.0, 4.0], [0.5, 0.0, 0.0]];
        let bounds = ModelBounds::from_points(points.iter()).unwrap();

        assert_eq!(bounds.min, Vec3::new(0.0, -3.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(bounds.max_dimension(), 5.0);
    }

    #[test]
    fn empty_point_set_has_no_bounds() {
        let points: [[f32; 3]; 0] = [];
        assert!(ModelBounds::from_points(points.iter()).is_none());
    }

    #[test]
    fn translating_by_negated_center_recentres() {
        let cube = ModelBounds {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        let centred = cube.translated(-cube.center());

        assert_eq!(centred.center(), Vec3::ZERO);
        assert_eq!(centred.size(), Vec3::ONE);
    }
}
