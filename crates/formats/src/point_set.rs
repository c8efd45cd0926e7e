use foundation::bounds::Aabb3;
use foundation::math::Vec3;

/// An ordered set of 3D points with its tight bounding box.
///
/// The box is maintained while points are pushed, so building a `PointSet` is
/// a single pass over the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Vec3>,
    bounds: Aabb3,
}

impl Default for PointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSet {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            bounds: Aabb3::empty(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            bounds: Aabb3::empty(),
        }
    }

    pub fn from_points(points: Vec<Vec3>) -> Self {
        let bounds = Aabb3::from_points(points.iter());
        Self { points, bounds }
    }

    pub fn push(&mut self, p: Vec3) {
        self.bounds.expand(p);
        self.points.push(p);
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// `None` for an empty set.
    pub fn bounding_box(&self) -> Option<Aabb3> {
        if self.bounds.is_empty() {
            None
        } else {
            Some(self.bounds)
        }
    }

    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.bounding_box().map(|b| (b.min.z, b.max.z))
    }

    pub fn into_points(self) -> Vec<Vec3> {
        self.points
    }
}

impl FromIterator<Vec3> for PointSet {
    fn from_iter<I: IntoIterator<Item = Vec3>>(iter: I) -> Self {
        let mut set = PointSet::new();
        for p in iter {
            set.push(p);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::PointSet;
    use foundation::math::Vec3;

    #[test]
    fn empty_set_has_no_bounds() {
        let set = PointSet::new();
        assert_eq!(set.count(), 0);
        assert!(set.bounding_box().is_none());
        assert!(set.z_range().is_none());
    }

    #[test]
    fn push_keeps_count_and_bounds_in_sync() {
        let set: PointSet = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, -1.0, 5.0),
            Vec3::new(1.0, 3.0, -2.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.count(), set.points().len());
        let b = set.bounding_box().expect("bounds");
        assert_eq!(b.min, Vec3::new(0.0, -1.0, -2.0));
        assert_eq!(b.max, Vec3::new(2.0, 3.0, 5.0));
        assert_eq!(set.z_range(), Some((-2.0, 5.0)));
        assert_eq!(PointSet::from_points(set.points().to_vec()), set);
    }
}
