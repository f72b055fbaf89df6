use glam::Vec3;
use rand::Rng;
use thiserror::Error;

/// Vertex positions of one mesh, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud(Vec<Vec3>);

impl PointCloud {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self(positions)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Vec3>> for PointCloud {
    fn from(positions: Vec<Vec3>) -> Self {
        Self(positions)
    }
}

/// A point cloud padded to the particle count shared by every morph target.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPointSet(Vec<Vec3>);

impl NormalizedPointSet {
    pub fn positions(&self) -> &[Vec3] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no point clouds to normalize")]
    NoClouds,
    #[error("every point cloud is empty")]
    AllEmpty,
    #[error("point cloud {index} is empty and cannot be padded to {max_count} points")]
    EmptyCloud { index: usize, max_count: usize },
}

/// Pads every cloud to the size of the largest one.
///
/// Slot `j` of a cloud with `n` points keeps point `j` when `j < n`; the
/// remaining slots repeat points picked uniformly at random from the same
/// cloud, so two calls with the same input generally pad differently.
pub fn normalize(
    clouds: &[PointCloud],
    rng: &mut impl Rng,
) -> Result<Vec<NormalizedPointSet>, NormalizeError> {
    let max_count = clouds
        .iter()
        .map(PointCloud::len)
        .max()
        .ok_or(NormalizeError::NoClouds)?;
    if max_count == 0 {
        return Err(NormalizeError::AllEmpty);
    }

    clouds
        .iter()
        .enumerate()
        .map(|(index, cloud)| {
            if cloud.is_empty() {
                return Err(NormalizeError::EmptyCloud { index, max_count });
            }
            let source = cloud.positions();
            let padding =
                (source.len()..max_count).map(|_| source[rng.gen_range(0..source.len())]);
            let positions = source.iter().copied().chain(padding).collect();
            Ok(NormalizedPointSet(positions))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use glam::vec3;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn cloud(count: usize, offset: f32) -> PointCloud {
        (0..count)
            .map(|i| vec3(offset + i as f32, -(i as f32), i as f32 * 0.5))
            .collect::<Vec<_>>()
            .into()
    }

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(0x5eed)
    }

    #[test]
    fn every_set_has_the_largest_count() {
        let clouds = [cloud(3, 0.), cloud(17, 100.), cloud(1, 200.), cloud(17, 300.)];
        let sets = normalize(&clouds, &mut rng()).unwrap();
        assert_eq!(sets.len(), clouds.len());
        assert!(sets.iter().all(|set| set.len() == 17));
    }

    #[test]
    fn real_geometry_is_kept_in_place() {
        let clouds = [cloud(5, 0.), cloud(40, 10.)];
        let sets = normalize(&clouds, &mut rng()).unwrap();
        for (cloud, set) in clouds.iter().zip(&sets) {
            assert_eq!(&set.positions()[..cloud.len()], cloud.positions());
        }
    }

    #[test]
    fn zero_coordinates_are_real_geometry() {
        let clouds = [
            PointCloud::new(vec![Vec3::ZERO, vec3(0., 1., 0.)]),
            cloud(6, 5.),
        ];
        let sets = normalize(&clouds, &mut rng()).unwrap();
        assert_eq!(sets[0].positions()[0], Vec3::ZERO);
        assert_eq!(sets[0].positions()[1], vec3(0., 1., 0.));
    }

    #[test]
    fn padding_repeats_original_points() {
        let clouds = [cloud(4, 0.), cloud(64, 50.)];
        let sets = normalize(&clouds, &mut rng()).unwrap();
        let small = clouds[0].positions();
        assert!(sets[0].positions()[4..].iter().all(|p| small.contains(p)));
    }

    #[test]
    fn padding_varies_between_calls() {
        let clouds = [cloud(8, 0.), cloud(512, 50.)];
        let mut rng = rng();
        let first = normalize(&clouds, &mut rng).unwrap();
        let second = normalize(&clouds, &mut rng).unwrap();
        assert_ne!(first[0], second[0]);
        assert_eq!(first[1], second[1]);
    }

    #[test]
    fn single_point_cloud_is_replicated() {
        let clouds = [PointCloud::new(vec![vec3(1., 2., 3.)]), cloud(9, 0.)];
        let sets = normalize(&clouds, &mut rng()).unwrap();
        assert!(sets[0].positions().iter().all(|p| *p == vec3(1., 2., 3.)));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(normalize(&[], &mut rng()), Err(NormalizeError::NoClouds));
        assert_eq!(
            normalize(&[PointCloud::default(), PointCloud::default()], &mut rng()),
            Err(NormalizeError::AllEmpty)
        );
        assert_eq!(
            normalize(&[cloud(3, 0.), PointCloud::default()], &mut rng()),
            Err(NormalizeError::EmptyCloud {
                index: 1,
                max_count: 3
            })
        );
    }
}
