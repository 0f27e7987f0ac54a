use serde::Serialize;

use crate::record::{GeoPoint, PhotoRecord};
use crate::sidecar::SidecarRecord;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters (haversine on a spherical Earth).
///
/// Good to about 0.5%, which is plenty for clustering map markers. Inputs are
/// decimal degrees and are not range-checked.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

impl GeoPoint {
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Where a photo was taken: the record's own coordinates, else the sidecar's.
pub fn photo_location(photo: &PhotoRecord, sidecar: Option<&SidecarRecord>) -> Option<GeoPoint> {
    photo
        .location()
        .filter(GeoPoint::has_position)
        .or_else(|| sidecar.and_then(SidecarRecord::location))
}

/// A group of nearby points for one map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCluster {
    /// First point of the cluster; membership is measured against it.
    pub anchor: GeoPoint,
    /// Mean position of all members.
    pub center: GeoPoint,
    /// Indices into the clustered slice, in input order.
    pub members: Vec<usize>,
}

/// Greedy single-pass clustering.
///
/// Each point joins the first existing cluster whose anchor lies within
/// `radius_m`, or opens a new cluster anchored on itself.
pub fn cluster_points(points: &[GeoPoint], radius_m: f64) -> Vec<GeoCluster> {
    let mut clusters: Vec<GeoCluster> = Vec::new();

    for (i, point) in points.iter().enumerate() {
        match clusters.iter_mut().find(|c| c.anchor.distance_to(point) <= radius_m) {
            Some(cluster) => cluster.members.push(i),
            None => clusters.push(GeoCluster {
                anchor: *point,
                center: *point,
                members: vec![i],
            }),
        }
    }

    for cluster in &mut clusters {
        let n = cluster.members.len() as f64;
        let (lat, lon) = cluster.members.iter().fold((0.0, 0.0), |(lat, lon), &i| {
            (lat + points[i].latitude, lon + points[i].longitude)
        });
        cluster.center = GeoPoint::new(lat / n, lon / n);
    }

    clusters
}
