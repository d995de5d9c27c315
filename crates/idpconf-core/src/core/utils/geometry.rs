use nalgebra::{Point3, Rotation3, Unit, Vector3};

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

pub fn rotation_about_axis(axis: &Vector3<f64>, angle_radians: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_radians)
}

pub fn rotation_about_z(angle_radians: f64) -> Rotation3<f64> {
    rotation_about_axis(&Vector3::z(), angle_radians)
}

/// Rotates `point` about `pivot` with the given rotation.
pub fn rotate_about_point(
    point: &Point3<f64>,
    pivot: &Point3<f64>,
    rotation: &Rotation3<f64>,
) -> Point3<f64> {
    pivot + rotation * (point - pivot)
}
