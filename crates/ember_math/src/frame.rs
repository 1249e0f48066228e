//! Orthonormal frames around a surface normal.

use crate::Vec3;

/// Build a tangent/bitangent pair orthogonal to a unit normal.
///
/// Branchless construction from Duff et al., "Building an Orthonormal
/// Basis, Revisited" (2017). Stable for every unit `n`, including the poles.
pub fn build_orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let sign = 1.0_f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);

    (tangent, bitangent)
}

/// Rotate a direction expressed in the local frame (z = normal) into world space.
#[inline]
pub fn to_world(local: Vec3, n: Vec3) -> Vec3 {
    let (tangent, bitangent) = build_orthonormal_basis(n);
    local.x * tangent + local.y * bitangent + local.z * n
}
