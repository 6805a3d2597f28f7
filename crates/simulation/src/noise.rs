//! 3D simplex gradient noise and fractional Brownian motion.
//!
//! CPU reference for the kernel compiled into the fog shader
//! (`rendering/src/shaders/simplex_noise.wgsl`). Both evaluate the
//! textureless simplex noise of McEwan/Gustavson (Ashima Arts, MIT licensed):
//! a mod-289 permutation polynomial, a 7x7 gradient ring mapped onto an
//! octahedron, and a `max(0.5 - r², 0)^4` radial falloff scaled by 105.
//!
//! Everything is computed in `f32` so results track the GPU closely.

use bevy::math::{Vec3, Vec4};

/// Octaves summed by the fog's fBm unless configured otherwise.
pub const DEFAULT_OCTAVES: u32 = 6;

/// Upper bound accepted for the octave count.
pub const MAX_OCTAVES: u32 = 8;

const SKEW: f32 = 1.0 / 3.0;
const UNSKEW: f32 = 1.0 / 6.0;
const FALLOFF_RADIUS_SQ: f32 = 0.5;
const OUTPUT_SCALE: f32 = 105.0;

// =============================================================================
// Lattice helpers
// =============================================================================

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

#[inline]
fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

/// Component-wise `x < edge ? 0 : 1`.
#[inline]
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

#[inline]
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

// =============================================================================
// Noise
// =============================================================================

/// Simplex noise at `v`, in [-1, 1].
///
/// Deterministic and continuous. Non-finite input returns 0.0 instead of
/// propagating NaN into the fog.
pub fn snoise3(v: Vec3) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }

    // First corner
    let i = (v + Vec3::splat(v.dot(Vec3::splat(SKEW)))).floor();
    let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(UNSKEW)));

    // Other corners
    let g = step3(Vec3::new(x0.y, x0.z, x0.x), x0);
    let l = Vec3::ONE - g;
    let l_zxy = Vec3::new(l.z, l.x, l.y);
    let i1 = g.min(l_zxy);
    let i2 = g.max(l_zxy);

    let x1 = x0 - i1 + Vec3::splat(UNSKEW);
    let x2 = x0 - i2 + Vec3::splat(SKEW);
    let x3 = x0 - Vec3::splat(0.5);

    // Permutations
    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + Vec4::splat(i.y)
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + Vec4::splat(i.x)
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron.
    let n = 1.0 / 7.0;
    let ns = Vec3::new(2.0 * n, 0.5 * n - 1.0, n);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + Vec4::splat(ns.y);
    let y = y_ * ns.x + Vec4::splat(ns.y);
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);
    let s0 = b0.floor() * 2.0 + Vec4::ONE;
    let s1 = b1.floor() * 2.0 + Vec4::ONE;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = Vec4::new(b0.x, b0.z, b0.y, b0.w)
        + Vec4::new(s0.x, s0.z, s0.y, s0.w) * Vec4::new(sh.x, sh.x, sh.y, sh.y);
    let a1 = Vec4::new(b1.x, b1.z, b1.y, b1.w)
        + Vec4::new(s1.x, s1.z, s1.y, s1.w) * Vec4::new(sh.z, sh.z, sh.w, sh.w);

    let norm = taylor_inv_sqrt(Vec4::new(
        Vec3::new(a0.x, a0.y, h.x).length_squared(),
        Vec3::new(a0.z, a0.w, h.y).length_squared(),
        Vec3::new(a1.x, a1.y, h.z).length_squared(),
        Vec3::new(a1.z, a1.w, h.w).length_squared(),
    ));
    let p0 = Vec3::new(a0.x, a0.y, h.x) * norm.x;
    let p1 = Vec3::new(a0.z, a0.w, h.y) * norm.y;
    let p2 = Vec3::new(a1.x, a1.y, h.z) * norm.z;
    let p3 = Vec3::new(a1.z, a1.w, h.w) * norm.w;

    // Mix final noise value
    let m = (Vec4::splat(FALLOFF_RADIUS_SQ)
        - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
    .max(Vec4::ZERO);
    let m = m * m;
    let value = OUTPUT_SCALE
        * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)));

    value.clamp(-1.0, 1.0)
}

/// Fractional Brownian motion: `octaves` layers of [`snoise3`], starting at
/// amplitude 0.5, doubling the frequency and halving the amplitude each layer.
///
/// The result lies in `±(1 - 2^-octaves)`.
pub fn fbm3(p: Vec3, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut p = p;
    for _ in 0..octaves {
        value += amplitude * snoise3(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    value
}

/// Domain-warped fBm, `fbm(p + fbm(p))`, with the inner scalar added to
/// every component.
pub fn domain_warped_fbm3(p: Vec3, octaves: u32) -> f32 {
    let warp = fbm3(p, octaves);
    fbm3(p + Vec3::splat(warp), octaves)
}
