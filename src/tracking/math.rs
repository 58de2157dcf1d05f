//! Minimal vector/quaternion math for gaze derivation.
//!
//! Only what the deriver needs: building a rotation from an X/Y gaze offset
//! and spherically interpolating two rotations. Quaternions are stored as
//! `[w, x, y, z]`.

/// 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// X component (rightward).
    pub x: f32,
    /// Y component (upward).
    pub y: f32,
    /// Z component (forward).
    pub z: f32,
}

impl Vec3 {
    /// All-zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Construct from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. NaN and zero-length inputs propagate as NaN, which
    /// downstream validity checks absorb.
    #[must_use]
    pub fn normalized(self) -> Self {
        let inv = 1.0 / self.length();
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

/// Rotation quaternion `[w, x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    /// Scalar part.
    pub w: f32,
    /// X vector part.
    pub x: f32,
    /// Y vector part.
    pub y: f32,
    /// Z vector part.
    pub z: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Unit-length copy.
    #[must_use]
    pub fn normalized(self) -> Self {
        let inv = 1.0 / self.dot(self).sqrt();
        Self {
            w: self.w * inv,
            x: self.x * inv,
            y: self.y * inv,
            z: self.z * inv,
        }
    }

    /// Four-component dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Whether every component is a finite number.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Rotation taking the forward (+Z) axis onto `dir`.
    #[must_use]
    pub fn from_rotation_arc_z(dir: Vec3) -> Self {
        let forward = Vec3::new(0.0, 0.0, 1.0);
        let alignment = forward.dot(dir);
        if alignment < -0.999_99 {
            // Antiparallel: any axis perpendicular to forward works.
            return Self {
                w: 0.0,
                x: 0.0,
                y: 1.0,
                z: 0.0,
            };
        }
        let axis = forward.cross(dir);
        Self {
            w: 1.0 + alignment,
            x: axis.x,
            y: axis.y,
            z: axis.z,
        }
        .normalized()
    }

    /// Gaze rotation from normalized X (right) / Y (up) offsets, assuming a
    /// unit forward component.
    #[must_use]
    pub fn from_gaze(x: f32, y: f32) -> Self {
        Self::from_rotation_arc_z(Vec3::new(x, y, 1.0).normalized())
    }

    /// Spherical interpolation between two rotations.
    #[must_use]
    pub fn slerp(a: Self, b: Self, t: f32) -> Self {
        let mut b = b;
        let mut cos_theta = a.dot(b);
        // Take the short arc.
        if cos_theta < 0.0 {
            b = Self {
                w: -b.w,
                x: -b.x,
                y: -b.y,
                z: -b.z,
            };
            cos_theta = -cos_theta;
        }
        // Nearly parallel: fall back to a normalized lerp.
        if cos_theta > 0.9995 {
            return Self {
                w: a.w + t * (b.w - a.w),
                x: a.x + t * (b.x - a.x),
                y: a.y + t * (b.y - a.y),
                z: a.z + t * (b.z - a.z),
            }
            .normalized();
        }
        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let inv_sin = 1.0 / theta.sin();
        let wa = ((1.0 - t) * theta).sin() * inv_sin;
        let wb = (t * theta).sin() * inv_sin;
        Self {
            w: a.w * wa + b.w * wb,
            x: a.x * wa + b.x * wb,
            y: a.y * wa + b.y * wb,
            z: a.z * wa + b.z * wb,
        }
    }
}
