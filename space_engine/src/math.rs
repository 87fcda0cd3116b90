use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use glam::{Mat4, Quat, Vec3};

/// Plain `f32` pair used for positions, velocities and sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `radians` from +x.
    pub fn from_angle(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Same direction with length one; vectors shorter than 1e-4 give zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < 1e-4 {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// Radians from +x towards +y, in `-PI..=PI`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    fn extend(self, z: f32) -> Vec3 {
        Vec3::new(self.x, self.y, z)
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Vec2 {
            type Output = Vec2;

            fn $method(self, rhs: Vec2) -> Vec2 {
                Vec2::new(self.x $op rhs.x, self.y $op rhs.y)
            }
        }
    };
}

macro_rules! scalar {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f32> for Vec2 {
            type Output = Vec2;

            fn $method(self, rhs: f32) -> Vec2 {
                Vec2::new(self.x $op rhs, self.y $op rhs)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);
scalar!(Mul, mul, *);
scalar!(Div, div, /);

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        self * -1.0
    }
}

/// Axis-aligned rectangle: top-left corner plus extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Placement of one textured quad in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    /// Quad center.
    pub position: Vec2,
    /// Multiplies the quad's base size.
    pub scale: Vec2,
    /// Clockwise on screen, radians.
    pub rotation: f32,
}

impl Transform2D {
    pub fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Model matrix for a unit quad stretched to `base_size` pixels.
    pub fn model_matrix(&self, base_size: Vec2) -> Mat4 {
        let extent = Vec2::new(self.scale.x * base_size.x, self.scale.y * base_size.y);
        Mat4::from_scale_rotation_translation(
            extent.extend(1.0),
            Quat::from_rotation_z(self.rotation),
            self.position.extend(0.0),
        )
    }
}

/// Follow camera. The world point `target` is drawn at the screen point
/// `offset`, and everything scales by `zoom` around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    pub target: Vec2,
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::screen()
    }
}

impl Camera2D {
    pub fn centered(target: Vec2, screen_width: f32, screen_height: f32) -> Self {
        Self {
            target,
            offset: Vec2::new(screen_width, screen_height) * 0.5,
            zoom: 1.0,
        }
    }

    /// Maps world units one to one onto screen pixels. For overlays.
    pub fn screen() -> Self {
        Self {
            target: Vec2::ZERO,
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.target) * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom + self.target
    }

    /// Clip-space transform for a `width` x `height` surface with y down.
    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        let ortho = Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
        let shift = self.offset - self.target * self.zoom;
        let view = Mat4::from_scale_rotation_translation(
            Vec3::new(self.zoom, self.zoom, 1.0),
            Quat::IDENTITY,
            shift.extend(0.0),
        );
        ortho * view
    }
}
