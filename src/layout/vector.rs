use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Two-component `f64` vector used for graph-space and device-space math.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

pub const fn vector(x: f64, y: f64) -> Vector {
    Vector { x, y }
}

impl Vector {
    pub const ZERO: Self = vector(0.0, 0.0);

    pub fn length_sq(self) -> f64 {
        (self.x * self.x) + (self.y * self.y)
    }

    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit vector, or `None` when the length is zero or not finite.
    pub fn normalized(self) -> Option<Self> {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Some(self / length)
        } else {
            None
        }
    }

    /// Component-wise product.
    pub fn scale(self, factor: Self) -> Self {
        vector(self.x * factor.x, self.y * factor.y)
    }

    /// Component-wise quotient.
    pub fn unscale(self, divisor: Self) -> Self {
        vector(self.x / divisor.x, self.y / divisor.y)
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        vector(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        vector(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        vector(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vector {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vector {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        vector(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        vector(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_rejects_zero_and_non_finite() {
        assert_eq!(Vector::ZERO.normalized(), None);
        assert_eq!(vector(f64::NAN, 1.0).normalized(), None);

        let unit = vector(3.0, 4.0).normalized().unwrap();
        assert!((unit.length() - 1.0).abs() < 1e-12);
        assert!((unit.x - 0.6).abs() < 1e-12);
    }

    #[test]
    fn component_wise_scaling_round_trips() {
        let value = vector(12.0, -3.0);
        let factor = vector(0.5, 4.0);
        assert_eq!(value.scale(factor), vector(6.0, -12.0));
        assert_eq!(value.scale(factor).unscale(factor), value);
    }
}
