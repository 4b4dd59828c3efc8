//! Checked operations on `glam::Vec2`
//!
//! glam quietly produces NaN or infinity for degenerate input. Flocking needs
//! those cases reported instead.

use glam::Vec2;
use thiserror::Error;

/// Arithmetic failures on 2D vectors
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum VectorError {
    #[error("cannot normalize a zero-length or non-finite vector")]
    ZeroLength,
    #[error("cannot divide a vector by zero")]
    DivisionByZero,
}

/// Fallible counterparts to glam's normalize and scalar division
pub trait Vec2Ext: Sized {
    /// Unit vector in the same direction
    fn unit(self) -> Result<Self, VectorError>;

    /// Divide by a scalar, rejecting zero
    fn checked_div(self, rhs: f32) -> Result<Self, VectorError>;
}

impl Vec2Ext for Vec2 {
    fn unit(self) -> Result<Self, VectorError> {
        self.try_normalize().ok_or(VectorError::ZeroLength)
    }

    fn checked_div(self, rhs: f32) -> Result<Self, VectorError> {
        if rhs == 0.0 {
            return Err(VectorError::DivisionByZero);
        }
        Ok(self / rhs)
    }
}
