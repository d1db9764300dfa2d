//! # Method Shape Validator
//!
//! Only strictly unary methods (one request in, one response out) can be wrapped. Every
//! method is classified into a [`MethodShape`] and only the [`MethodShape::Unary`] variant
//! produces a [`UnaryMethod`], the type the emitters work with.
use crate::error::ShapeError;
use prost_reflect::{MessageDescriptor, MethodDescriptor};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodShape {
    Unary,
    ClientStreaming,
    ServerStreaming,
    BidiStreaming,
}

impl MethodShape {
    pub fn of(method: &MethodDescriptor) -> Self {
        match (method.is_client_streaming(), method.is_server_streaming()) {
            (false, false) => MethodShape::Unary,
            (true, false) => MethodShape::ClientStreaming,
            (false, true) => MethodShape::ServerStreaming,
            (true, true) => MethodShape::BidiStreaming,
        }
    }
}

impl fmt::Display for MethodShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MethodShape::Unary => "unary",
            MethodShape::ClientStreaming => "client streaming",
            MethodShape::ServerStreaming => "server streaming",
            MethodShape::BidiStreaming => "bidirectional streaming",
        })
    }
}

/// A method that passed [`validate`].
#[derive(Debug, Clone)]
pub struct UnaryMethod(MethodDescriptor);

impl UnaryMethod {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.0
    }

    pub fn input(&self) -> MessageDescriptor {
        self.0.input()
    }

    pub fn output(&self) -> MessageDescriptor {
        self.0.output()
    }
}

/// Rejects every method that is not unary.
///
/// # Returns
///
/// * `Ok(UnaryMethod)` - The method takes one request and returns one response.
/// * `Err(ShapeError)` - Any streaming shape, carrying the method's fully qualified name.
pub fn validate(method: &MethodDescriptor) -> Result<UnaryMethod, ShapeError> {
    match MethodShape::of(method) {
        MethodShape::Unary => Ok(UnaryMethod(method.clone())),
        shape => Err(ShapeError {
            method: method.full_name().to_string(),
            shape,
        }),
    }
}
