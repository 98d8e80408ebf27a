use std::fmt;

/// Anything with a human-readable label.
pub trait Named {
    fn label(&self) -> String;
}

pub trait Shape: Named {
    fn area(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Circle { radius }
    }

    fn diameter(&self) -> f64 {
        self.radius * 2.0
    }
}

impl Named for Circle {
    fn label(&self) -> String {
        format!("circle {}", self.radius)
    }
}

impl Shape for Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub(crate) struct Canvas<S: Shape + Default, C: Copy> {
    shapes: Vec<S>,
    color: C,
}

pub enum Fill {
    Solid,
    Hatched,
}

pub mod solids {
    #[non_exhaustive]
    pub struct Cube {
        pub side: f64,
    }

    pub fn volume<T>(side: T) -> T {
        side
    }
}
