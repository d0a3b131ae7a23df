// Domain layer: observation types and the traits demos are written against.

pub mod model;
pub mod ports;
