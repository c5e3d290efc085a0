// Infrastructure layer module
// Contains the concrete capability adapters
// Follows Hexagonal Architecture

pub mod capabilities;
