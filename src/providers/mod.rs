//! External credential providers

mod resolver;

pub use resolver::KeyResolver;
