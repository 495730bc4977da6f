pub mod directory;
pub mod dispatcher;
pub mod guard;
pub mod interrupt;
pub mod pipeline;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;
