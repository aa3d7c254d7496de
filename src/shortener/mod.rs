//! Short code generation and the link registry built on top of it

pub mod generator;
pub mod registry;

pub use generator::{
    is_valid_custom_code, CodeGenerator, ALPHABET, CUSTOM_CODE_MAX_LEN, CUSTOM_CODE_MIN_LEN,
    DEFAULT_CODE_LENGTH,
};
pub use registry::{LinkRegistry, MAX_GENERATION_ATTEMPTS};
