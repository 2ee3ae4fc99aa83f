pub mod inspection;
pub mod relay;
