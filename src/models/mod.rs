pub mod cafe;
pub mod form;
