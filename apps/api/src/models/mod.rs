pub mod access;
pub mod document;
pub mod package;
pub mod user_data;
