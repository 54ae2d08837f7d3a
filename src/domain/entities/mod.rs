pub mod project;
pub mod tag_set;
pub mod token;
pub mod upload;
