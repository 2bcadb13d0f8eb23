pub mod accessor;
pub mod admin;
pub mod lookup;
pub mod source;
