pub mod albums;
pub mod reports;
