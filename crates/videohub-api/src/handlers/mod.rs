pub mod health;
pub mod pages;
pub mod presigned_upload;
pub mod theme;
