pub mod health_handlers;
pub mod image_handlers;
pub mod multipart;
pub mod object_handlers;
