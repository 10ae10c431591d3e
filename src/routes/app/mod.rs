pub mod login_route;
pub mod process_route;
pub mod upload_route;
