pub mod api_handler;
pub mod health_handler;
pub mod options_handler;
pub mod ui_handler;
