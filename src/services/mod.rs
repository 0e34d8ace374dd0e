pub mod projection_service;
pub mod reset_service;
pub mod settings_service;
pub mod vote_guard;
pub mod vote_service;
