//! Collaborators talking to the backend

pub use self::{
    api_client::ApiClient,
    token_manager::TokenManager,
};

pub mod api_client;
pub mod token_manager;
