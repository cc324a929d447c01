pub mod image_client;
pub mod llm_client;
pub mod prompt_builder;
pub mod repair;
pub mod session;
pub mod store;
pub mod turn;
pub mod validator;
