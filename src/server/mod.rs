pub mod flow;
pub mod handler;
pub mod state;
pub mod view;
