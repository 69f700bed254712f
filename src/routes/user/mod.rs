mod handler;
mod model;

pub use handler::{login, logout, me, register};
pub use model::{LoginResponse, RegisterResponse};
