pub mod calls;
pub mod http;
