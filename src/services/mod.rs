pub mod connectivity;
pub mod session;
pub mod timeline;
