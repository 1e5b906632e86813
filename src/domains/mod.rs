pub mod conversation;
pub mod graph;
pub mod reply;
