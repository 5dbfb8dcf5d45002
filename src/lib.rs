pub mod api;
pub mod cli;
pub mod db;
pub mod paths;
pub mod workflow;

pub fn hello() -> &'static str {
    "Hello from VlogForge"
}
