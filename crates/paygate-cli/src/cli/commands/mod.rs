pub mod authorize;
pub mod context;
pub mod decrypt;
pub mod dispatch;
pub mod keygen;
pub mod process;

pub use dispatch::dispatch;
