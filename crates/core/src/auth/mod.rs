mod jwt;
mod password;
mod traits;
mod types;

pub use jwt::*;
pub use password::*;
pub use traits::*;
pub use types::*;
