// Domain-layer modules and shared errors/models
pub mod pricing {
    pub use crate::pricing::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
