pub mod operation;
pub mod parameter;
pub mod schema;
pub mod spec;

pub use operation::{Header, Operation, PathItem, Response, SecurityRequirement};
pub use parameter::{Parameter, ParameterLocation};
pub use schema::{Schema, SchemaType};
pub use spec::{Info, License, SecurityScheme, SpecDocument};
