pub mod config;
pub mod document;
pub mod error;
pub mod infer;
pub mod matcher;
pub mod merge;
pub mod observe;
pub mod project;
pub mod store;

pub use config::AutospecConfig;
pub use matcher::{PathMatcher, RouteDefinition, RouteMatch, RouteTemplate};
pub use merge::PredefinedSpec;
pub use observe::{ObservedRequest, ObservedResponse};
pub use store::SpecStore;
