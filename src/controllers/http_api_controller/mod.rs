pub(crate) mod deps;
pub(crate) mod middleware;
pub(crate) mod router;
mod v1;

pub(crate) use deps::{HttpApiDeps, InfoHttpApiControllerDeps, MetadataHttpApiControllerDeps};
