pub mod reference;
pub mod repository;
pub mod source;

pub use reference::reference_artifacts;
pub use repository::{ArtifactRepository, Catalog};
pub use source::{source_for_path, CatalogFormat, CatalogSource, JsonFileSource, ReferenceSource};
