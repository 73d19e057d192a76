pub mod error;
pub use error::Result;
pub use error::Error;

pub mod metadb;
pub use metadb::MetaDB;
pub use metadb::PackageRepository;

pub mod config;
pub use config::Config;

pub mod operation;
pub use operation::Operation;

pub mod relationship_resolver;
