// Standalone route table files

use crate::loader::from_value;
use crate::{ConfigLoader, FileFormat, Result};
use std::path::Path;
use trellis_core::RouteTable;

/// Loads a file holding only a route table
///
/// TOML files use `[[routes]]` entries, JSON files a `{"routes": [...]}`
/// object.
pub struct RouteTableLoader;

impl RouteTableLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<RouteTable> {
        let path = path.as_ref();
        ConfigLoader::auto(path)?.load(path)
    }

    pub fn parse(content: &str, format: FileFormat) -> Result<RouteTable> {
        from_value(ConfigLoader::new(format).parse(content)?)
    }
}
