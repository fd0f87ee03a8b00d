//! External wrapper-function dependency

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named import a rewritten file needs: `import { identifier } from 'location'`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    pub identifier: String,
    pub location: String,
}

impl Dependency {
    pub fn new(identifier: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            location: location.into(),
        }
    }

    /// Source text of the import declaration
    pub fn import_statement(&self) -> String {
        format!("import {{ {} }} from '{}';", self.identifier, self.location)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.identifier, self.location)
    }
}
