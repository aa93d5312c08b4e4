//! Person — the registered identity that events reference.

use serde::{Deserialize, Serialize};

/// A registered person, keyed by national identifier.
///
/// Registration is the only write. People are never updated or deleted in
/// this workflow; events copy the name at write time, so a person row is
/// purely the directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  /// National identifier ("cédula"). Unique across the directory.
  pub id:   String,
  pub name: String,
}
