//! Event types — the fundamental unit of the presence log.
//!
//! An event records that a person was at a place at a moment, heading in or
//! out. Events are never updated or deleted; the log is append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded presence event. Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  /// National identifier of the person who checked in.
  pub person_id:      String,
  /// Snapshot of the person's name at recording time; later renames do not
  /// propagate into the log.
  pub person_name:    String,
  /// Free-form direction label ("entrada"/"salida" by convention). The
  /// backend requires it but does not enumerate the vocabulary.
  pub direction:      String,
  pub place:          String,
  pub latitude:       f64,
  pub longitude:      f64,
  /// Network origin of the recording request, as seen by the server.
  pub origin_address: String,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at:    DateTime<Utc>,
}

/// Input to [`crate::store::PresenceStore::record_event`].
/// `recorded_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub person_id:      String,
  pub person_name:    String,
  pub direction:      String,
  pub place:          String,
  pub latitude:       f64,
  pub longitude:      f64,
  pub origin_address: String,
}
