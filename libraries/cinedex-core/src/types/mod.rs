mod archived;
mod ids;
mod probe;
mod record;

pub use archived::{ArchivedRecord, CreateArchivedRecord};
pub use ids::RecordId;
pub use probe::{Disposition, FormatInfo, ProbeResult, StreamInfo, StreamSelector};
pub use record::{format_duration, CatalogRecord, RecordUpdate, RecordView, AUDIT_KEY_PREFIX};
