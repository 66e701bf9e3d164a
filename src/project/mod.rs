pub mod calls;
pub mod manifest;

pub use calls::{CallRecord, CallsError, CallsFile};
pub use manifest::{find_manifest, CheckerManifest, ManifestError, MANIFEST_FILE_NAME};
