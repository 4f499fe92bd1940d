//! Object storage: backend selection and the retrying uploader.
//!
//! Both backends (GCS and a local directory mirroring the bucket) sit behind
//! `Arc<dyn ObjectStore>`; the choice is made once when the store is built.

mod factory;
mod uploader;

pub use factory::{build_object_store, StoreHandle};
pub use uploader::{list_files, object_path, UploadResult, Uploader};
