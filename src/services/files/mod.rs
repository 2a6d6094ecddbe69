pub mod backend;
pub mod supabase;

pub use backend::{
    FileBackend, FileBackendError, FileBackendResult, FileOwnership, SIGNED_URL_TTL_SECONDS,
};
pub use supabase::SupabaseBackend;
